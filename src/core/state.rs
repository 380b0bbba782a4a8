//! State and event naming.
//!
//! States and events are opaque names. Typed domain enums plug in through the
//! [`State`] trait (usually generated by [`state_enum!`](crate::state_enum)),
//! which converts them into [`StateName`]s for the transition table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};

/// Prefix reserved for nodes synthesized by the guard-chain compiler.
///
/// No declared state, event or guard may start with it, and no value carrying
/// it may ever leave a single execution run.
pub const SYNTHETIC_PREFIX: &str = "internal_";

/// Check whether a name belongs to the compiler's reserved namespace.
pub fn is_synthetic(name: &str) -> bool {
    name.starts_with(SYNTHETIC_PREFIX)
}

/// Name of a declared (or synthesized) state.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateName(String);

impl StateName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_synthetic(&self) -> bool {
        is_synthetic(&self.0)
    }
}

impl Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for StateName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for StateName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Name of an event a state reacts to.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public events are the ones callers may send: upper-case by convention.
    ///
    /// ```rust
    /// use guardwire::core::EventName;
    ///
    /// assert!(EventName::new("TOGGLE").is_public());
    /// assert!(EventName::new("SET_LEVEL").is_public());
    /// assert!(!EventName::new("toggle").is_public());
    /// assert!(!EventName::new("internal_3_lit_TOGGLE_guard_0").is_public());
    /// ```
    pub fn is_public(&self) -> bool {
        !is_synthetic(&self.0) && self.0.to_uppercase() == self.0
    }

    /// Route segment for this event: its lower-cased name.
    pub fn route_segment(&self) -> String {
        self.0.to_lowercase()
    }
}

impl Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Resting state of a machine as persisted between requests.
///
/// A leaf state serializes as its name; a composite state serializes as a
/// single-entry object mapping the parent to its active child value:
///
/// ```rust
/// use guardwire::core::StateValue;
///
/// let leaf = StateValue::leaf("broken");
/// assert_eq!(serde_json::to_string(&leaf).unwrap(), r#""broken""#);
///
/// let nested = StateValue::compound("lit", StateValue::leaf("dimmed"));
/// assert_eq!(serde_json::to_string(&nested).unwrap(), r#"{"lit":"dimmed"}"#);
/// assert_eq!(nested.key().as_str(), "lit");
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Leaf(StateName),
    Compound(BTreeMap<StateName, StateValue>),
}

impl StateValue {
    pub fn leaf(name: impl Into<StateName>) -> Self {
        Self::Leaf(name.into())
    }

    pub fn compound(parent: impl Into<StateName>, child: StateValue) -> Self {
        let mut branch = BTreeMap::new();
        branch.insert(parent.into(), child);
        Self::Compound(branch)
    }

    /// The top-level state name: the leaf itself, or the active branch key.
    ///
    /// An empty compound value (never produced by the engine) yields an
    /// empty name, which no automaton declares.
    pub fn key(&self) -> StateName {
        match self {
            Self::Leaf(name) => name.clone(),
            Self::Compound(branch) => branch
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| StateName::new("")),
        }
    }

    /// The active child value of a compound state.
    pub fn child(&self) -> Option<&StateValue> {
        match self {
            Self::Leaf(_) => None,
            Self::Compound(branch) => branch.values().next(),
        }
    }

    /// Whether any level of this value names a synthetic node.
    pub fn contains_synthetic(&self) -> bool {
        match self {
            Self::Leaf(name) => name.is_synthetic(),
            Self::Compound(branch) => branch
                .iter()
                .any(|(name, child)| name.is_synthetic() || child.contains_synthetic()),
        }
    }
}

impl Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(name) => write!(f, "{name}"),
            Self::Compound(branch) => {
                for (index, (name, child)) in branch.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}.{child}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<StateName> for StateValue {
    fn from(name: StateName) -> Self {
        Self::Leaf(name)
    }
}

/// Trait for typed domain states.
///
/// Implementors can be handed to the builders wherever a [`StateName`] is
/// expected once they also implement `Into<StateName>`, which the
/// [`state_enum!`](crate::state_enum) macro provides.
///
/// # Example
///
/// ```rust
/// use guardwire::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Bulb {
///     Unlit,
///     Lit,
///     Broken,
/// }
///
/// impl State for Bulb {
///     fn name(&self) -> &str {
///         match self {
///             Self::Unlit => "unlit",
///             Self::Lit => "lit",
///             Self::Broken => "broken",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// The state's name in the transition table.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Unlit,
        Lit,
        Broken,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Unlit => "unlit",
                Self::Lit => "lit",
                Self::Broken => "broken",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Broken)
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Unlit.name(), "unlit");
        assert_eq!(TestState::Lit.name(), "lit");
        assert_eq!(TestState::Broken.name(), "broken");
    }

    #[test]
    fn is_final_identifies_terminal_states() {
        assert!(!TestState::Unlit.is_final());
        assert!(!TestState::Lit.is_final());
        assert!(TestState::Broken.is_final());
    }

    #[test]
    fn synthetic_names_are_detected() {
        assert!(is_synthetic("internal_3_lit_TOGGLE_guard_0"));
        assert!(StateName::new("internal_x").is_synthetic());
        assert!(!StateName::new("lit").is_synthetic());
        assert!(!StateName::new("internals").is_synthetic());
    }

    #[test]
    fn public_events_are_upper_case() {
        assert!(EventName::new("BREAK").is_public());
        assert!(!EventName::new("Break").is_public());
        assert_eq!(EventName::new("BREAK").route_segment(), "break");
    }

    #[test]
    fn state_value_key_resolves_active_branch() {
        assert_eq!(StateValue::leaf("lit").key(), "lit");

        let nested = StateValue::compound(
            "on",
            StateValue::compound("bright", StateValue::leaf("steady")),
        );
        assert_eq!(nested.key(), "on");
        assert_eq!(nested.child().map(StateValue::key), Some(StateName::new("bright")));
        assert_eq!(nested.to_string(), "on.bright.steady");
    }

    #[test]
    fn multi_branch_values_display_each_branch() {
        let value: StateValue =
            serde_json::from_str(r#"{ "a": "x", "b": { "c": "y" } }"#).unwrap();

        assert_eq!(value.to_string(), "a.x, b.c.y");
    }

    #[test]
    fn state_value_detects_synthetic_levels() {
        assert!(!StateValue::leaf("lit").contains_synthetic());
        assert!(StateValue::leaf("internal_3_lit_BREAK_fallback").contains_synthetic());
        assert!(StateValue::compound("on", StateValue::leaf("internal_2_on_DIM_guard_1"))
            .contains_synthetic());
    }

    #[test]
    fn state_value_deserializes_both_shapes() {
        let leaf: StateValue = serde_json::from_str(r#""unlit""#).unwrap();
        assert_eq!(leaf, StateValue::leaf("unlit"));

        let nested: StateValue = serde_json::from_str(r#"{"on":"dimmed"}"#).unwrap();
        assert_eq!(nested, StateValue::compound("on", StateValue::leaf("dimmed")));
    }
}
