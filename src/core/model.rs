//! Declarative transition model.
//!
//! This is the uncompiled description of a machine: states, the events each
//! state reacts to, and for each event either a single target or an ordered
//! list of guarded candidates ending in an unguarded fallback. Whether a
//! transition is guarded is fixed by its [`TransitionSpec`] variant when the
//! model is built or deserialized.

use super::guard::GuardRef;
use super::state::{EventName, StateName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One entry of a guarded transition list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTransition {
    /// Guard that must resolve truthy for this candidate; `None` marks the
    /// fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardRef>,
    /// State entered when this candidate is taken
    pub target: StateName,
}

impl CandidateTransition {
    pub fn is_fallback(&self) -> bool {
        self.guard.is_none()
    }
}

/// How a state reacts to one event.
///
/// Serialized as a plain state name when unconditional, or as a list of
/// candidates when guarded:
///
/// ```rust
/// use guardwire::core::TransitionSpec;
///
/// let plain: TransitionSpec = serde_json::from_str(r#""lit""#).unwrap();
/// assert!(matches!(plain, TransitionSpec::Unconditional(_)));
///
/// let guarded: TransitionSpec = serde_json::from_str(
///     r#"[{"guard": "resolveToOK", "target": "lit"}, {"target": "unlit"}]"#,
/// )
/// .unwrap();
/// assert!(matches!(guarded, TransitionSpec::Guarded(ref list) if list.len() == 2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionSpec {
    Unconditional(StateName),
    Guarded(Vec<CandidateTransition>),
}

impl TransitionSpec {
    /// Every state this transition may end in.
    pub fn targets(&self) -> Vec<&StateName> {
        match self {
            Self::Unconditional(target) => vec![target],
            Self::Guarded(candidates) => candidates.iter().map(|c| &c.target).collect(),
        }
    }

    /// Every guard this transition may evaluate, in order.
    pub fn guards(&self) -> Vec<&GuardRef> {
        match self {
            Self::Unconditional(_) => Vec::new(),
            Self::Guarded(candidates) => {
                candidates.iter().filter_map(|c| c.guard.as_ref()).collect()
            }
        }
    }
}

/// A declared state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDefinition {
    /// Outgoing transitions keyed by event
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub on: BTreeMap<EventName, TransitionSpec>,

    /// Terminal states accept no events
    #[serde(default, rename = "final", skip_serializing_if = "std::ops::Not::not")]
    pub final_state: bool,

    /// Nested sub-automaton of a composite state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<Box<MachineDefinition>>,
}

impl StateDefinition {
    pub fn is_composite(&self) -> bool {
        self.machine.is_some()
    }
}

/// A complete machine (or the sub-automaton of a composite state).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineDefinition {
    pub id: String,
    pub initial: StateName,
    pub states: BTreeMap<StateName, StateDefinition>,
}

impl MachineDefinition {
    pub fn state(&self, name: &StateName) -> Option<&StateDefinition> {
        self.states.get(name)
    }

    /// Every event named anywhere in the machine, nested machines included.
    pub fn events(&self) -> BTreeSet<EventName> {
        let mut events = BTreeSet::new();
        for state in self.states.values() {
            events.extend(state.on.keys().cloned());
            if let Some(machine) = &state.machine {
                events.extend(machine.events());
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIGHT_BULB: &str = r#"{
        "id": "light-bulb",
        "initial": "unlit",
        "states": {
            "unlit": {
                "on": {
                    "TOGGLE": [{"guard": "resolveToOK", "target": "lit"}, {"target": "unlit"}],
                    "BREAK": "broken"
                }
            },
            "lit": {
                "on": {
                    "TOGGLE": [{"guard": "resolveToOK", "target": "unlit"}, {"target": "lit"}],
                    "BREAK": [{"guard": "resolveToOK", "target": "broken"}, {"target": "broken"}]
                }
            },
            "broken": {"final": true}
        }
    }"#;

    #[test]
    fn definition_deserializes_from_json() {
        let machine: MachineDefinition = serde_json::from_str(LIGHT_BULB).unwrap();

        assert_eq!(machine.initial, "unlit");
        assert_eq!(machine.states.len(), 3);
        assert!(machine.state(&StateName::new("broken")).unwrap().final_state);

        let unlit = machine.state(&StateName::new("unlit")).unwrap();
        assert_eq!(
            unlit.on.get(&EventName::new("BREAK")),
            Some(&TransitionSpec::Unconditional(StateName::new("broken")))
        );
    }

    #[test]
    fn events_are_collected_across_states() {
        let machine: MachineDefinition = serde_json::from_str(LIGHT_BULB).unwrap();

        let events: Vec<String> = machine.events().iter().map(|e| e.to_string()).collect();
        assert_eq!(events, vec!["BREAK", "TOGGLE"]);
    }

    #[test]
    fn guarded_spec_lists_targets_and_guards_in_order() {
        let spec = TransitionSpec::Guarded(vec![
            CandidateTransition {
                guard: Some(GuardRef::new("first")),
                target: StateName::new("a"),
            },
            CandidateTransition {
                guard: Some(GuardRef::new("second")),
                target: StateName::new("b"),
            },
            CandidateTransition {
                guard: None,
                target: StateName::new("c"),
            },
        ]);

        let targets: Vec<&str> = spec.targets().into_iter().map(StateName::as_str).collect();
        assert_eq!(targets, vec!["a", "b", "c"]);
        assert_eq!(
            spec.guards(),
            vec![&GuardRef::new("first"), &GuardRef::new("second")]
        );
    }

    #[test]
    fn final_flag_is_omitted_when_false() {
        let state = StateDefinition::default();
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "{}");
    }
}
