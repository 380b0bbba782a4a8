//! Guard-chain compiler.
//!
//! Turns a [`Blueprint`] into a [`CompiledAutomaton`] in two passes:
//!
//! 1. Validation accumulates every configuration error of the blueprint.
//! 2. Lowering rewrites each guarded candidate list into a chain of
//!    synthetic nodes that the engine walks to a resting state.

pub mod automaton;
pub mod error;
mod lower;
pub mod validate;

pub use automaton::{CompiledAutomaton, FallbackNode, GuardNode, Node, RestingNode};
pub use error::{CompileError, ConfigurationError};

use crate::builder::Blueprint;
use std::sync::Arc;
use tracing::{debug, info};

/// Compile a blueprint into a shareable automaton.
///
/// # Example
///
/// ```rust
/// use guardwire::builder::{otherwise, when, MachineBuilder, StateBuilder};
/// use guardwire::compiler::compile;
/// use guardwire::core::Guard;
///
/// let blueprint = MachineBuilder::<()>::new("bulb")
///     .initial("unlit")
///     .guard("resolveToOK", Guard::always(true))
///     .states([
///         StateBuilder::new("unlit")
///             .on_guarded("TOGGLE", [when("resolveToOK", "lit"), otherwise("unlit")]),
///         StateBuilder::new("lit").on("TOGGLE", "unlit"),
///     ])
///     .build()
///     .unwrap();
///
/// let automaton = compile(&blueprint).unwrap();
/// assert_eq!(automaton.synthetic_names().count(), 2);
/// ```
pub fn compile<Ctx>(
    blueprint: &Blueprint<Ctx>,
) -> Result<Arc<CompiledAutomaton<Ctx>>, CompileError> {
    let definition = &blueprint.definition;

    let errors = validate::into_errors(validate::validate(definition, &blueprint.guards));
    if !errors.is_empty() {
        return Err(CompileError::new(errors));
    }

    let automaton = lower::lower(definition, &blueprint.guards)?;
    for name in automaton.synthetic_names() {
        debug!(machine = %automaton.id(), node = %name, "generated synthetic node");
    }
    info!(
        machine = %automaton.id(),
        states = automaton.state_names().count(),
        synthetic = automaton.synthetic_names().count(),
        "compiled machine"
    );

    Ok(Arc::new(automaton))
}

impl<Ctx> Blueprint<Ctx> {
    /// Compile this blueprint. See [`compile`].
    pub fn compile(&self) -> Result<Arc<CompiledAutomaton<Ctx>>, CompileError> {
        compile(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{otherwise, when, MachineBuilder, StateBuilder};
    use crate::core::{EventName, Guard, MachineDefinition, StateName};

    const LIGHT_BULB: &str = r#"{
        "id": "lightBulb",
        "initial": "unlit",
        "states": {
            "unlit": {
                "on": {
                    "TOGGLE": [{ "guard": "resolveToOK", "target": "lit" }, { "target": "unlit" }],
                    "BREAK": [{ "guard": "resolveToOK", "target": "broken" }, { "target": "unlit" }]
                }
            },
            "lit": {
                "on": {
                    "TOGGLE": [{ "guard": "resolveToOK", "target": "unlit" }, { "target": "lit" }],
                    "BREAK": [{ "guard": "resolveToOK", "target": "broken" }, { "target": "lit" }]
                }
            },
            "broken": { "final": true }
        }
    }"#;

    #[test]
    fn compiles_deserialized_definition() {
        let definition: MachineDefinition = serde_json::from_str(LIGHT_BULB).unwrap();
        let mut blueprint = Blueprint::new(definition, Default::default());
        blueprint.guards.register("resolveToOK", Guard::<()>::always(true));

        let automaton = blueprint.compile().unwrap();

        assert_eq!(automaton.state_names().count(), 3);
        assert_eq!(automaton.synthetic_names().count(), 8);
        assert!(automaton.synthetic_names().all(|name| name.is_synthetic()));
        let public: Vec<_> = automaton.public_events().into_iter().map(EventName::as_str).collect();
        assert_eq!(public, vec!["BREAK", "TOGGLE"]);
    }

    #[test]
    fn invalid_blueprint_reports_every_error() {
        let blueprint = MachineBuilder::<()>::new("bulb")
            .initial("unlit")
            .states([
                StateBuilder::new("unlit")
                    .on_guarded("TOGGLE", [when("missing", "lit")])
                    .on("BREAK", "nowhere"),
                StateBuilder::new("lit"),
            ])
            .build()
            .unwrap();

        let error = compile(&blueprint).unwrap_err();

        assert_eq!(error.errors().len(), 3);
        assert!(error.to_string().contains("3 errors"));
    }

    #[test]
    fn composite_states_compile_their_sub_machine() {
        let blueprint = MachineBuilder::<()>::new("lamp")
            .initial("off")
            .guard("ok", Guard::always(true))
            .states([
                StateBuilder::new("off").on("SWITCH", "on"),
                StateBuilder::new("on").on("SWITCH", "off").composite(
                    "bright",
                    [
                        StateBuilder::new("bright")
                            .on_guarded("DIM", [when("ok", "dimmed"), otherwise("bright")]),
                        StateBuilder::new("dimmed").on("DIM", "bright"),
                    ],
                ),
            ])
            .build()
            .unwrap();

        let automaton = compile(&blueprint).unwrap();
        let on = automaton.resting(&StateName::new("on")).unwrap();
        let nested = on.machine.as_ref().unwrap();

        assert_eq!(nested.id(), "on");
        assert_eq!(nested.synthetic_names().count(), 2);
        assert!(automaton.events().contains(&EventName::new("DIM")));
        assert_eq!(
            automaton.enter(&StateName::new("on")).unwrap().to_string(),
            "on.bright"
        );
    }
}
