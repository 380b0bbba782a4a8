//! Blueprint validation.
//!
//! Uses Stillwater's `Validation` to accumulate ALL configuration errors in
//! one pass instead of stopping at the first, so a broken table is reported
//! in full at startup.

use crate::compiler::error::ConfigurationError;
use crate::core::{
    is_synthetic, EventName, GuardRegistry, MachineDefinition, StateName, TransitionSpec,
};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of a single check.
pub type Check = Validation<(), NonEmptyVec<ConfigurationError>>;

/// Validate a machine definition and every nested sub-machine.
pub fn validate<Ctx>(
    definition: &MachineDefinition,
    guards: &GuardRegistry<Ctx>,
) -> Validation<(), NonEmptyVec<ConfigurationError>> {
    let mut checks = Vec::new();
    collect_checks(definition, guards, &mut checks);
    Validation::all_vec(checks).map(|_| ())
}

/// Flatten a failed validation into its error list.
pub fn into_errors(
    validation: Validation<(), NonEmptyVec<ConfigurationError>>,
) -> Vec<ConfigurationError> {
    match validation {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}

fn collect_checks<Ctx>(
    definition: &MachineDefinition,
    guards: &GuardRegistry<Ctx>,
    checks: &mut Vec<Check>,
) {
    let machine = definition.id.as_str();

    checks.push(ensure(
        definition.states.contains_key(&definition.initial),
        || ConfigurationError::UnknownInitial {
            machine: machine.to_string(),
            initial: definition.initial.clone(),
        },
    ));

    for (name, state) in &definition.states {
        checks.push(not_reserved(machine, name.as_str()));

        checks.push(ensure(
            !(state.final_state && !state.on.is_empty()),
            || ConfigurationError::FinalStateHasTransitions {
                machine: machine.to_string(),
                state: name.clone(),
            },
        ));

        for (event, spec) in &state.on {
            checks.push(not_reserved(machine, event.as_str()));
            check_transition(definition, guards, name, event, spec, checks);
        }

        if let Some(nested) = &state.machine {
            collect_checks(nested, guards, checks);
        }
    }
}

fn check_transition<Ctx>(
    definition: &MachineDefinition,
    guards: &GuardRegistry<Ctx>,
    name: &StateName,
    event: &EventName,
    spec: &TransitionSpec,
    checks: &mut Vec<Check>,
) {
    let machine = definition.id.as_str();

    for target in spec.targets() {
        checks.push(ensure(definition.states.contains_key(target), || {
            ConfigurationError::UnknownTarget {
                machine: machine.to_string(),
                state: name.clone(),
                event: event.clone(),
                target: target.clone(),
            }
        }));
    }

    let TransitionSpec::Guarded(candidates) = spec else {
        return;
    };

    checks.push(ensure(
        candidates.last().is_some_and(|last| last.is_fallback()),
        || ConfigurationError::MissingFallback {
            machine: machine.to_string(),
            state: name.clone(),
            event: event.clone(),
        },
    ));

    let guarded = candidates.len().saturating_sub(1);
    for (position, candidate) in candidates.iter().enumerate().take(guarded) {
        checks.push(ensure(!candidate.is_fallback(), || {
            ConfigurationError::UnreachableCandidate {
                machine: machine.to_string(),
                state: name.clone(),
                event: event.clone(),
                position,
            }
        }));
    }

    for guard in spec.guards() {
        checks.push(not_reserved(machine, guard.as_str()));
        checks.push(ensure(guards.contains(guard), || {
            ConfigurationError::UnknownGuard {
                machine: machine.to_string(),
                state: name.clone(),
                event: event.clone(),
                guard: guard.clone(),
            }
        }));
    }
}

fn not_reserved(machine: &str, name: &str) -> Check {
    ensure(!is_synthetic(name), || ConfigurationError::ReservedName {
        machine: machine.to_string(),
        name: name.to_string(),
    })
}

fn ensure<F>(condition: bool, error: F) -> Check
where
    F: FnOnce() -> ConfigurationError,
{
    if condition {
        Validation::success(())
    } else {
        Validation::fail(error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{otherwise, when, MachineBuilder, StateBuilder};
    use crate::core::{CandidateTransition, Guard};

    fn errors_of(builder: MachineBuilder<()>) -> Vec<ConfigurationError> {
        let blueprint = builder.build().unwrap();
        into_errors(validate(&blueprint.definition, &blueprint.guards))
    }

    #[test]
    fn valid_definition_passes() {
        let errors = errors_of(
            MachineBuilder::new("bulb")
                .initial("unlit")
                .guard("resolveToOK", Guard::always(true))
                .states([
                    StateBuilder::new("unlit")
                        .on_guarded("TOGGLE", [when("resolveToOK", "lit"), otherwise("unlit")]),
                    StateBuilder::new("lit").on("TOGGLE", "unlit").on("BREAK", "broken"),
                    StateBuilder::new("broken").final_state(),
                ]),
        );

        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let errors = errors_of(
            MachineBuilder::new("bulb")
                .initial("missing")
                .states([
                    StateBuilder::new("unlit")
                        .on_guarded("TOGGLE", [when("unregistered", "lit")])
                        .on("BREAK", "nowhere"),
                    StateBuilder::new("lit"),
                    StateBuilder::new("broken").final_state().on("TOGGLE", "lit"),
                ]),
        );

        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigurationError::UnknownInitial { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigurationError::MissingFallback { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigurationError::UnknownGuard { .. })));
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigurationError::UnknownTarget { target, .. } if target == "nowhere"
        )));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigurationError::FinalStateHasTransitions { .. })));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn empty_guarded_list_lacks_fallback() {
        let errors = errors_of(
            MachineBuilder::new("bulb")
                .initial("unlit")
                .state(
                    StateBuilder::new("unlit")
                        .on_guarded("TOGGLE", Vec::<CandidateTransition>::new()),
                ),
        );

        assert_eq!(
            errors,
            vec![ConfigurationError::MissingFallback {
                machine: "bulb".to_string(),
                state: StateName::new("unlit"),
                event: EventName::new("TOGGLE"),
            }]
        );
    }

    #[test]
    fn unguarded_candidate_before_fallback_is_unreachable() {
        let errors = errors_of(
            MachineBuilder::new("bulb").initial("unlit").states([
                StateBuilder::new("unlit")
                    .on_guarded("TOGGLE", [otherwise("lit"), otherwise("unlit")]),
                StateBuilder::new("lit"),
            ]),
        );

        assert_eq!(
            errors,
            vec![ConfigurationError::UnreachableCandidate {
                machine: "bulb".to_string(),
                state: StateName::new("unlit"),
                event: EventName::new("TOGGLE"),
                position: 0,
            }]
        );
    }

    #[test]
    fn reserved_prefix_is_rejected() {
        let errors = errors_of(
            MachineBuilder::new("bulb")
                .initial("internal_unlit")
                .state(StateBuilder::new("internal_unlit")),
        );

        assert_eq!(
            errors,
            vec![ConfigurationError::ReservedName {
                machine: "bulb".to_string(),
                name: "internal_unlit".to_string(),
            }]
        );
    }

    #[test]
    fn nested_machines_are_validated() {
        let errors = errors_of(
            MachineBuilder::new("bulb").initial("lit").state(
                StateBuilder::new("lit").composite(
                    "bright",
                    [StateBuilder::new("bright").on("DIM", "dimmed")],
                ),
            ),
        );

        assert_eq!(
            errors,
            vec![ConfigurationError::UnknownTarget {
                machine: "lit".to_string(),
                state: StateName::new("bright"),
                event: EventName::new("DIM"),
                target: StateName::new("dimmed"),
            }]
        );
    }
}
