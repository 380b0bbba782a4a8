//! Configuration errors reported by the compiler.

use crate::core::{EventName, GuardRef, StateName};
use std::fmt::{self, Display};
use thiserror::Error;

/// A malformed transition table.
///
/// Every variant names the machine (or sub-machine) it was found in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Machine '{machine}': initial state '{initial}' is not declared")]
    UnknownInitial { machine: String, initial: StateName },

    #[error("Machine '{machine}': name '{name}' uses the reserved prefix 'internal_'")]
    ReservedName { machine: String, name: String },

    #[error("Machine '{machine}': '{state}' on '{event}' must end with an unguarded fallback")]
    MissingFallback {
        machine: String,
        state: StateName,
        event: EventName,
    },

    #[error(
        "Machine '{machine}': '{state}' on '{event}' has an unguarded candidate \
         at position {position} before the fallback"
    )]
    UnreachableCandidate {
        machine: String,
        state: StateName,
        event: EventName,
        position: usize,
    },

    #[error("Machine '{machine}': '{state}' on '{event}' targets undeclared state '{target}'")]
    UnknownTarget {
        machine: String,
        state: StateName,
        event: EventName,
        target: StateName,
    },

    #[error("Machine '{machine}': '{state}' on '{event}' refers to unregistered guard '{guard}'")]
    UnknownGuard {
        machine: String,
        state: StateName,
        event: EventName,
        guard: GuardRef,
    },

    #[error("Machine '{machine}': final state '{state}' declares outgoing transitions")]
    FinalStateHasTransitions { machine: String, state: StateName },

    #[error("Machine '{machine}': synthetic node '{node}' would be generated twice")]
    SyntheticCollision { machine: String, node: StateName },
}

/// All configuration errors found in one blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    errors: Vec<ConfigurationError>,
}

impl CompileError {
    pub(crate) fn new(errors: Vec<ConfigurationError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[ConfigurationError] {
        &self.errors
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "machine configuration is invalid ({} errors)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

impl From<ConfigurationError> for CompileError {
    fn from(error: ConfigurationError) -> Self {
        Self::new(vec![error])
    }
}
