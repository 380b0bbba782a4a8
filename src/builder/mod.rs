//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and a macro for declaring machines
//! with minimal boilerplate while keeping transition shapes explicit.

pub mod error;
pub mod machine;
pub mod macros;
pub mod state;

pub use error::BuildError;
pub use machine::{Blueprint, MachineBuilder};
pub use state::StateBuilder;

use crate::core::{CandidateTransition, GuardRef, StateName};

/// Candidate taken when `guard` resolves truthy.
///
/// # Example
///
/// ```
/// use guardwire::builder::{otherwise, when, StateBuilder};
///
/// let lit = StateBuilder::new("lit")
///     .on_guarded("TOGGLE", [when("resolveToOK", "unlit"), otherwise("lit")]);
/// ```
pub fn when(guard: impl Into<GuardRef>, target: impl Into<StateName>) -> CandidateTransition {
    CandidateTransition {
        guard: Some(guard.into()),
        target: target.into(),
    }
}

/// Fallback candidate, taken when every preceding guard rejects.
pub fn otherwise(target: impl Into<StateName>) -> CandidateTransition {
    CandidateTransition {
        guard: None,
        target: target.into(),
    }
}
