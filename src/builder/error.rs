//! Build errors for machine and state builders.

use crate::core::{EventName, StateName};
use thiserror::Error;

/// Errors that can occur when building machine definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("State '{0}' is declared more than once")]
    DuplicateState(StateName),

    #[error("State '{state}' declares event '{event}' more than once")]
    DuplicateEvent { state: StateName, event: EventName },
}
