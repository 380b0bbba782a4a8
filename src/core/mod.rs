//! Core types of the transition model.
//!
//! - State and event names, and persisted state values
//! - Asynchronous guard predicates and their registry
//! - The declarative transition table
//! - The trace of one execution run

mod guard;
mod history;
mod model;
mod state;

pub use guard::{Guard, GuardEffect, GuardError, GuardFactory, GuardRef, GuardRegistry};
pub use history::{RunTrace, TraceStep, Trigger};
pub use model::{CandidateTransition, MachineDefinition, StateDefinition, TransitionSpec};
pub use state::{is_synthetic, EventName, State, StateName, StateValue, SYNTHETIC_PREFIX};
