//! Execution engine.
//!
//! Instances are created from a compiled automaton, either at a top-level
//! state name or at a persisted value, then driven by [`run`] until they
//! settle on a declared state. Synthetic guard nodes are only ever visited
//! inside a run.

mod instance;
mod run;

pub use instance::{
    instantiate, instantiate_value, FactoryFn, MachineFactory, MachineInstance, UnknownStateError,
};
pub use run::{run, EngineError, Settled};
