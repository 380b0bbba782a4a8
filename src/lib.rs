//! Guardwire: guarded state machines compiled to flat automata and served
//! over HTTP.
//!
//! A machine is declared as a transition table in which an event either
//! moves unconditionally or tries an ordered list of asynchronous guards,
//! ending in an unguarded fallback. The compiler lowers every guarded list
//! into a chain of synthetic nodes so the engine only ever follows plain
//! transitions; callers never observe a synthetic node.
//!
//! # Core Concepts
//!
//! - **Blueprint**: Transition table plus the guards it names
//! - **Compiled automaton**: Validated, flattened machine shared by every instance
//! - **Run**: One event dispatched to an instance, settled on a declared state
//! - **Store**: Where the resting state lives between requests
//!
//! # Example
//!
//! ```rust
//! use guardwire::builder::{otherwise, when, MachineBuilder, StateBuilder};
//! use guardwire::core::{EventName, Guard};
//! use guardwire::engine::{instantiate, run};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let automaton = MachineBuilder::<()>::new("lightBulb")
//!     .initial("unlit")
//!     .guard("resolveToOK", Guard::always(true))
//!     .states([
//!         StateBuilder::new("unlit")
//!             .on_guarded("TOGGLE", [when("resolveToOK", "lit"), otherwise("unlit")]),
//!         StateBuilder::new("lit")
//!             .on_guarded("TOGGLE", [when("resolveToOK", "unlit"), otherwise("lit")]),
//!     ])
//!     .build()
//!     .unwrap()
//!     .compile()
//!     .unwrap();
//!
//! let mut bulb = instantiate(&automaton, None).unwrap();
//! let settled = run(&mut bulb, &EventName::new("TOGGLE"), &()).await.unwrap();
//! assert_eq!(settled.key(), "lit");
//! # });
//! ```

pub mod builder;
pub mod compiler;
pub mod config;
pub mod core;
pub mod engine;
pub mod http;
pub mod store;

// Re-export commonly used types
pub use builder::{otherwise, when, Blueprint, MachineBuilder, StateBuilder};
pub use compiler::{compile, CompileError, CompiledAutomaton, ConfigurationError};
pub use core::{EventName, Guard, GuardError, State, StateName, StateValue};
pub use engine::{instantiate, run, MachineFactory, MachineInstance, Settled, UnknownStateError};
pub use http::{machine_router, MachineResource};
pub use store::{InMemoryStore, JsonFileStore, PersistedState, StateStore, StoreError};
