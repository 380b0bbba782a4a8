//! HTTP adapter.
//!
//! Each public event `E` of a machine becomes `GET /<lowercase E>`. A request
//! loads the stored state, runs the event and answers with:
//!
//! - `200 {"nextState": "<state>"}` when the state changed and was saved
//! - `409 {"nextState": <state value>}` when nothing changed
//! - `500 {}` when loading, running or saving failed

mod adapter;
mod response;
mod server;

pub use adapter::{machine_router, AdapterError, MachineResource};
pub use response::{EventResponse, NextState};
pub use server::{app, serve};
