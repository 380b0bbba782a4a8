//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use guardwire::builder::{otherwise, when, MachineBuilder, StateBuilder};
use guardwire::compiler::CompiledAutomaton;
use guardwire::core::{Guard, StateValue};
use guardwire::store::{InMemoryStore, PersistedState, StateStore, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stillwater::prelude::*;

/// Guard resolving to `value` that counts its invocations.
pub fn counting_guard<Ctx>(value: bool, calls: Arc<AtomicUsize>) -> Guard<Ctx>
where
    Ctx: Clone + Send + Sync + 'static,
{
    Guard::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        pure(value).boxed()
    })
}

/// The light bulb: `unlit` and `lit` toggle and break through a guarded
/// list ending in a self-targeted fallback, `broken` is final.
pub fn light_bulb(resolve_to_ok: Guard<()>) -> Arc<CompiledAutomaton<()>> {
    MachineBuilder::new("lightBulb")
        .initial("unlit")
        .guard("resolveToOK", resolve_to_ok)
        .states([
            StateBuilder::new("unlit")
                .on_guarded("TOGGLE", [when("resolveToOK", "lit"), otherwise("unlit")])
                .on_guarded("BREAK", [when("resolveToOK", "broken"), otherwise("unlit")]),
            StateBuilder::new("lit")
                .on_guarded("TOGGLE", [when("resolveToOK", "unlit"), otherwise("lit")])
                .on_guarded("BREAK", [when("resolveToOK", "broken"), otherwise("lit")]),
            StateBuilder::new("broken").final_state(),
        ])
        .build()
        .unwrap()
        .compile()
        .unwrap()
}

/// Lamp with a composite `on` state and a lower-case `tick` event.
pub fn lamp() -> Arc<CompiledAutomaton<()>> {
    MachineBuilder::new("lamp")
        .initial("off")
        .guard("ok", Guard::always(true))
        .states([
            StateBuilder::new("off").on("SWITCH", "on").on("tick", "off"),
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
        .unwrap()
        .compile()
        .unwrap()
}

pub fn store_at(value: StateValue) -> Arc<InMemoryStore<()>> {
    Arc::new(InMemoryStore::new(PersistedState::new(value, ())))
}

/// In-memory store whose load or save can be made to fail.
pub struct FlakyStore {
    pub inner: InMemoryStore<()>,
    pub fail_load: bool,
    pub fail_save: bool,
}

impl FlakyStore {
    pub fn new(value: StateValue) -> Self {
        Self {
            inner: InMemoryStore::new(PersistedState::new(value, ())),
            fail_load: false,
            fail_save: false,
        }
    }
}

#[async_trait]
impl StateStore<()> for FlakyStore {
    async fn load(&self) -> Result<PersistedState<()>, StoreError> {
        if self.fail_load {
            return Err(StoreError::Load("backend unavailable".into()));
        }
        self.inner.load().await
    }

    async fn save(&self, state: &PersistedState<()>) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Save("disk full".into()));
        }
        self.inner.save(state).await
    }
}
