//! Machine instances and their factories.

use crate::compiler::CompiledAutomaton;
use crate::core::{StateName, StateValue};
use std::sync::Arc;
use thiserror::Error;

/// Requested starting state is not a declared state of the machine.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Machine '{machine}' has no state '{state}'")]
pub struct UnknownStateError {
    pub machine: String,
    pub state: String,
}

/// A compiled automaton positioned at a resting state.
///
/// Instances are cheap: the automaton is shared, only the value is owned.
pub struct MachineInstance<Ctx> {
    pub(crate) automaton: Arc<CompiledAutomaton<Ctx>>,
    pub(crate) value: StateValue,
}

impl<Ctx> MachineInstance<Ctx> {
    /// Current resting value.
    pub fn value(&self) -> &StateValue {
        &self.value
    }

    /// Top-level state name of the current value.
    pub fn key(&self) -> StateName {
        self.value.key()
    }

    pub fn automaton(&self) -> &Arc<CompiledAutomaton<Ctx>> {
        &self.automaton
    }
}

impl<Ctx> Clone for MachineInstance<Ctx> {
    fn clone(&self) -> Self {
        Self {
            automaton: Arc::clone(&self.automaton),
            value: self.value.clone(),
        }
    }
}

impl<Ctx> std::fmt::Debug for MachineInstance<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineInstance")
            .field("machine", &self.automaton.id())
            .field("value", &self.value)
            .finish()
    }
}

/// Position a new instance at `state`, or at the initial state when `None`.
///
/// Only declared top-level states are accepted; synthetic node names are
/// rejected like any other unknown name.
pub fn instantiate<Ctx>(
    automaton: &Arc<CompiledAutomaton<Ctx>>,
    state: Option<&str>,
) -> Result<MachineInstance<Ctx>, UnknownStateError> {
    let name = match state {
        Some(state) => StateName::new(state),
        None => automaton.initial().clone(),
    };

    let value = automaton.enter(&name).ok_or_else(|| UnknownStateError {
        machine: automaton.id().to_string(),
        state: name.to_string(),
    })?;

    Ok(MachineInstance {
        automaton: Arc::clone(automaton),
        value,
    })
}

/// Position a new instance at a full (possibly nested) persisted value.
pub fn instantiate_value<Ctx>(
    automaton: &Arc<CompiledAutomaton<Ctx>>,
    value: &StateValue,
) -> Result<MachineInstance<Ctx>, UnknownStateError> {
    let value = CompiledAutomaton::restore(automaton, value).ok_or_else(|| UnknownStateError {
        machine: automaton.id().to_string(),
        state: value.to_string(),
    })?;

    Ok(MachineInstance {
        automaton: Arc::clone(automaton),
        value,
    })
}

/// Source of machine instances for the HTTP adapter.
pub trait MachineFactory<Ctx>: Send + Sync {
    /// Instantiate at a top-level state, or at the initial state.
    fn create(&self, state: Option<&str>) -> Result<MachineInstance<Ctx>, UnknownStateError>;

    /// Instantiate at a persisted value.
    ///
    /// Defaults to instantiating at the value's key, which resets any nested
    /// machine to its initial child.
    fn restore(&self, value: &StateValue) -> Result<MachineInstance<Ctx>, UnknownStateError> {
        self.create(Some(value.key().as_str()))
    }
}

impl<Ctx> MachineFactory<Ctx> for Arc<CompiledAutomaton<Ctx>> {
    fn create(&self, state: Option<&str>) -> Result<MachineInstance<Ctx>, UnknownStateError> {
        instantiate(self, state)
    }

    fn restore(&self, value: &StateValue) -> Result<MachineInstance<Ctx>, UnknownStateError> {
        instantiate_value(self, value)
    }
}

/// Adapts a closure into a [`MachineFactory`].
///
/// ```rust
/// use guardwire::builder::{MachineBuilder, StateBuilder};
/// use guardwire::engine::{instantiate, FactoryFn, MachineFactory};
///
/// let automaton = MachineBuilder::<()>::new("bulb")
///     .initial("unlit")
///     .state(StateBuilder::new("unlit"))
///     .build()
///     .unwrap()
///     .compile()
///     .unwrap();
///
/// let factory = FactoryFn(move |state: Option<&str>| instantiate(&automaton, state));
/// assert_eq!(factory.create(None).unwrap().key(), "unlit");
/// ```
pub struct FactoryFn<F>(pub F);

impl<Ctx, F> MachineFactory<Ctx> for FactoryFn<F>
where
    F: Fn(Option<&str>) -> Result<MachineInstance<Ctx>, UnknownStateError> + Send + Sync,
{
    fn create(&self, state: Option<&str>) -> Result<MachineInstance<Ctx>, UnknownStateError> {
        (self.0)(state)
    }
}
