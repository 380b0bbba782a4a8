//! Builder for constructing machine blueprints.

use crate::builder::error::BuildError;
use crate::builder::state::{build_states, StateBuilder};
use crate::core::{Guard, GuardRef, GuardRegistry, MachineDefinition, StateName};

/// A machine definition paired with the guards it refers to.
///
/// This is the input of the compiler. A blueprint can come from
/// [`MachineBuilder`] or be assembled from a deserialized
/// [`MachineDefinition`] and a registry.
pub struct Blueprint<Ctx> {
    pub definition: MachineDefinition,
    pub guards: GuardRegistry<Ctx>,
}

impl<Ctx> Blueprint<Ctx> {
    pub fn new(definition: MachineDefinition, guards: GuardRegistry<Ctx>) -> Self {
        Self { definition, guards }
    }
}

/// Builder for constructing machines with a fluent API.
pub struct MachineBuilder<Ctx> {
    id: String,
    initial: Option<StateName>,
    states: Vec<StateBuilder>,
    guards: GuardRegistry<Ctx>,
}

impl<Ctx: Clone + Send + Sync + 'static> MachineBuilder<Ctx> {
    /// Create a new builder.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initial: None,
            states: Vec::new(),
            guards: GuardRegistry::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: impl Into<StateName>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Declare a state.
    pub fn state(mut self, state: StateBuilder) -> Self {
        self.states.push(state);
        self
    }

    /// Declare multiple states at once.
    pub fn states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = StateBuilder>,
    {
        self.states.extend(states);
        self
    }

    /// Register a guard under the name transitions refer to.
    pub fn guard(mut self, name: impl Into<GuardRef>, guard: Guard<Ctx>) -> Self {
        self.guards.register(name, guard);
        self
    }

    /// Build the blueprint.
    /// Returns an error if required fields are missing or names collide.
    pub fn build(self) -> Result<Blueprint<Ctx>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let definition = build_states(self.id, initial, self.states)?;

        Ok(Blueprint {
            definition,
            guards: self.guards,
        })
    }
}
