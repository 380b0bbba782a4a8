//! Builder for a single state and its transition table.

use crate::builder::error::BuildError;
use crate::core::{
    CandidateTransition, EventName, MachineDefinition, State, StateDefinition, StateName,
    TransitionSpec,
};
use std::collections::BTreeMap;

/// Builder for declaring one state with a fluent API.
pub struct StateBuilder {
    name: StateName,
    on: BTreeMap<EventName, TransitionSpec>,
    duplicates: Vec<EventName>,
    final_state: bool,
    children: Option<(StateName, Vec<StateBuilder>)>,
}

impl StateBuilder {
    pub fn new(name: impl Into<StateName>) -> Self {
        Self {
            name: name.into(),
            on: BTreeMap::new(),
            duplicates: Vec::new(),
            final_state: false,
            children: None,
        }
    }

    /// Builder for a typed domain state, terminal when `state.is_final()`.
    pub fn for_state<S: State>(state: &S) -> Self {
        let mut builder = Self::new(state.name());
        builder.final_state = state.is_final();
        builder
    }

    /// Unconditional transition on `event`.
    pub fn on(self, event: impl Into<EventName>, target: impl Into<StateName>) -> Self {
        self.transition(event.into(), TransitionSpec::Unconditional(target.into()))
    }

    /// Guarded transition on `event`: candidates are tried in order, the
    /// last one must be an [`otherwise`](crate::builder::otherwise) fallback.
    pub fn on_guarded<I>(self, event: impl Into<EventName>, candidates: I) -> Self
    where
        I: IntoIterator<Item = CandidateTransition>,
    {
        self.transition(
            event.into(),
            TransitionSpec::Guarded(candidates.into_iter().collect()),
        )
    }

    /// Mark the state as terminal.
    pub fn final_state(mut self) -> Self {
        self.final_state = true;
        self
    }

    /// Turn the state into a composite with its own sub-automaton.
    pub fn composite<I>(mut self, initial: impl Into<StateName>, children: I) -> Self
    where
        I: IntoIterator<Item = StateBuilder>,
    {
        self.children = Some((initial.into(), children.into_iter().collect()));
        self
    }

    pub fn name(&self) -> &StateName {
        &self.name
    }

    fn transition(mut self, event: EventName, spec: TransitionSpec) -> Self {
        if self.on.contains_key(&event) {
            self.duplicates.push(event);
        } else {
            self.on.insert(event, spec);
        }
        self
    }

    /// Build the state definition.
    pub fn build(self) -> Result<(StateName, StateDefinition), BuildError> {
        if let Some(event) = self.duplicates.into_iter().next() {
            return Err(BuildError::DuplicateEvent {
                state: self.name,
                event,
            });
        }

        let machine = match self.children {
            Some((initial, children)) => Some(Box::new(build_states(
                self.name.to_string(),
                initial,
                children,
            )?)),
            None => None,
        };

        Ok((
            self.name,
            StateDefinition {
                on: self.on,
                final_state: self.final_state,
                machine,
            },
        ))
    }
}

/// Assemble a set of state builders into one machine level.
pub(crate) fn build_states(
    id: String,
    initial: StateName,
    builders: Vec<StateBuilder>,
) -> Result<MachineDefinition, BuildError> {
    if builders.is_empty() {
        return Err(BuildError::NoStates);
    }

    let mut states = BTreeMap::new();
    for builder in builders {
        let (name, definition) = builder.build()?;
        if states.contains_key(&name) {
            return Err(BuildError::DuplicateState(name));
        }
        states.insert(name, definition);
    }

    Ok(MachineDefinition {
        id,
        initial,
        states,
    })
}
