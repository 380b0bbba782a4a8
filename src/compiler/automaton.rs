//! The flat automaton produced by the compiler.
//!
//! Every node is either a declared resting state or a synthetic node of a
//! guard chain. Resting nodes only carry unconditional, event-keyed
//! transitions; the guard logic lives entirely in the synthetic nodes.

use crate::core::{EventName, Guard, GuardRef, StateName, StateValue};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A declared state after compilation.
pub struct RestingNode<Ctx> {
    pub final_state: bool,
    /// Event to entry node: either a resting sibling or the first node of a
    /// guard chain owned by this state
    pub on: BTreeMap<EventName, StateName>,
    /// Targets this state accepts from its own guard chains
    pub resolutions: BTreeSet<StateName>,
    /// Sub-automaton of a composite state
    pub machine: Option<Box<CompiledAutomaton<Ctx>>>,
}

/// One guarded slot of a chain.
pub struct GuardNode<Ctx> {
    pub owner: StateName,
    pub event: EventName,
    pub guard_name: GuardRef,
    pub guard: Guard<Ctx>,
    /// Target resolved when the guard passes
    pub on_pass: StateName,
    /// Next node of the chain when the guard rejects or fails
    pub on_reject: StateName,
}

/// Final slot of a chain: resolves to the fallback target unconditionally.
#[derive(Clone, Debug)]
pub struct FallbackNode {
    pub owner: StateName,
    pub event: EventName,
    pub target: StateName,
}

pub enum Node<Ctx> {
    Resting(RestingNode<Ctx>),
    Guard(GuardNode<Ctx>),
    Fallback(FallbackNode),
}

impl<Ctx> Node<Ctx> {
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, Self::Resting(_))
    }
}

/// Compiled machine: immutable and shared by every instance.
pub struct CompiledAutomaton<Ctx> {
    pub(crate) id: String,
    pub(crate) initial: StateName,
    pub(crate) nodes: BTreeMap<StateName, Node<Ctx>>,
    pub(crate) events: BTreeSet<EventName>,
}

impl<Ctx> CompiledAutomaton<Ctx> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial(&self) -> &StateName {
        &self.initial
    }

    pub fn node(&self, name: &StateName) -> Option<&Node<Ctx>> {
        self.nodes.get(name)
    }

    /// Look up a declared state; synthetic nodes are never returned.
    pub fn resting(&self, name: &StateName) -> Option<&RestingNode<Ctx>> {
        match self.nodes.get(name) {
            Some(Node::Resting(node)) => Some(node),
            _ => None,
        }
    }

    /// Declared states of this level.
    pub fn state_names(&self) -> impl Iterator<Item = &StateName> {
        self.nodes
            .iter()
            .filter(|(_, node)| !node.is_synthetic())
            .map(|(name, _)| name)
    }

    /// Synthetic nodes of this level.
    pub fn synthetic_names(&self) -> impl Iterator<Item = &StateName> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.is_synthetic())
            .map(|(name, _)| name)
    }

    /// Every event the machine reacts to, nested levels included.
    pub fn events(&self) -> &BTreeSet<EventName> {
        &self.events
    }

    /// Events callers may send.
    pub fn public_events(&self) -> Vec<&EventName> {
        self.events.iter().filter(|event| event.is_public()).collect()
    }

    /// Value reached by entering `name`, descending into initial children of
    /// composite states. `None` if `name` is not a declared state.
    pub fn enter(&self, name: &StateName) -> Option<StateValue> {
        let node = self.resting(name)?;
        match &node.machine {
            Some(machine) => {
                let child = machine.enter(machine.initial())?;
                Some(StateValue::compound(name.clone(), child))
            }
            None => Some(StateValue::leaf(name.clone())),
        }
    }

    /// Check that a persisted value names declared states at every level.
    ///
    /// A composite state stored as a bare leaf is restored at its initial
    /// child.
    pub fn restore(&self, value: &StateValue) -> Option<StateValue> {
        let key = value.key();
        let node = self.resting(&key)?;
        match (&node.machine, value.child()) {
            (Some(machine), Some(child)) => {
                Some(StateValue::compound(key, machine.restore(child)?))
            }
            (Some(_), None) => self.enter(&key),
            (None, None) => Some(StateValue::leaf(key)),
            (None, Some(_)) => None,
        }
    }
}

impl<Ctx> fmt::Debug for CompiledAutomaton<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledAutomaton")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("events", &self.events)
            .finish()
    }
}
