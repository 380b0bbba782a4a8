//! Lowering of a validated definition into a flat automaton.
//!
//! Each guarded candidate list becomes a linear chain of synthetic nodes:
//!
//! ```text
//! lit --BREAK--> internal_3_lit_BREAK_guard_0 --pass--> broken
//!                    |reject
//!                    v
//!                internal_3_lit_BREAK_fallback ---------> lit
//! ```
//!
//! The owner's name is length-prefixed, so `(a, B_C)` and `(a_B, C)` name
//! different nodes.

use crate::compiler::automaton::{CompiledAutomaton, FallbackNode, GuardNode, Node, RestingNode};
use crate::compiler::error::ConfigurationError;
use crate::core::{
    CandidateTransition, EventName, GuardRegistry, MachineDefinition, StateName, TransitionSpec,
    SYNTHETIC_PREFIX,
};
use std::collections::{BTreeMap, BTreeSet};

fn chain_prefix(owner: &StateName, event: &EventName) -> String {
    format!("{SYNTHETIC_PREFIX}{}_{owner}_{event}", owner.as_str().len())
}

pub(crate) fn guard_node_name(owner: &StateName, event: &EventName, index: usize) -> StateName {
    StateName::new(format!("{}_guard_{index}", chain_prefix(owner, event)))
}

pub(crate) fn fallback_node_name(owner: &StateName, event: &EventName) -> StateName {
    StateName::new(format!("{}_fallback", chain_prefix(owner, event)))
}

/// Lower a definition that already passed validation.
pub(crate) fn lower<Ctx>(
    definition: &MachineDefinition,
    guards: &GuardRegistry<Ctx>,
) -> Result<CompiledAutomaton<Ctx>, ConfigurationError> {
    let mut nodes = BTreeMap::new();

    for (name, state) in &definition.states {
        let mut on = BTreeMap::new();
        let mut resolutions = BTreeSet::new();

        for (event, spec) in &state.on {
            let entry = match spec {
                TransitionSpec::Unconditional(target) => target.clone(),
                TransitionSpec::Guarded(candidates) => {
                    resolutions.extend(candidates.iter().map(|c| c.target.clone()));
                    lower_chain(definition, guards, name, event, candidates, &mut nodes)?
                }
            };
            on.insert(event.clone(), entry);
        }

        let machine = match &state.machine {
            Some(nested) => Some(Box::new(lower(nested, guards)?)),
            None => None,
        };

        insert_node(
            definition,
            &mut nodes,
            name.clone(),
            Node::Resting(RestingNode {
                final_state: state.final_state,
                on,
                resolutions,
                machine,
            }),
        )?;
    }

    Ok(CompiledAutomaton {
        id: definition.id.clone(),
        initial: definition.initial.clone(),
        nodes,
        events: definition.events(),
    })
}

/// Emit the nodes of one chain, returning the name of its entry node.
fn lower_chain<Ctx>(
    definition: &MachineDefinition,
    guards: &GuardRegistry<Ctx>,
    owner: &StateName,
    event: &EventName,
    candidates: &[CandidateTransition],
    nodes: &mut BTreeMap<StateName, Node<Ctx>>,
) -> Result<StateName, ConfigurationError> {
    let missing_fallback = || ConfigurationError::MissingFallback {
        machine: definition.id.clone(),
        state: owner.clone(),
        event: event.clone(),
    };
    let (fallback, guarded) = candidates.split_last().ok_or_else(missing_fallback)?;
    if !fallback.is_fallback() {
        return Err(missing_fallback());
    }

    let mut next = fallback_node_name(owner, event);
    insert_node(
        definition,
        nodes,
        next.clone(),
        Node::Fallback(FallbackNode {
            owner: owner.clone(),
            event: event.clone(),
            target: fallback.target.clone(),
        }),
    )?;

    for (index, candidate) in guarded.iter().enumerate().rev() {
        let guard_name = candidate.guard.clone().ok_or_else(|| {
            ConfigurationError::UnreachableCandidate {
                machine: definition.id.clone(),
                state: owner.clone(),
                event: event.clone(),
                position: index,
            }
        })?;
        let guard = guards
            .get(&guard_name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownGuard {
                machine: definition.id.clone(),
                state: owner.clone(),
                event: event.clone(),
                guard: guard_name.clone(),
            })?;

        let name = guard_node_name(owner, event, index);
        insert_node(
            definition,
            nodes,
            name.clone(),
            Node::Guard(GuardNode {
                owner: owner.clone(),
                event: event.clone(),
                guard_name,
                guard,
                on_pass: candidate.target.clone(),
                on_reject: next,
            }),
        )?;
        next = name;
    }

    Ok(next)
}

fn insert_node<Ctx>(
    definition: &MachineDefinition,
    nodes: &mut BTreeMap<StateName, Node<Ctx>>,
    name: StateName,
    node: Node<Ctx>,
) -> Result<(), ConfigurationError> {
    if nodes.contains_key(&name) {
        return Err(ConfigurationError::SyntheticCollision {
            machine: definition.id.clone(),
            node: name,
        });
    }
    nodes.insert(name, node);
    Ok(())
}
