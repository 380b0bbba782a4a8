//! Event dispatch and settlement.
//!
//! A run offers one event to an instance and walks the compiled automaton
//! until it rests on a declared state again. Guard chains are evaluated
//! strictly in order; the first truthy guard ends the chain and no later
//! guard is invoked.

use crate::compiler::{CompiledAutomaton, Node};
use crate::core::{EventName, RunTrace, StateName, StateValue, TraceStep, Trigger};
use crate::engine::instance::MachineInstance;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Outcome of one run.
#[derive(Clone, Debug)]
pub struct Settled {
    /// Resting value after the run
    pub value: StateValue,
    /// Whether the resting value differs from the value before the run
    pub changed: bool,
    /// Whether any state reacted to the event at all
    pub matched: bool,
    /// Every hop taken, synthetic nodes included
    pub trace: RunTrace,
}

impl Settled {
    /// Top-level state name of the settled value.
    pub fn key(&self) -> StateName {
        self.value.key()
    }
}

/// Inconsistency between an instance and its compiled automaton.
///
/// These indicate a defect in the compiler, never a user error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Machine '{machine}' has no node '{node}'")]
    MissingNode { machine: String, node: StateName },

    #[error("Machine '{machine}': chain of '{owner}' resolved to unaccepted '{target}'")]
    UnresolvedTarget {
        machine: String,
        owner: StateName,
        target: StateName,
    },

    #[error("Machine '{machine}' settled on synthetic value '{value}'")]
    SettledOnSynthetic { machine: String, value: StateValue },
}

/// Dispatch `event` to `instance` and settle.
///
/// The event is offered to the innermost active state first and bubbles
/// outwards until some level reacts. On success the instance is moved to the
/// settled value.
///
/// # Example
///
/// ```rust
/// use guardwire::builder::{otherwise, when, MachineBuilder, StateBuilder};
/// use guardwire::core::{EventName, Guard, StateValue};
/// use guardwire::engine::{instantiate, run};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let automaton = MachineBuilder::<()>::new("bulb")
///     .initial("lit")
///     .guard("resolveToOK", Guard::always(true))
///     .states([
///         StateBuilder::new("lit")
///             .on_guarded("BREAK", [when("resolveToOK", "broken"), otherwise("lit")]),
///         StateBuilder::new("broken").final_state(),
///     ])
///     .build()
///     .unwrap()
///     .compile()
///     .unwrap();
///
/// let mut instance = instantiate(&automaton, None).unwrap();
/// let settled = run(&mut instance, &EventName::new("BREAK"), &()).await.unwrap();
///
/// assert!(settled.changed);
/// assert_eq!(settled.value, StateValue::leaf("broken"));
/// # });
/// ```
pub async fn run<Ctx>(
    instance: &mut MachineInstance<Ctx>,
    event: &EventName,
    ctx: &Ctx,
) -> Result<Settled, EngineError>
where
    Ctx: Clone + Send + Sync + 'static,
{
    let root = Arc::clone(&instance.automaton);
    let levels = active_levels(&root, &instance.value)?;
    let mut trace = RunTrace::new();

    for depth in (0..levels.len()).rev() {
        let (automaton, key) = &levels[depth];
        let Some(entry) = automaton
            .resting(key)
            .and_then(|node| node.on.get(event))
            .cloned()
        else {
            continue;
        };

        trace = trace.record(TraceStep::new(
            key.clone(),
            entry.clone(),
            Trigger::Event {
                event: event.clone(),
            },
        ));

        let target = if entry.is_synthetic() {
            let target = settle_chain(automaton, &entry, ctx, &mut trace).await?;
            accept(automaton, key, target)?
        } else {
            entry
        };

        let mut value = automaton
            .enter(&target)
            .ok_or_else(|| EngineError::MissingNode {
                machine: automaton.id().to_string(),
                node: target.clone(),
            })?;
        trace = record_entry(trace, &value);

        for (_, outer) in levels[..depth].iter().rev() {
            value = StateValue::compound(outer.clone(), value);
        }

        if value.contains_synthetic() {
            return Err(EngineError::SettledOnSynthetic {
                machine: root.id().to_string(),
                value,
            });
        }

        let changed = value != instance.value;
        debug!(
            machine = %root.id(),
            event = %event,
            from = %instance.value,
            to = %value,
            changed,
            "settled"
        );
        instance.value = value.clone();

        return Ok(Settled {
            value,
            changed,
            matched: true,
            trace,
        });
    }

    debug!(
        machine = %root.id(),
        event = %event,
        state = %instance.value,
        "no transition for event"
    );
    Ok(Settled {
        value: instance.value.clone(),
        changed: false,
        matched: false,
        trace,
    })
}

/// Automaton and active state of every level, outermost first.
fn active_levels<'a, Ctx>(
    root: &'a CompiledAutomaton<Ctx>,
    value: &StateValue,
) -> Result<Vec<(&'a CompiledAutomaton<Ctx>, StateName)>, EngineError> {
    let mut levels = Vec::new();
    let mut automaton = root;
    let mut cursor = Some(value);

    while let Some(current) = cursor {
        let key = current.key();
        let node = automaton
            .resting(&key)
            .ok_or_else(|| EngineError::MissingNode {
                machine: automaton.id().to_string(),
                node: key.clone(),
            })?;
        levels.push((automaton, key));

        cursor = match (&node.machine, current.child()) {
            (Some(nested), Some(child)) => {
                automaton = nested.as_ref();
                Some(child)
            }
            _ => None,
        };
    }

    Ok(levels)
}

/// Walk a guard chain from its entry node until it resolves to a target.
async fn settle_chain<Ctx>(
    automaton: &CompiledAutomaton<Ctx>,
    entry: &StateName,
    ctx: &Ctx,
    trace: &mut RunTrace,
) -> Result<StateName, EngineError>
where
    Ctx: Clone + Send + Sync + 'static,
{
    let mut current = entry.clone();

    loop {
        let (next, trigger) = match automaton.node(&current) {
            Some(Node::Resting(_)) => return Ok(current),
            Some(Node::Guard(node)) => match node.guard.check(ctx).await {
                Ok(true) => (
                    node.on_pass.clone(),
                    Trigger::GuardPassed {
                        guard: node.guard_name.clone(),
                    },
                ),
                Ok(false) => (
                    node.on_reject.clone(),
                    Trigger::GuardRejected {
                        guard: node.guard_name.clone(),
                    },
                ),
                Err(error) => {
                    warn!(
                        machine = %automaton.id(),
                        state = %node.owner,
                        event = %node.event,
                        guard = %node.guard_name,
                        %error,
                        "guard failed, treating as rejected"
                    );
                    (
                        node.on_reject.clone(),
                        Trigger::GuardFailed {
                            guard: node.guard_name.clone(),
                            reason: error.to_string(),
                        },
                    )
                }
            },
            Some(Node::Fallback(node)) => (node.target.clone(), Trigger::Fallback),
            None => {
                return Err(EngineError::MissingNode {
                    machine: automaton.id().to_string(),
                    node: current,
                })
            }
        };

        debug!(machine = %automaton.id(), from = %current, to = %next, ?trigger, "step");
        *trace = trace.record(TraceStep::new(current, next.clone(), trigger));
        current = next;
    }
}

/// The owning state takes the resolved target only if one of its own
/// candidate lists named it.
fn accept<Ctx>(
    automaton: &CompiledAutomaton<Ctx>,
    owner: &StateName,
    target: StateName,
) -> Result<StateName, EngineError> {
    let accepted = automaton
        .resting(owner)
        .is_some_and(|node| node.resolutions.contains(&target));

    if accepted {
        Ok(target)
    } else {
        Err(EngineError::UnresolvedTarget {
            machine: automaton.id().to_string(),
            owner: owner.clone(),
            target,
        })
    }
}

/// Record the descent into initial children of composite targets.
fn record_entry(mut trace: RunTrace, value: &StateValue) -> RunTrace {
    let mut current = value;
    while let Some(child) = current.child() {
        trace = trace.record(TraceStep::new(current.key(), child.key(), Trigger::Initial));
        current = child;
    }
    trace
}
