//! Trace of the steps taken during one execution run.
//!
//! Every hop the engine makes while settling an event is recorded here,
//! synthetic guard nodes included. The trace never leaves the process: it is
//! for logs, diagnostics and tests, not for persistence.

use super::guard::GuardRef;
use super::state::{EventName, StateName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What caused a single hop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// The external event was dispatched.
    Event { event: EventName },
    /// A composite state entered its initial child.
    Initial,
    /// The guard resolved truthy and the chain resolved to its target.
    GuardPassed { guard: GuardRef },
    /// The guard resolved falsy; the chain moved on.
    GuardRejected { guard: GuardRef },
    /// The guard failed; treated like a falsy resolution.
    GuardFailed { guard: GuardRef, reason: String },
    /// Every guard rejected; the fallback target was taken.
    Fallback,
}

/// Record of a single hop between two nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceStep {
    /// Node being left
    pub from: StateName,
    /// Node being entered
    pub to: StateName,
    /// Why the hop happened
    pub trigger: Trigger,
    /// When the hop was applied
    pub timestamp: DateTime<Utc>,
}

impl TraceStep {
    pub fn new(from: StateName, to: StateName, trigger: Trigger) -> Self {
        Self {
            from,
            to,
            trigger,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, immutable record of the hops of one run.
///
/// `record` returns a new trace with the step appended.
///
/// # Example
///
/// ```rust
/// use guardwire::core::{EventName, GuardRef, RunTrace, StateName, TraceStep, Trigger};
///
/// let trace = RunTrace::new()
///     .record(TraceStep::new(
///         StateName::new("lit"),
///         StateName::new("internal_3_lit_BREAK_guard_0"),
///         Trigger::Event { event: EventName::new("BREAK") },
///     ))
///     .record(TraceStep::new(
///         StateName::new("internal_3_lit_BREAK_guard_0"),
///         StateName::new("broken"),
///         Trigger::GuardPassed { guard: GuardRef::new("resolveToOK") },
///     ));
///
/// assert_eq!(trace.get_path().len(), 3);
/// assert_eq!(trace.guards_evaluated(), vec![&GuardRef::new("resolveToOK")]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunTrace {
    steps: Vec<TraceStep>,
}

impl RunTrace {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Record a step, returning a new trace.
    pub fn record(&self, step: TraceStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// Nodes traversed: the first `from`, then the `to` of every step.
    pub fn get_path(&self) -> Vec<&StateName> {
        let mut path = Vec::new();
        if let Some(first) = self.steps.first() {
            path.push(&first.from);
        }
        for step in &self.steps {
            path.push(&step.to);
        }
        path
    }

    /// Guards evaluated during the run, in evaluation order.
    pub fn guards_evaluated(&self) -> Vec<&GuardRef> {
        self.steps
            .iter()
            .filter_map(|step| match &step.trigger {
                Trigger::GuardPassed { guard }
                | Trigger::GuardRejected { guard }
                | Trigger::GuardFailed { guard, .. } => Some(guard),
                _ => None,
            })
            .collect()
    }

    /// Time between the first and the last step.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.steps.first(), self.steps.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(from: &str, to: &str, trigger: Trigger) -> TraceStep {
        TraceStep::new(StateName::new(from), StateName::new(to), trigger)
    }

    #[test]
    fn new_trace_is_empty() {
        let trace = RunTrace::new();
        assert!(trace.is_empty());
        assert!(trace.get_path().is_empty());
        assert!(trace.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let trace = RunTrace::new();
        let recorded = trace.record(step(
            "unlit",
            "lit",
            Trigger::Event {
                event: EventName::new("TOGGLE"),
            },
        ));

        assert_eq!(trace.steps().len(), 0);
        assert_eq!(recorded.steps().len(), 1);
    }

    #[test]
    fn path_follows_synthetic_hops() {
        let trace = RunTrace::new()
            .record(step(
                "lit",
                "internal_lit_TOGGLE_guard_0",
                Trigger::Event {
                    event: EventName::new("TOGGLE"),
                },
            ))
            .record(step(
                "internal_lit_TOGGLE_guard_0",
                "internal_lit_TOGGLE_fallback",
                Trigger::GuardRejected {
                    guard: GuardRef::new("resolveToOK"),
                },
            ))
            .record(step("internal_lit_TOGGLE_fallback", "lit", Trigger::Fallback));

        let path: Vec<&str> = trace.get_path().into_iter().map(StateName::as_str).collect();
        assert_eq!(
            path,
            vec![
                "lit",
                "internal_lit_TOGGLE_guard_0",
                "internal_lit_TOGGLE_fallback",
                "lit"
            ]
        );
    }

    #[test]
    fn guards_evaluated_include_failures() {
        let trace = RunTrace::new()
            .record(step(
                "internal_a_GO_guard_0",
                "internal_a_GO_guard_1",
                Trigger::GuardFailed {
                    guard: GuardRef::new("first"),
                    reason: "timeout".to_string(),
                },
            ))
            .record(step(
                "internal_a_GO_guard_1",
                "b",
                Trigger::GuardPassed {
                    guard: GuardRef::new("second"),
                },
            ));

        assert_eq!(
            trace.guards_evaluated(),
            vec![&GuardRef::new("first"), &GuardRef::new("second")]
        );
    }

    #[test]
    fn trace_serializes_with_tagged_triggers() {
        let trace = RunTrace::new().record(step("internal_a_GO_fallback", "a", Trigger::Fallback));

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["steps"][0]["trigger"]["kind"], "fallback");

        let back: RunTrace = serde_json::from_value(json).unwrap();
        assert_eq!(back.steps().len(), 1);
    }
}
