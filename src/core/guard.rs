//! Asynchronous guard predicates.
//!
//! A guard decides whether a candidate transition is taken. Guards are
//! effects over the machine's context: each evaluation builds a fresh
//! stillwater effect and runs it against the context of the current request,
//! so a guard may be a pure check or may reach out to I/O.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::sync::Arc;
use stillwater::effect::{BoxedEffect, Effect};
use stillwater::prelude::*;

/// Failure raised by a guard predicate.
///
/// The engine treats a failed guard like a guard that resolved `false`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardError {
    #[error("guard predicate failed: {0}")]
    Failed(String),
}

/// Effect produced by one guard evaluation.
pub type GuardEffect<Ctx> = BoxedEffect<bool, GuardError, Ctx>;

/// Factory creating a fresh guard effect for every evaluation.
pub type GuardFactory<Ctx> = Arc<dyn Fn() -> GuardEffect<Ctx> + Send + Sync>;

/// Asynchronous predicate `(context) -> bool`.
///
/// # Example
///
/// ```rust
/// use guardwire::core::Guard;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let is_positive = Guard::predicate(|level: &i32| *level > 0);
///
/// assert_eq!(is_positive.check(&3).await, Ok(true));
/// assert_eq!(is_positive.check(&-1).await, Ok(false));
/// # });
/// ```
pub struct Guard<Ctx> {
    factory: GuardFactory<Ctx>,
}

impl<Ctx> Clone for Guard<Ctx> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Guard<Ctx> {
    /// Create a guard from an effect factory.
    ///
    /// The factory is called once per evaluation and must return a fresh
    /// effect each time.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> GuardEffect<Ctx> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Create a guard from a plain predicate over the context.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Ctx) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Self::new(move || {
            let predicate = Arc::clone(&predicate);
            from_fn(move |ctx: &Ctx| Ok(predicate(ctx))).boxed()
        })
    }

    /// Guard that always resolves to `value`.
    pub fn always(value: bool) -> Self {
        Self::new(move || pure(value).boxed())
    }

    /// Evaluate the guard against a context.
    pub async fn check(&self, ctx: &Ctx) -> Result<bool, GuardError> {
        (self.factory)().run(ctx).await
    }
}

/// Name under which a guard is registered.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuardRef(String);

impl GuardRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GuardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GuardRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for GuardRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Guards available to a machine, looked up by name at compile time.
pub struct GuardRegistry<Ctx> {
    guards: BTreeMap<GuardRef, Guard<Ctx>>,
}

impl<Ctx> Clone for GuardRegistry<Ctx> {
    fn clone(&self) -> Self {
        Self {
            guards: self.guards.clone(),
        }
    }
}

impl<Ctx> Default for GuardRegistry<Ctx> {
    fn default() -> Self {
        Self {
            guards: BTreeMap::new(),
        }
    }
}

impl<Ctx> GuardRegistry<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guard, replacing any guard previously registered under
    /// the same name.
    pub fn register(&mut self, name: impl Into<GuardRef>, guard: Guard<Ctx>) {
        self.guards.insert(name.into(), guard);
    }

    pub fn get(&self, name: &GuardRef) -> Option<&Guard<Ctx>> {
        self.guards.get(name)
    }

    pub fn contains(&self, name: &GuardRef) -> bool {
        self.guards.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &GuardRef> {
        self.guards.keys()
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct Bulb {
        wattage: u32,
    }

    #[tokio::test]
    async fn predicate_guard_reads_context() {
        let guard = Guard::predicate(|bulb: &Bulb| bulb.wattage <= 60);

        assert_eq!(guard.check(&Bulb { wattage: 40 }).await, Ok(true));
        assert_eq!(guard.check(&Bulb { wattage: 100 }).await, Ok(false));
    }

    #[tokio::test]
    async fn constant_guards_resolve_their_value() {
        let ctx = Bulb { wattage: 0 };

        assert_eq!(Guard::always(true).check(&ctx).await, Ok(true));
        assert_eq!(Guard::always(false).check(&ctx).await, Ok(false));
    }

    #[tokio::test]
    async fn failing_guard_reports_error() {
        let guard: Guard<Bulb> =
            Guard::new(|| fail(GuardError::Failed("socket unreachable".to_string())).boxed());

        let result = guard.check(&Bulb { wattage: 60 }).await;

        assert_eq!(
            result,
            Err(GuardError::Failed("socket unreachable".to_string()))
        );
    }

    #[tokio::test]
    async fn factory_runs_once_per_check() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let guard: Guard<Bulb> = Guard::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            pure(true).boxed()
        });

        let ctx = Bulb { wattage: 60 };
        guard.check(&ctx).await.unwrap();
        guard.check(&ctx).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn registry_resolves_by_name() {
        let mut registry = GuardRegistry::new();
        registry.register("resolveToOK", Guard::<Bulb>::always(true));

        assert!(registry.contains(&GuardRef::new("resolveToOK")));
        assert!(registry.get(&GuardRef::new("missing")).is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.names().map(GuardRef::as_str).collect::<Vec<_>>(),
            vec!["resolveToOK"]
        );
    }
}
