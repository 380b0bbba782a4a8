//! Event routes backed by a machine factory and a state store.

use crate::core::{EventName, StateValue};
use crate::engine::{run, EngineError, MachineFactory, UnknownStateError};
use crate::http::response::EventResponse;
use crate::store::{StateStore, StoreError};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

/// Failure of one event request. Always answered with `500 {}`.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("loading state failed: {0}")]
    Load(#[source] StoreError),

    #[error(transparent)]
    UnknownState(#[from] UnknownStateError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("saving state failed: {0}")]
    Save(#[source] StoreError),

    #[error("run settled on synthetic state '{0}'")]
    SyntheticLeak(StateValue),
}

/// One machine exposed over HTTP.
pub struct MachineResource<Ctx> {
    factory: Arc<dyn MachineFactory<Ctx>>,
    store: Arc<dyn StateStore<Ctx>>,
}

impl<Ctx> Clone for MachineResource<Ctx> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            store: Arc::clone(&self.store),
        }
    }
}

impl<Ctx> MachineResource<Ctx>
where
    Ctx: Clone + Send + Sync + 'static,
{
    pub fn new(factory: Arc<dyn MachineFactory<Ctx>>, store: Arc<dyn StateStore<Ctx>>) -> Self {
        Self { factory, store }
    }

    /// Router with one `GET /<event>` route per public event.
    ///
    /// The event set is read once from an instance at the initial state.
    pub fn router(self) -> Result<Router, UnknownStateError> {
        let seed = self.factory.create(None)?;
        let automaton = seed.automaton();
        let events: Vec<EventName> = automaton.public_events().into_iter().cloned().collect();

        let resource = Arc::new(self);
        let mut router = Router::new();
        for event in events {
            let path = format!("/{}", event.route_segment());
            info!(machine = %automaton.id(), %event, route = %path, "registered event route");

            let resource = Arc::clone(&resource);
            router = router.route(
                &path,
                get(move || {
                    let resource = Arc::clone(&resource);
                    let event = event.clone();
                    async move { resource.handle(&event).await }
                }),
            );
        }

        Ok(router)
    }

    /// Apply `event` to the stored machine and map the outcome to a response.
    pub async fn handle(&self, event: &EventName) -> EventResponse {
        let span = info_span!("machine_event", run_id = %Uuid::new_v4(), event = %event);

        async move {
            match self.try_handle(event).await {
                Ok(response) => response,
                Err(err) => {
                    error!(error = %err, "event request failed");
                    EventResponse::Failed
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_handle(&self, event: &EventName) -> Result<EventResponse, AdapterError> {
        let persisted = self.store.load().await.map_err(AdapterError::Load)?;
        let mut instance = self.factory.restore(&persisted.value)?;
        let settled = run(&mut instance, event, &persisted.context).await?;

        if settled.value.contains_synthetic() {
            return Err(AdapterError::SyntheticLeak(settled.value));
        }

        if !settled.changed {
            debug!(state = %settled.value, matched = settled.matched, "event left state unchanged");
            return Ok(EventResponse::Rejected(settled.value));
        }

        let key = settled.key();
        let next = persisted.advance(settled.value);
        self.store.save(&next).await.map_err(AdapterError::Save)?;
        info!(
            from = %persisted.value,
            to = %next.value,
            revision = next.revision,
            guards = settled.trace.guards_evaluated().len(),
            "event applied"
        );

        Ok(EventResponse::Applied(key))
    }
}

/// Router for `factory` and `store`. See [`MachineResource::router`].
pub fn machine_router<Ctx>(
    factory: Arc<dyn MachineFactory<Ctx>>,
    store: Arc<dyn StateStore<Ctx>>,
) -> Result<Router, UnknownStateError>
where
    Ctx: Clone + Send + Sync + 'static,
{
    MachineResource::new(factory, store).router()
}
