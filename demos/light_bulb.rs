//! Light bulb served over HTTP.
//!
//! ```text
//! cargo run --example light_bulb
//! curl localhost:4000/machine/toggle   # 200 {"nextState":"lit"}
//! curl localhost:4000/machine/break    # 200 {"nextState":"broken"}
//! curl localhost:4000/machine/toggle   # 409 {"nextState":"broken"}
//! ```

use guardwire::builder::{otherwise, when, MachineBuilder, StateBuilder};
use guardwire::config::ServerConfig;
use guardwire::core::{Guard, StateValue};
use guardwire::http::{machine_router, serve};
use guardwire::state_enum;
use guardwire::store::{InMemoryStore, JsonFileStore, PersistedState, StateStore};
use guardwire::MachineFactory;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

state_enum! {
    enum Bulb {
        Unlit = "unlit",
        Lit = "lit",
        Broken = "broken",
    }
    final: [Broken]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Wiring {
    fuse_intact: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let automaton = MachineBuilder::new("lightBulb")
        .initial(Bulb::Unlit)
        .guard("resolveToOK", Guard::predicate(|wiring: &Wiring| wiring.fuse_intact))
        .states([
            StateBuilder::for_state(&Bulb::Unlit)
                .on_guarded("TOGGLE", [when("resolveToOK", Bulb::Lit), otherwise(Bulb::Unlit)])
                .on_guarded("BREAK", [when("resolveToOK", Bulb::Broken), otherwise(Bulb::Unlit)]),
            StateBuilder::for_state(&Bulb::Lit)
                .on_guarded("TOGGLE", [when("resolveToOK", Bulb::Unlit), otherwise(Bulb::Lit)])
                .on_guarded("BREAK", [when("resolveToOK", Bulb::Broken), otherwise(Bulb::Lit)]),
            StateBuilder::for_state(&Bulb::Broken),
        ])
        .build()?
        .compile()?;

    let seed = PersistedState::new(StateValue::leaf(Bulb::Unlit), Wiring { fuse_intact: true });
    let store: Arc<dyn StateStore<Wiring>> = match &config.state_file {
        Some(path) => Arc::new(JsonFileStore::open_or_seed(path, &seed).await?),
        None => Arc::new(InMemoryStore::new(seed)),
    };
    let factory: Arc<dyn MachineFactory<Wiring>> = Arc::new(automaton);

    let routes = machine_router(factory, store)?;
    serve(&config, routes).await?;

    Ok(())
}
