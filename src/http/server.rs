//! Serving machine routes.

use crate::config::ServerConfig;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Mount `routes` under `route_prefix` and add request tracing.
///
/// An empty or `/` prefix mounts the routes at the root.
pub fn app(route_prefix: &str, routes: Router) -> Router {
    let prefix = route_prefix.trim_matches('/');
    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&format!("/{prefix}"), routes)
    };

    app.layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until the listener fails.
pub async fn serve(config: &ServerConfig, routes: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        prefix = %config.route_prefix,
        "listening"
    );

    axum::serve(listener, app(&config.route_prefix, routes)).await
}
