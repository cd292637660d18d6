mod configuration;
mod error;
mod rate_limit;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use folio::content::store::ContentStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::configuration::Settings;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;

    let store = ContentStore::load(&settings.content.dir)
        .with_context(|| format!("loading site content from {}", settings.content.dir))?;
    info!(
        projects = store.projects().len(),
        "content loaded from {}", settings.content.dir
    );

    let limiter = RateLimiter::new(
        settings.rate_limit.limit,
        Duration::from_secs(settings.rate_limit.window_secs),
    );

    let state = AppState {
        provider_config: settings.provider.into_config(),
        store: Arc::new(store),
        limiter: Arc::new(limiter),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state)
        .layer(cors)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    let addr = settings.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
