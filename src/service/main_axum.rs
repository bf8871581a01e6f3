use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::config::WishConfig;
use crate::handlers::handlers::{debug_assets, index, stream_media, wish};
use crate::service::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/wish", get(wish))
        .route("/debug_assets", get(debug_assets))
        .route("/static/{segment}/{file_name}", get(stream_media))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Prepare the static directories and serve until the process is stopped.
pub async fn start_axum_server(config: WishConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = AppState::from_config(&config);

    state.resolver.ensure_directories().await?;
    state.resolver.log_inventory().await;
    if !state.debug_assets {
        info!("/debug_assets is disabled");
    }

    let app = build_router(Arc::new(state));

    info!("Listening on http://{}", addr);
    axum_server::Server::bind(addr)
        .serve(app.into_make_service())
        .await
        .context("Server stopped with an error")
}
