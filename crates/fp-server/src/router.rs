use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::body_limit_for;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Flowerpress endpoints.
pub fn build_router(state: AppState) -> Router {
    let body_limit = body_limit_for(state.service.limits());
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route(
            "/api/spaces/:space_id/docs/:slug/markdown",
            get(handler::get_markdown).post(handler::save_markdown),
        )
        .route(
            "/api/spaces/:space_id/docs/:slug/assets",
            get(handler::list_assets).post(handler::upload_asset),
        )
        .route(
            "/api/spaces/:space_id/documents",
            get(handler::list_documents).post(handler::create_document),
        )
        .route(
            "/api/spaces/:space_id/documents/:id",
            patch(handler::rename_document).delete(handler::delete_document),
        )
        .route(
            "/api/spaces/:space_id/folders",
            axum::routing::post(handler::create_folder),
        )
        .route("/api/spaces/:space_id/filesystem", get(handler::filesystem))
        .route("/storage/*key", get(handler::storage_object))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
