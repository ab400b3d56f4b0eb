//! Route table and middleware stack.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Builds the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/v1/me", get(handlers::get_session))
        .route("/v1/me/statistics", get(handlers::get_my_statistics))
        .route("/v1/me/fuel", post(handlers::submit_fuel_record))
        .route("/v1/me/repairs", post(handlers::submit_repair_record))
        .route(
            "/v1/vehicles/{vehicle_number}/statistics",
            get(handlers::get_vehicle_statistics),
        )
        .route(
            "/v1/drivers",
            get(handlers::list_drivers).post(handlers::create_driver),
        )
        .route(
            "/v1/drivers/{driver_id}",
            get(handlers::get_driver)
                .put(handlers::update_driver)
                .delete(handlers::delete_driver),
        )
        .route("/v1/imports", post(handlers::start_import))
        .route("/v1/jobs/{job_id}", get(handlers::get_job_status))
        .route("/v1/jobs/{job_id}/logs", get(handlers::stream_job_logs))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::StaticTokenVerifier;
    use crate::db::factory::RepositoryFactory;

    #[tokio::test]
    async fn router_builds_with_local_state() {
        let state = AppState::new(
            RepositoryFactory::create_local(),
            Arc::new(StaticTokenVerifier::new()),
        );
        let _router = create_router(state);
    }
}
