pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Demo analysis API
        .route("/api/v1/demo/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/demo/sessions/:id",
            get(handlers::handle_get_session),
        )
        .with_state(state)
}
