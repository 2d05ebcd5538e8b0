use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::design_controller::{analyze, create_design, generate_document, health};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router. All handlers share the same read-only
/// [`AppState`].
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/design", post(create_design))
        .route("/document", post(generate_document))
        .with_state(state)
}
