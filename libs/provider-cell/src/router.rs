use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::AppState;

use crate::handlers;

pub fn provider_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_providers))
        .route("/specialties", get(handlers::list_specialties))
        .route("/search", get(handlers::search_providers))
        .route("/by-name", get(handlers::get_provider_by_name))
        .route("/emergency", get(handlers::find_emergency_slot))
        .route("/{provider_id}", get(handlers::get_provider))
        .route("/{provider_id}/availability", get(handlers::get_provider_availability))
        .with_state(state)
}
