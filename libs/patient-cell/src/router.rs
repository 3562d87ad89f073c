use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::AppState;

use crate::handlers::*;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/by-email", get(get_patient_by_email))
        .route("/{patient_id}", get(get_patient))
        .with_state(state)
}
