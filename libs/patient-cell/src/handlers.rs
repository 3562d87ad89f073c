use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{PatientEmailQuery, PatientProfile};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    patient_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PatientProfile>, AppError> {
    let Path(patient_id) = patient_id?;
    let service = PatientService::new(Arc::clone(&state.store));
    let patient = service.get_patient(patient_id).await?;

    Ok(Json(patient.into()))
}

#[axum::debug_handler]
pub async fn get_patient_by_email(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PatientEmailQuery>, QueryRejection>,
) -> Result<Json<PatientProfile>, AppError> {
    let Query(query) = query?;
    let service = PatientService::new(Arc::clone(&state.store));
    let patient = service.get_patient_by_email(&query.email).await?;

    Ok(Json(patient.into()))
}
