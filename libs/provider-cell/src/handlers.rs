use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{
    AvailabilityQuery, AvailabilityResponse, EmergencyQuery, EmergencySlotResponse,
    ExactNameQuery, NameSearchQuery, ProviderListQuery,
};
use crate::services::{AvailabilityService, EmergencyService, ProviderService};

// ==============================================================================
// DIRECTORY
// ==============================================================================

#[axum::debug_handler]
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProviderListQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let provider_service = ProviderService::new(Arc::clone(&state.store));
    let providers = provider_service.list_providers(query.specialty.as_deref()).await?;

    Ok(Json(json!({
        "providers": providers,
        "total": providers.len(),
    })))
}

#[axum::debug_handler]
pub async fn list_specialties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let provider_service = ProviderService::new(Arc::clone(&state.store));
    let specialties = provider_service.specialties().await?;

    Ok(Json(json!({ "specialties": specialties })))
}

#[axum::debug_handler]
pub async fn search_providers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NameSearchQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let provider_service = ProviderService::new(Arc::clone(&state.store));
    let providers = provider_service.search_by_name(&query.name).await?;

    Ok(Json(json!({
        "providers": providers,
        "total": providers.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_provider_by_name(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ExactNameQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let provider_service = ProviderService::new(Arc::clone(&state.store));
    let provider = provider_service
        .get_by_name(&query.first_name, &query.last_name)
        .await?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn get_provider(
    State(state): State<Arc<AppState>>,
    provider_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(provider_id) = provider_id?;
    let provider_service = ProviderService::new(Arc::clone(&state.store));
    let provider = provider_service.get_provider(provider_id).await?;

    Ok(Json(json!(provider)))
}

// ==============================================================================
// SLOTS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_provider_availability(
    State(state): State<Arc<AppState>>,
    provider_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Path(provider_id) = provider_id?;
    let Query(query) = query?;
    let availability_service = AvailabilityService::new(Arc::clone(&state.store));
    let availability = availability_service
        .list_availability(provider_id, &query.date)
        .await?;

    Ok(Json(availability))
}

#[axum::debug_handler]
pub async fn find_emergency_slot(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EmergencyQuery>, QueryRejection>,
) -> Result<Json<EmergencySlotResponse>, AppError> {
    let Query(query) = query?;
    let emergency_service = EmergencyService::new(Arc::clone(&state.store));
    let found = emergency_service
        .earliest_for_specialty(&query.specialty, &query.date)
        .await?;

    Ok(Json(found.into()))
}
