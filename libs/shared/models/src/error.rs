use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Coarse classification callers use to decide how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidFormat,
    OutOfSchedule,
    Conflict,
    StoreFailure,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("No available slot for specialty '{specialty}' on {date} ({providers_checked} providers checked)")]
    NoAvailableSlot {
        specialty: String,
        date: NaiveDate,
        providers_checked: usize,
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("The selected time is outside the doctor's working hours: {0}")]
    OutOfSchedule(String),

    #[error("The selected time slot is not available: {0}")]
    Conflict(String),

    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl SchedulingError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        SchedulingError::NotFound(format!("{} {}", entity, id))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulingError::NotFound(_) | SchedulingError::NoAvailableSlot { .. } => {
                ErrorKind::NotFound
            }
            SchedulingError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            SchedulingError::OutOfSchedule(_) => ErrorKind::OutOfSchedule,
            SchedulingError::Conflict(_) => ErrorKind::Conflict,
            SchedulingError::StoreFailure(_) => ErrorKind::StoreFailure,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error("Bad Request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Scheduling(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidFormat => StatusCode::BAD_REQUEST,
                ErrorKind::OutOfSchedule => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// Extractor rejections surface as JSON bodies like every other failure.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, message);
        } else {
            tracing::warn!("Rejected: {}: {}", status, message);
        }

        let body = match &self {
            AppError::Scheduling(SchedulingError::NoAvailableSlot { providers_checked, .. }) => json!({
                "error": message,
                "kind": ErrorKind::NotFound,
                "providers_checked": providers_checked,
            }),
            AppError::Scheduling(err) => json!({
                "error": message,
                "kind": err.kind(),
            }),
            AppError::BadRequest(_) => json!({
                "error": message,
                "kind": ErrorKind::InvalidFormat,
            }),
        };

        (status, Json(body)).into_response()
    }
}
