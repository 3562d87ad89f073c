use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use shared_models::{
    AvailabilityRule, Booking, DayOfWeek, NewAvailabilityRule, NewBooking, NewPatient,
    NewProvider, Patient, Provider, SchedulingError,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A concurrent write or a uniqueness/exclusion constraint rejected the write.
    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Failed to decode record: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => SchedulingError::Conflict(msg),
            other => SchedulingError::StoreFailure(other.to_string()),
        }
    }
}

/// Persistence and lookup for providers, weekly rules, patients and bookings.
///
/// Implementations hold no scheduling logic. Each call acquires whatever
/// connection or guard it needs and releases it before returning.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get_provider(&self, provider_id: i64) -> StoreResult<Option<Provider>>;

    /// All providers in identifier order.
    async fn list_providers(&self) -> StoreResult<Vec<Provider>>;

    /// Providers whose specialty equals `specialty` exactly, in identifier order.
    async fn get_providers_by_specialty(&self, specialty: &str) -> StoreResult<Vec<Provider>>;

    async fn get_patient(&self, patient_id: i64) -> StoreResult<Option<Patient>>;

    /// Email match ignoring ASCII case.
    async fn get_patient_by_email(&self, email: &str) -> StoreResult<Option<Patient>>;

    /// Active rules of a provider for one weekday, ordered by start time.
    async fn get_active_rules(
        &self,
        provider_id: i64,
        day: DayOfWeek,
    ) -> StoreResult<Vec<AvailabilityRule>>;

    /// Confirmed bookings of a provider that start on `date`, ordered by start.
    async fn get_confirmed_bookings(
        &self,
        provider_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Vec<Booking>>;

    async fn get_booking(&self, booking_id: i64) -> StoreResult<Option<Booking>>;

    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking>;

    async fn insert_provider(&self, provider: NewProvider) -> StoreResult<Provider>;

    async fn insert_rule(&self, rule: NewAvailabilityRule) -> StoreResult<AvailabilityRule>;

    /// Fails with [`StoreError::Conflict`] when the email is already registered
    /// under any letter case.
    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient>;
}
