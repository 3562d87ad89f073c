// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument, warn};

use shared_database::{ProviderLocks, ScheduleStore};
use shared_models::time::{format_display, minutes, parse_timestamp, MAX_BOOKING_MINUTES};
use shared_models::{Booking, DayOfWeek, NewBooking, SchedulingError};

use crate::models::{BookAppointmentRequest, BookingConfirmation};
use crate::services::conflict::ConflictDetectionService;

/// Validates and commits bookings.
///
/// Schedule and conflict checks plus the insert run while holding the
/// provider's booking lock, so two overlapping requests for the same
/// provider can never both commit.
pub struct BookingService {
    store: Arc<dyn ScheduleStore>,
    locks: Arc<ProviderLocks>,
    conflict_service: ConflictDetectionService,
}

impl BookingService {
    pub fn new(store: Arc<dyn ScheduleStore>, locks: Arc<ProviderLocks>) -> Self {
        Self {
            conflict_service: ConflictDetectionService::new(Arc::clone(&store)),
            store,
            locks,
        }
    }

    #[instrument(
        skip(self, request),
        fields(patient_id = request.patient_id, provider_id = request.provider_id)
    )]
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookingConfirmation, SchedulingError> {
        let start = parse_timestamp(&request.start)?;
        validate_duration(request.duration_minutes)?;
        let end = start + minutes(request.duration_minutes);

        let patient = self
            .store
            .get_patient(request.patient_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("Patient", request.patient_id))?;

        let provider = self
            .store
            .get_provider(request.provider_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("Provider", request.provider_id))?;

        let _guard = self.locks.acquire(provider.id).await.map_err(|e| {
            warn!("{}", e);
            SchedulingError::Conflict(format!(
                "provider {} is busy, retry the booking",
                provider.id
            ))
        })?;

        self.ensure_within_schedule(provider.id, start).await?;

        let conflicts = self.conflict_service.find_conflicts(provider.id, start, end).await?;
        if !conflicts.is_empty() {
            return Err(SchedulingError::Conflict(format_display(start)));
        }

        let booking = self
            .store
            .insert_booking(NewBooking {
                patient_id: patient.id,
                provider_id: provider.id,
                start,
                duration_minutes: request.duration_minutes,
                is_emergency: request.is_emergency,
            })
            .await?;

        info!(
            "Booked appointment {} for patient {} with provider {} at {}",
            booking.id,
            patient.id,
            provider.id,
            format_display(booking.start)
        );

        Ok(BookingConfirmation::new(&booking, &patient, &provider))
    }

    pub async fn get_booking(&self, booking_id: i64) -> Result<Booking, SchedulingError> {
        debug!("Fetching booking {}", booking_id);

        self.store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("Booking", booking_id))
    }

    /// The start must fall inside an active rule, `rule_start <= start < rule_end`.
    async fn ensure_within_schedule(
        &self,
        provider_id: i64,
        start: NaiveDateTime,
    ) -> Result<(), SchedulingError> {
        let rules = self
            .store
            .get_active_rules(provider_id, DayOfWeek::of(start.date()))
            .await?;

        if rules.iter().any(|rule| rule.admits_start(start.time())) {
            Ok(())
        } else {
            Err(SchedulingError::OutOfSchedule(format_display(start)))
        }
    }
}

fn validate_duration(duration_minutes: u32) -> Result<(), SchedulingError> {
    if (1..=MAX_BOOKING_MINUTES).contains(&duration_minutes) {
        Ok(())
    } else {
        Err(SchedulingError::InvalidFormat(format!(
            "duration must be between 1 and {} minutes, got {}",
            MAX_BOOKING_MINUTES, duration_minutes
        )))
    }
}
