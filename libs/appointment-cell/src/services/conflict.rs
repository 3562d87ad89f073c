// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use shared_database::ScheduleStore;
use shared_models::{Booking, SchedulingError};

pub struct ConflictDetectionService {
    store: Arc<dyn ScheduleStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Confirmed bookings of the provider overlapping `[start, end)`.
    ///
    /// Looks at bookings starting from the day before `start` through the day
    /// `end` falls on, so intervals crossing midnight in either direction are
    /// compared.
    pub async fn find_conflicts(
        &self,
        provider_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Booking>, SchedulingError> {
        debug!("Checking conflicts for provider {} from {} to {}", provider_id, start, end);

        let first_day = start.date().pred_opt().unwrap_or(start.date());
        let mut conflicts = Vec::new();

        for day in first_day.iter_days().take_while(|day| *day <= end.date()) {
            let bookings = self.store.get_confirmed_bookings(provider_id, day).await?;
            conflicts.extend(
                bookings
                    .into_iter()
                    .filter(|booking| booking.is_confirmed() && booking.overlaps(start, end)),
            );
        }

        if !conflicts.is_empty() {
            warn!(
                "Conflict detected for provider {} - {} conflicting bookings",
                provider_id,
                conflicts.len()
            );
        }

        Ok(conflicts)
    }
}
