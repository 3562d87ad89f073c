use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use shared_database::ScheduleStore;
use shared_models::time::{format_display, intervals_overlap, minutes, parse_date, SLOT_MINUTES};
use shared_models::{AvailabilityRule, Booking, DayOfWeek, SchedulingError, Slot};

use crate::models::AvailabilityResponse;

pub struct AvailabilityService {
    store: Arc<dyn ScheduleStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Open 30-minute slots for a provider on a `YYYY-MM-DD` date.
    pub async fn generate(&self, provider_id: i64, date: &str) -> Result<Vec<Slot>, SchedulingError> {
        let date = parse_date(date)?;
        self.generate_for_date(provider_id, date).await
    }

    pub async fn generate_for_date(
        &self,
        provider_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SchedulingError> {
        if self.store.get_provider(provider_id).await?.is_none() {
            return Err(SchedulingError::not_found("Provider", provider_id));
        }
        self.slots_for_known_provider(provider_id, date).await
    }

    /// Slot generation for a provider id already resolved by the caller.
    pub(crate) async fn slots_for_known_provider(
        &self,
        provider_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SchedulingError> {
        let rules = self
            .store
            .get_active_rules(provider_id, DayOfWeek::of(date))
            .await?;

        if rules.is_empty() {
            debug!("Provider {} has no rules on {}", provider_id, date);
            return Ok(Vec::new());
        }

        let mut bookings = Vec::new();
        if let Some(previous_day) = date.pred_opt() {
            bookings.extend(self.store.get_confirmed_bookings(provider_id, previous_day).await?);
        }
        bookings.extend(self.store.get_confirmed_bookings(provider_id, date).await?);

        let slots = compute_slots(date, &rules, &bookings);
        debug!("Found {} available slots for provider {} on {}", slots.len(), provider_id, date);
        Ok(slots)
    }

    pub async fn list_availability(
        &self,
        provider_id: i64,
        date: &str,
    ) -> Result<AvailabilityResponse, SchedulingError> {
        let parsed = parse_date(date)?;
        let slots = self.generate_for_date(provider_id, parsed).await?;

        Ok(AvailabilityResponse {
            provider_id,
            date: parsed.to_string(),
            total_slots: slots.len(),
            available_slots: slots.iter().map(|slot| format_display(slot.start)).collect(),
        })
    }
}

/// Steps through each active rule in 30-minute increments and keeps the
/// candidates no Confirmed booking overlaps.
pub fn compute_slots(date: NaiveDate, rules: &[AvailabilityRule], bookings: &[Booking]) -> Vec<Slot> {
    let busy: Vec<(NaiveDateTime, NaiveDateTime)> = bookings
        .iter()
        .filter(|booking| booking.is_confirmed())
        .map(|booking| (booking.start, booking.end()))
        .collect();

    let step = minutes(SLOT_MINUTES);
    let mut slots = Vec::new();

    for rule in rules.iter().filter(|rule| rule.is_active()) {
        let (window_start, window_end) = rule.window_on(date);
        let mut current = window_start;

        while current + step <= window_end {
            let candidate = Slot::starting_at(current);
            let taken = busy
                .iter()
                .any(|&(start, end)| intervals_overlap(candidate.start, candidate.end, start, end));

            if !taken {
                slots.push(candidate);
            }
            current += step;
        }
    }

    remove_overlapping_slots(slots)
}

/// Sorts ascending and drops any slot that overlaps one already kept.
fn remove_overlapping_slots(mut slots: Vec<Slot>) -> Vec<Slot> {
    slots.sort_by_key(|slot| slot.start);

    let mut result: Vec<Slot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match result.last() {
            Some(last) if slot.start < last.end => {}
            _ => result.push(slot),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use shared_models::{BookingStatus, NewBooking};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn rule(id: i64, start: (u32, u32), end: (u32, u32)) -> AvailabilityRule {
        AvailabilityRule::new(
            id,
            1,
            DayOfWeek::Monday,
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            true,
        )
        .unwrap()
    }

    fn booking(id: i64, hour: u32, minute: u32, duration_minutes: u32) -> Booking {
        NewBooking {
            patient_id: 1,
            provider_id: 1,
            start: monday().and_hms_opt(hour, minute, 0).unwrap(),
            duration_minutes,
            is_emergency: false,
        }
        .into_booking(id)
    }

    fn starts(slots: &[Slot]) -> Vec<String> {
        slots.iter().map(|s| s.start.format("%H:%M").to_string()).collect()
    }

    #[test]
    fn no_partial_trailing_slot() {
        let slots = compute_slots(monday(), &[rule(1, (9, 0), (10, 45))], &[]);
        assert_eq!(starts(&slots), vec!["09:00", "09:30", "10:00"]);
    }

    #[test]
    fn long_booking_blocks_every_slot_it_touches() {
        let slots = compute_slots(monday(), &[rule(1, (9, 0), (12, 0))], &[booking(1, 9, 15, 60)]);
        assert_eq!(starts(&slots), vec!["10:30", "11:00", "11:30"]);
    }

    #[test]
    fn cancelled_bookings_do_not_block() {
        let mut cancelled = booking(1, 9, 0, 30);
        cancelled.status = BookingStatus::Cancelled;

        let slots = compute_slots(monday(), &[rule(1, (9, 0), (10, 0))], &[cancelled]);
        assert_eq!(starts(&slots), vec!["09:00", "09:30"]);
    }

    #[test]
    fn overlapping_rules_yield_non_overlapping_sorted_slots() {
        let rules = [rule(2, (10, 15), (11, 15)), rule(1, (9, 0), (10, 30))];
        let slots = compute_slots(monday(), &rules, &[]);

        assert_eq!(starts(&slots), vec!["09:00", "09:30", "10:00", "10:45"]);
        assert!(slots.windows(2).all(|pair| pair[0].end <= pair[1].start));
    }

    #[test]
    fn previous_day_booking_spilling_past_midnight() {
        let late = NewBooking {
            patient_id: 1,
            provider_id: 1,
            start: monday().pred_opt().unwrap().and_hms_opt(23, 30, 0).unwrap(),
            duration_minutes: 60,
            is_emergency: false,
        }
        .into_booking(9);

        let slots = compute_slots(monday(), &[rule(1, (0, 0), (1, 30))], &[late]);
        assert_eq!(starts(&slots), vec!["00:30", "01:00"]);
    }
}
