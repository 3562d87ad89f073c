use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use shared_config::AppConfig;
use shared_database::{AppState, InMemoryStore, ScheduleStore};
use shared_models::time::{parse_date, parse_time_of_day, parse_timestamp};
use shared_models::{
    AvailabilityRule, Booking, DayOfWeek, NewAvailabilityRule, NewBooking, NewPatient,
    NewProvider, Patient, Provider,
};

/// A Monday used throughout the test suites.
pub const MONDAY: &str = "2024-06-03";
pub const TUESDAY: &str = "2024-06-04";
pub const SATURDAY: &str = "2024-06-08";

pub fn date(raw: &str) -> NaiveDate {
    parse_date(raw).expect("valid test date")
}

pub fn at(raw: &str) -> NaiveDateTime {
    parse_timestamp(raw).expect("valid test timestamp")
}

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub booking_lock_timeout_ms: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            booking_lock_timeout_ms: 2_000,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            seed_sample_data: false,
            booking_lock_timeout_ms: self.booking_lock_timeout_ms,
            ..AppConfig::default()
        }
    }
}

/// Populates an in-memory store record by record.
pub struct TestStoreBuilder {
    store: Arc<InMemoryStore>,
    config: TestConfig,
}

impl Default for TestStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStoreBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            config: TestConfig::default(),
        }
    }

    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.booking_lock_timeout_ms = timeout_ms;
        self
    }

    pub fn store(&self) -> Arc<InMemoryStore> {
        Arc::clone(&self.store)
    }

    pub fn dyn_store(&self) -> Arc<dyn ScheduleStore> {
        self.store()
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(self.config.to_app_config(), self.dyn_store()))
    }

    pub async fn provider(&self, first_name: &str, last_name: &str, specialty: &str) -> Provider {
        self.store
            .insert_provider(NewProvider {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                specialty: specialty.to_string(),
                phone: Some("555-0200".to_string()),
                email: Some(format!("{}@clinic.com", last_name.to_lowercase())),
                office_location: Some("General Clinic, Room 110".to_string()),
            })
            .await
            .expect("insert provider")
    }

    pub async fn patient(&self, first_name: &str, last_name: &str, email: &str) -> Patient {
        self.store
            .insert_patient(NewPatient {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                date_of_birth: None,
                gender: None,
                phone: Some("555-0101".to_string()),
                email: email.to_string(),
                insurance: None,
            })
            .await
            .expect("insert patient")
    }

    /// Adds an active weekly rule, times given as `HH:MM`.
    pub async fn rule(&self, provider_id: i64, day: DayOfWeek, start: &str, end: &str) -> AvailabilityRule {
        let rule = NewAvailabilityRule::new(
            provider_id,
            day,
            parse_time_of_day(start).expect("valid start"),
            parse_time_of_day(end).expect("valid end"),
        )
        .expect("start before end");
        self.store.insert_rule(rule).await.expect("insert rule")
    }

    pub async fn inactive_rule(&self, provider_id: i64, day: DayOfWeek, start: &str, end: &str) -> AvailabilityRule {
        let rule = NewAvailabilityRule::new(
            provider_id,
            day,
            parse_time_of_day(start).expect("valid start"),
            parse_time_of_day(end).expect("valid end"),
        )
        .expect("start before end")
        .inactive();
        self.store.insert_rule(rule).await.expect("insert rule")
    }

    /// Writes a Confirmed booking straight into the store.
    pub async fn booking(&self, patient_id: i64, provider_id: i64, start: &str, duration_minutes: u32) -> Booking {
        self.store
            .insert_booking(NewBooking {
                patient_id,
                provider_id,
                start: at(start),
                duration_minutes,
                is_emergency: false,
            })
            .await
            .expect("insert booking")
    }
}

/// PostgREST row bodies in the clinic's table layout.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_row(id: i64, first_name: &str, last_name: &str, specialty: &str) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": first_name,
            "last_name": last_name,
            "specialty": specialty,
            "phone": "555-0210",
            "email": "general@clinic.com",
            "office_location": "General Clinic, Room 110",
            "hourly_rate": 240.0
        })
    }

    pub fn patient_row(id: i64, email: &str) -> serde_json::Value {
        json!({
            "id": id,
            "first_name": "John",
            "last_name": "Doe",
            "dob": "1985-05-15",
            "gender": "M",
            "phone": "555-0101",
            "email": email,
            "insurance": "BlueCross"
        })
    }

    pub fn schedule_row(id: i64, doctor_id: i64, day: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "day_of_week": day,
            "start_time": start,
            "end_time": end,
            "is_available": true
        })
    }

    pub fn appointment_row(id: i64, patient_id: i64, doctor_id: i64, start: &str, duration: u32) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_time": start,
            "duration": duration,
            "status": "Confirmed",
            "is_emergency": false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let app_config = TestConfig::default().to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.seed_sample_data);
    }

    #[test]
    fn test_builder_assigns_sequential_ids() {
        let builder = TestStoreBuilder::new();
        let (first, second) = tokio_test::block_on(async {
            let first = builder.provider("Adam", "Smith", "General").await;
            let second = builder.provider("Sophia", "Chen", "Dermatology").await;
            (first, second)
        });

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(second.email.as_deref(), Some("chen@clinic.com"));
    }

    #[test]
    fn test_fixture_dates() {
        assert_eq!(DayOfWeek::of(date(MONDAY)), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::of(date(SATURDAY)), DayOfWeek::Saturday);
        assert_eq!(at("2024-06-03 09:30").date(), date(MONDAY));
    }
}
