// libs/appointment-cell/tests/booking_test.rs
//
// Booking validation order, boundaries and store error mapping.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use appointment_cell::models::BookAppointmentRequest;
use appointment_cell::services::BookingService;
use provider_cell::services::AvailabilityService;
use shared_database::{MockScheduleStore, ProviderLocks, StoreError};
use shared_models::{AvailabilityRule, DayOfWeek, Patient, Provider, SchedulingError};
use shared_utils::test_utils::{TestStoreBuilder, MONDAY};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

struct Clinic {
    builder: TestStoreBuilder,
    service: BookingService,
    provider_id: i64,
    patient_id: i64,
}

/// One General provider working Monday 09:00-12:00 and one registered patient.
async fn clinic() -> Clinic {
    let builder = TestStoreBuilder::new();
    let provider = builder.provider("Adam", "Smith", "General").await;
    let patient = builder.patient("John", "Doe", "john.doe@email.com").await;
    builder.rule(provider.id, DayOfWeek::Monday, "09:00", "12:00").await;

    let state = builder.state();
    let service = BookingService::new(Arc::clone(&state.store), Arc::clone(&state.booking_locks));

    Clinic {
        builder,
        service,
        provider_id: provider.id,
        patient_id: patient.id,
    }
}

fn request(patient_id: i64, provider_id: i64, start: &str, duration_minutes: u32) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id,
        provider_id,
        start: start.to_string(),
        duration_minutes,
        is_emergency: false,
    }
}

impl Clinic {
    async fn book(&self, start: &str, duration_minutes: u32) -> Result<i64, SchedulingError> {
        self.service
            .book(request(self.patient_id, self.provider_id, start, duration_minutes))
            .await
            .map(|confirmation| confirmation.confirmation_id)
    }
}

// ==============================================================================
// SUCCESSFUL BOOKINGS
// ==============================================================================

#[tokio::test]
async fn test_confirmation_carries_patient_and_provider_details() {
    let clinic = clinic().await;
    let mut emergency = request(clinic.patient_id, clinic.provider_id, "2024-06-03T10:00", 30);
    emergency.is_emergency = true;

    let confirmation = clinic.service.book(emergency).await.unwrap();

    assert_eq!(confirmation.appointment_time, "2024-06-03 10:00");
    assert_eq!(confirmation.duration_minutes, 30);
    assert!(confirmation.is_emergency);
    assert_eq!(confirmation.patient.name, "John Doe");
    assert_eq!(confirmation.patient.email, "john.doe@email.com");
    assert_eq!(confirmation.provider.name, "Adam Smith");
    assert_eq!(confirmation.provider.specialty, "General");

    let stored = clinic.service.get_booking(confirmation.confirmation_id).await.unwrap();
    assert_eq!(stored.provider_id, clinic.provider_id);
    assert!(stored.is_confirmed());
}

#[tokio::test]
async fn test_booked_slot_disappears_from_availability() {
    let clinic = clinic().await;
    clinic.book("2024-06-03 10:00", 30).await.unwrap();

    let slots: Vec<String> = AvailabilityService::new(clinic.builder.dyn_store())
        .generate(clinic.provider_id, MONDAY)
        .await
        .unwrap()
        .iter()
        .map(|slot| slot.display_start())
        .collect();

    assert_eq!(slots.len(), 5);
    assert!(!slots.contains(&"2024-06-03 10:00".to_string()));
    assert!(slots.contains(&"2024-06-03 09:30".to_string()));
    assert!(slots.contains(&"2024-06-03 10:30".to_string()));
}

#[tokio::test]
async fn test_back_to_back_bookings_are_both_accepted() {
    let clinic = clinic().await;

    assert!(clinic.book("2024-06-03 10:00", 30).await.is_ok());
    assert!(clinic.book("2024-06-03 10:30", 30).await.is_ok());
    assert!(clinic.book("2024-06-03 09:30", 30).await.is_ok());
    assert_eq!(clinic.builder.store().booking_count().await, 3);
}

#[tokio::test]
async fn test_last_slot_of_rule_is_bookable() {
    let clinic = clinic().await;
    assert!(clinic.book("2024-06-03 11:30", 30).await.is_ok());
}

#[tokio::test]
async fn test_only_start_must_fall_inside_rule() {
    let clinic = clinic().await;
    assert!(clinic.book("2024-06-03 11:45", 60).await.is_ok());
}

// ==============================================================================
// REJECTIONS
// ==============================================================================

#[tokio::test]
async fn test_overlapping_booking_is_conflict() {
    let clinic = clinic().await;
    clinic.book("2024-06-03 10:00", 30).await.unwrap();

    assert_matches!(clinic.book("2024-06-03 10:00", 30).await, Err(SchedulingError::Conflict(_)));
    assert_matches!(clinic.book("2024-06-03 09:45", 30).await, Err(SchedulingError::Conflict(_)));
    assert_matches!(clinic.book("2024-06-03 09:00", 90).await, Err(SchedulingError::Conflict(_)));
    assert_eq!(clinic.builder.store().booking_count().await, 1);
}

#[tokio::test]
async fn test_start_at_rule_end_is_out_of_schedule() {
    let clinic = clinic().await;

    assert_matches!(clinic.book("2024-06-03 12:00", 30).await, Err(SchedulingError::OutOfSchedule(_)));
    assert_matches!(clinic.book("2024-06-03 08:30", 30).await, Err(SchedulingError::OutOfSchedule(_)));
    assert_matches!(clinic.book("2024-06-04 10:00", 30).await, Err(SchedulingError::OutOfSchedule(_)));
}

#[tokio::test]
async fn test_out_of_schedule_is_checked_before_conflict() {
    let clinic = clinic().await;
    clinic
        .builder
        .booking(clinic.patient_id, clinic.provider_id, "2024-06-03 11:30", 60)
        .await;

    assert_matches!(clinic.book("2024-06-03 12:00", 30).await, Err(SchedulingError::OutOfSchedule(_)));
}

#[tokio::test]
async fn test_unknown_patient_is_checked_before_provider() {
    let clinic = clinic().await;

    let err = clinic
        .service
        .book(request(999, 888, "2024-06-03 10:00", 30))
        .await
        .unwrap_err();
    assert_eq!(err, SchedulingError::not_found("Patient", 999));

    let err = clinic
        .service
        .book(request(clinic.patient_id, 888, "2024-06-03 10:00", 30))
        .await
        .unwrap_err();
    assert_eq!(err, SchedulingError::not_found("Provider", 888));
}

#[tokio::test]
async fn test_malformed_input_is_invalid_format() {
    let clinic = clinic().await;

    for start in ["03/06/2024 10:00", "2024-06-03", "10:00", ""] {
        assert_matches!(clinic.book(start, 30).await, Err(SchedulingError::InvalidFormat(_)));
    }
    assert_matches!(clinic.book("2024-06-03 10:00", 0).await, Err(SchedulingError::InvalidFormat(_)));
    assert_matches!(clinic.book("2024-06-03 10:00", 481).await, Err(SchedulingError::InvalidFormat(_)));
}

#[tokio::test]
async fn test_unknown_booking_is_not_found() {
    let clinic = clinic().await;
    assert_matches!(clinic.service.get_booking(42).await, Err(SchedulingError::NotFound(_)));
}

// ==============================================================================
// LOCKING AND STORE FAILURES
// ==============================================================================

#[tokio::test]
async fn test_lock_timeout_is_conflict() {
    let builder = TestStoreBuilder::new().with_lock_timeout_ms(20);
    let provider = builder.provider("Adam", "Smith", "General").await;
    let patient = builder.patient("John", "Doe", "john.doe@email.com").await;
    builder.rule(provider.id, DayOfWeek::Monday, "09:00", "12:00").await;
    let state = builder.state();
    let service = BookingService::new(Arc::clone(&state.store), Arc::clone(&state.booking_locks));

    let held = state.booking_locks.acquire(provider.id).await.unwrap();
    let result = service
        .book(request(patient.id, provider.id, "2024-06-03 10:00", 30))
        .await;
    drop(held);

    assert_matches!(result, Err(SchedulingError::Conflict(_)));
    assert_eq!(builder.store().booking_count().await, 0);
}

fn mock_clinic_store() -> MockScheduleStore {
    let mut store = MockScheduleStore::new();
    store.expect_get_patient().returning(|id| {
        Ok(Some(Patient {
            id,
            first_name: "John".into(),
            last_name: "Doe".into(),
            date_of_birth: None,
            gender: None,
            phone: None,
            email: "john.doe@email.com".into(),
            insurance: None,
        }))
    });
    store.expect_get_provider().returning(|id| {
        Ok(Some(Provider {
            id,
            first_name: "Adam".into(),
            last_name: "Smith".into(),
            specialty: "General".into(),
            phone: None,
            email: None,
            office_location: None,
        }))
    });
    store.expect_get_active_rules().returning(|provider_id, day| {
        let nine = chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let noon = chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        Ok(vec![AvailabilityRule::new(1, provider_id, day, nine, noon, true).unwrap()])
    });
    store.expect_get_confirmed_bookings().returning(|_, _| Ok(Vec::new()));
    store
}

fn service_over(store: MockScheduleStore) -> BookingService {
    BookingService::new(Arc::new(store), Arc::new(ProviderLocks::new(Duration::from_secs(1))))
}

#[tokio::test]
async fn test_insert_failure_is_store_failure() {
    let mut store = mock_clinic_store();
    store
        .expect_insert_booking()
        .times(1)
        .returning(|_| Err(StoreError::Backend("connection refused".into())));

    let result = service_over(store).book(request(1, 1, "2024-06-03 10:00", 30)).await;
    assert_matches!(result, Err(SchedulingError::StoreFailure(_)));
}

#[tokio::test]
async fn test_store_write_conflict_is_conflict() {
    let mut store = mock_clinic_store();
    store
        .expect_insert_booking()
        .times(1)
        .returning(|_| Err(StoreError::Conflict("exclusion constraint".into())));

    let result = service_over(store).book(request(1, 1, "2024-06-03 10:00", 30)).await;
    assert_matches!(result, Err(SchedulingError::Conflict(_)));
}

#[tokio::test]
async fn test_read_failure_aborts_before_insert() {
    let mut store = MockScheduleStore::new();
    store
        .expect_get_patient()
        .returning(|_| Err(StoreError::Decode("bad row".into())));
    store.expect_insert_booking().never();

    let result = service_over(store).book(request(1, 1, "2024-06-03 10:00", 30)).await;
    assert_matches!(result, Err(SchedulingError::StoreFailure(_)));
}
