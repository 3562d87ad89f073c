// libs/appointment-cell/tests/concurrency_test.rs
//
// Overlapping bookings racing for the same provider.

use std::sync::Arc;

use futures::future::join_all;

use appointment_cell::models::BookAppointmentRequest;
use appointment_cell::services::BookingService;
use shared_database::ScheduleStore;
use shared_models::{DayOfWeek, SchedulingError};
use shared_utils::test_utils::{date, TestStoreBuilder, MONDAY};

fn request(patient_id: i64, provider_id: i64, start: &str, duration_minutes: u32) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id,
        provider_id,
        start: start.to_string(),
        duration_minutes,
        is_emergency: false,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_requests_for_one_slot_commit_once() {
    let builder = TestStoreBuilder::new();
    let provider = builder.provider("Adam", "Smith", "General").await;
    builder.rule(provider.id, DayOfWeek::Monday, "09:00", "12:00").await;
    let mut patient_ids = Vec::new();
    for n in 0..8 {
        let patient = builder
            .patient("Patient", &n.to_string(), &format!("patient{}@email.com", n))
            .await;
        patient_ids.push(patient.id);
    }
    let state = builder.state();
    let provider_id = provider.id;

    let handles = patient_ids.into_iter().map(|patient_id| {
        let service = BookingService::new(Arc::clone(&state.store), Arc::clone(&state.booking_locks));
        tokio::spawn(async move {
            service
                .book(request(patient_id, provider_id, "2024-06-03 10:00", 30))
                .await
        })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(SchedulingError::Conflict(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(builder.store().booking_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_committed_bookings_never_overlap() {
    let builder = TestStoreBuilder::new();
    let provider = builder.provider("Adam", "Smith", "General").await;
    let patient = builder.patient("John", "Doe", "john.doe@email.com").await;
    builder.rule(provider.id, DayOfWeek::Monday, "09:00", "12:00").await;
    let state = builder.state();

    // staggered starts and durations so many requests collide partially
    let attempts: Vec<(String, u32)> = (0..24)
        .map(|i| {
            let minute = 9 * 60 + (i * 7) % 170;
            (
                format!("2024-06-03 {:02}:{:02}", minute / 60, minute % 60),
                [15, 30, 45, 60][i as usize % 4],
            )
        })
        .collect();

    let handles = attempts.into_iter().map(|(start, duration)| {
        let service = BookingService::new(Arc::clone(&state.store), Arc::clone(&state.booking_locks));
        let patient_id = patient.id;
        let provider_id = provider.id;
        tokio::spawn(async move {
            service
                .book(request(patient_id, provider_id, &start, duration))
                .await
        })
    });
    let results: Vec<_> = join_all(handles).await.into_iter().map(|j| j.unwrap()).collect();
    assert!(results.iter().any(|result| result.is_ok()));
    assert!(results
        .iter()
        .all(|result| matches!(result, Ok(_) | Err(SchedulingError::Conflict(_)))));

    let bookings = state
        .store
        .get_confirmed_bookings(provider.id, date(MONDAY))
        .await
        .unwrap();
    assert_eq!(bookings.len(), results.iter().filter(|r| r.is_ok()).count());

    for (i, a) in bookings.iter().enumerate() {
        for b in &bookings[i + 1..] {
            assert!(!a.overlaps(b.start, b.end()), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_providers_book_in_parallel() {
    let builder = TestStoreBuilder::new();
    let patient = builder.patient("John", "Doe", "john.doe@email.com").await;
    let mut provider_ids = Vec::new();
    for name in ["Harrison", "Chen", "Wilson"] {
        let provider = builder.provider("Dr", name, "General").await;
        builder.rule(provider.id, DayOfWeek::Monday, "09:00", "12:00").await;
        provider_ids.push(provider.id);
    }
    let state = builder.state();

    let handles = provider_ids.into_iter().map(|provider_id| {
        let service = BookingService::new(Arc::clone(&state.store), Arc::clone(&state.booking_locks));
        let patient_id = patient.id;
        tokio::spawn(async move {
            service
                .book(request(patient_id, provider_id, "2024-06-03 09:00", 30))
                .await
        })
    });

    for joined in join_all(handles).await {
        assert!(joined.unwrap().is_ok());
    }
    assert_eq!(builder.store().booking_count().await, 3);
}
