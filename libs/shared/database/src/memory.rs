use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::{
    AvailabilityRule, Booking, DayOfWeek, NewAvailabilityRule, NewBooking, NewPatient,
    NewProvider, Patient, Provider,
};

use crate::store::{ScheduleStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    providers: BTreeMap<i64, Provider>,
    rules: BTreeMap<i64, AvailabilityRule>,
    patients: BTreeMap<i64, Patient>,
    bookings: BTreeMap<i64, Booking>,
    next_provider_id: i64,
    next_rule_id: i64,
    next_patient_id: i64,
    next_booking_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local store. Referential integrity and patient email uniqueness
/// are enforced on insert; every operation holds the table guard only for
/// its own duration.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn booking_count(&self) -> usize {
        self.tables.read().await.bookings.len()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn get_provider(&self, provider_id: i64) -> StoreResult<Option<Provider>> {
        Ok(self.tables.read().await.providers.get(&provider_id).cloned())
    }

    async fn list_providers(&self) -> StoreResult<Vec<Provider>> {
        Ok(self.tables.read().await.providers.values().cloned().collect())
    }

    async fn get_providers_by_specialty(&self, specialty: &str) -> StoreResult<Vec<Provider>> {
        let tables = self.tables.read().await;
        Ok(tables
            .providers
            .values()
            .filter(|provider| provider.specialty == specialty)
            .cloned()
            .collect())
    }

    async fn get_patient(&self, patient_id: i64) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(&patient_id).cloned())
    }

    async fn get_patient_by_email(&self, email: &str) -> StoreResult<Option<Patient>> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .values()
            .find(|patient| patient.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_active_rules(
        &self,
        provider_id: i64,
        day: DayOfWeek,
    ) -> StoreResult<Vec<AvailabilityRule>> {
        let tables = self.tables.read().await;
        let mut rules: Vec<AvailabilityRule> = tables
            .rules
            .values()
            .filter(|rule| {
                rule.provider_id() == provider_id && rule.day_of_week() == day && rule.is_active()
            })
            .cloned()
            .collect();
        rules.sort_by_key(|rule| rule.start_time());
        Ok(rules)
    }

    async fn get_confirmed_bookings(
        &self,
        provider_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|booking| {
                booking.provider_id == provider_id
                    && booking.is_confirmed()
                    && booking.start.date() == date
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| booking.start);
        Ok(bookings)
    }

    async fn get_booking(&self, booking_id: i64) -> StoreResult<Option<Booking>> {
        Ok(self.tables.read().await.bookings.get(&booking_id).cloned())
    }

    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;

        if !tables.patients.contains_key(&booking.patient_id) {
            return Err(StoreError::Integrity(format!(
                "booking references unknown patient {}",
                booking.patient_id
            )));
        }
        if !tables.providers.contains_key(&booking.provider_id) {
            return Err(StoreError::Integrity(format!(
                "booking references unknown provider {}",
                booking.provider_id
            )));
        }

        let id = next_id(&mut tables.next_booking_id);
        let booking = booking.into_booking(id);
        tables.bookings.insert(id, booking.clone());
        debug!("Stored booking {} for provider {}", id, booking.provider_id);

        Ok(booking)
    }

    async fn insert_provider(&self, provider: NewProvider) -> StoreResult<Provider> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_provider_id);
        let provider = Provider {
            id,
            first_name: provider.first_name,
            last_name: provider.last_name,
            specialty: provider.specialty,
            phone: provider.phone,
            email: provider.email,
            office_location: provider.office_location,
        };
        tables.providers.insert(id, provider.clone());
        Ok(provider)
    }

    async fn insert_rule(&self, rule: NewAvailabilityRule) -> StoreResult<AvailabilityRule> {
        let mut tables = self.tables.write().await;

        if !tables.providers.contains_key(&rule.provider_id) {
            return Err(StoreError::Integrity(format!(
                "availability rule references unknown provider {}",
                rule.provider_id
            )));
        }

        let id = next_id(&mut tables.next_rule_id);
        let rule = rule
            .into_rule(id)
            .map_err(|e| StoreError::Integrity(e.to_string()))?;
        tables.rules.insert(id, rule.clone());
        Ok(rule)
    }

    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;

        if tables.patients.values().any(|existing| existing.email.eq_ignore_ascii_case(&patient.email)) {
            return Err(StoreError::Conflict(format!(
                "patient with email {} already exists",
                patient.email
            )));
        }

        let id = next_id(&mut tables.next_patient_id);
        let patient = Patient {
            id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            date_of_birth: patient.date_of_birth,
            gender: patient.gender,
            phone: patient.phone,
            email: patient.email,
            insurance: patient.insurance,
        };
        tables.patients.insert(id, patient.clone());
        Ok(patient)
    }
}
