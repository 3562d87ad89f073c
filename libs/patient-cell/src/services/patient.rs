use std::sync::Arc;

use tracing::debug;

use shared_database::ScheduleStore;
use shared_models::{Patient, SchedulingError};

pub struct PatientService {
    store: Arc<dyn ScheduleStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, SchedulingError> {
        debug!("Fetching patient {}", patient_id);

        self.store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("Patient", patient_id))
    }

    /// Emails are matched case-insensitively after trimming.
    pub async fn get_patient_by_email(&self, email: &str) -> Result<Patient, SchedulingError> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(SchedulingError::InvalidFormat(format!(
                "'{}' is not an email address",
                email
            )));
        }

        debug!("Looking up patient by email {}", email);
        self.store
            .get_patient_by_email(&email)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("Patient with email {}", email)))
    }
}
