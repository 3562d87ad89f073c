use serde::{Deserialize, Serialize};

use shared_models::Patient;

#[derive(Debug, Deserialize)]
pub struct PatientEmailQuery {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(flatten)]
    pub patient: Patient,
    pub full_name: String,
}

impl From<Patient> for PatientProfile {
    fn from(patient: Patient) -> Self {
        Self {
            full_name: patient.full_name(),
            patient,
        }
    }
}
