// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};

use shared_models::time::{format_display, DEFAULT_BOOKING_MINUTES};
use shared_models::{Booking, Patient, Provider};

fn default_duration() -> u32 {
    DEFAULT_BOOKING_MINUTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: i64,
    pub provider_id: i64,
    /// Wall-clock start, e.g. `2024-06-03 10:00`.
    pub start: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub is_emergency: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub name: String,
    pub contact: Option<String>,
    pub email: String,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            name: patient.full_name(),
            contact: patient.phone.clone(),
            email: patient.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub name: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub location: Option<String>,
}

impl From<&Provider> for ProviderSummary {
    fn from(provider: &Provider) -> Self {
        Self {
            name: provider.full_name(),
            specialty: provider.specialty.clone(),
            phone: provider.phone.clone(),
            location: provider.office_location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub confirmation_id: i64,
    pub patient: PatientSummary,
    pub provider: ProviderSummary,
    pub appointment_time: String,
    pub duration_minutes: u32,
    pub is_emergency: bool,
}

impl BookingConfirmation {
    pub fn new(booking: &Booking, patient: &Patient, provider: &Provider) -> Self {
        Self {
            confirmation_id: booking.id,
            patient: patient.into(),
            provider: provider.into(),
            appointment_time: format_display(booking.start),
            duration_minutes: booking.duration_minutes,
            is_emergency: booking.is_emergency,
        }
    }
}
