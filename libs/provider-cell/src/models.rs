use serde::{Deserialize, Serialize};

use shared_models::{Provider, Slot};

// ==============================================================================
// QUERY PARAMETERS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ProviderListQuery {
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyQuery {
    pub specialty: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct NameSearchQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ExactNameQuery {
    pub first_name: String,
    pub last_name: String,
}

// ==============================================================================
// RESPONSES
// ==============================================================================

/// Open slots of one provider on one date, rendered as `YYYY-MM-DD HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub provider_id: i64,
    pub date: String,
    pub available_slots: Vec<String>,
    pub total_slots: usize,
}

/// Result of the emergency search before it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct EmergencySlot {
    pub provider: Provider,
    pub slot: Slot,
    pub providers_checked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencySlotResponse {
    pub provider: Provider,
    pub provider_name: String,
    pub slot_start: String,
    pub slot_end: String,
    pub providers_checked: usize,
}

impl From<EmergencySlot> for EmergencySlotResponse {
    fn from(found: EmergencySlot) -> Self {
        Self {
            provider_name: found.provider.full_name(),
            slot_start: found.slot.display_start(),
            slot_end: shared_models::time::format_display(found.slot.end),
            provider: found.provider,
            providers_checked: found.providers_checked,
        }
    }
}
