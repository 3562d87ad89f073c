pub mod availability;
pub mod emergency;
pub mod provider;

pub use availability::AvailabilityService;
pub use emergency::EmergencyService;
pub use provider::ProviderService;
