use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use shared_database::ScheduleStore;
use shared_models::{Provider, SchedulingError};

/// Read-only provider directory.
pub struct ProviderService {
    store: Arc<dyn ScheduleStore>,
}

impl ProviderService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn get_provider(&self, provider_id: i64) -> Result<Provider, SchedulingError> {
        self.store
            .get_provider(provider_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("Provider", provider_id))
    }

    pub async fn list_providers(&self, specialty: Option<&str>) -> Result<Vec<Provider>, SchedulingError> {
        let providers = match specialty {
            Some(specialty) => self.store.get_providers_by_specialty(specialty).await?,
            None => self.store.list_providers().await?,
        };
        debug!("Listed {} providers", providers.len());
        Ok(providers)
    }

    /// Distinct specialties in alphabetical order.
    pub async fn specialties(&self) -> Result<Vec<String>, SchedulingError> {
        let specialties: BTreeSet<String> = self
            .store
            .list_providers()
            .await?
            .into_iter()
            .map(|provider| provider.specialty)
            .collect();
        Ok(specialties.into_iter().collect())
    }

    /// Case-insensitive partial match on first or last name.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Provider>, SchedulingError> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Err(SchedulingError::InvalidFormat("name must not be empty".into()));
        }

        let matches = self
            .store
            .list_providers()
            .await?
            .into_iter()
            .filter(|provider| {
                provider.first_name.to_lowercase().contains(&needle)
                    || provider.last_name.to_lowercase().contains(&needle)
            })
            .collect();
        Ok(matches)
    }

    pub async fn get_by_name(&self, first_name: &str, last_name: &str) -> Result<Provider, SchedulingError> {
        self.store
            .list_providers()
            .await?
            .into_iter()
            .find(|provider| {
                provider.first_name.eq_ignore_ascii_case(first_name.trim())
                    && provider.last_name.eq_ignore_ascii_case(last_name.trim())
            })
            .ok_or_else(|| {
                SchedulingError::NotFound(format!("Provider {} {}", first_name.trim(), last_name.trim()))
            })
    }
}
