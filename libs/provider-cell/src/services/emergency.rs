use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use shared_database::ScheduleStore;
use shared_models::time::parse_date;
use shared_models::{Provider, SchedulingError, Slot};

use crate::models::EmergencySlot;
use crate::services::availability::AvailabilityService;

pub struct EmergencyService {
    store: Arc<dyn ScheduleStore>,
}

impl EmergencyService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Earliest open slot on `date` across every provider of `specialty`.
    ///
    /// Providers are considered in id order and the first one wins a tie.
    /// Providers with no open slot are skipped; a store failure for any of
    /// them fails the whole search.
    pub async fn earliest_for_specialty(
        &self,
        specialty: &str,
        date: &str,
    ) -> Result<EmergencySlot, SchedulingError> {
        let date = parse_date(date)?;
        let providers = self.store.get_providers_by_specialty(specialty).await?;
        debug!("Checking {} {} providers on {}", providers.len(), specialty, date);

        let availability = AvailabilityService::new(Arc::clone(&self.store));
        let generated = join_all(
            providers
                .iter()
                .map(|provider| availability.slots_for_known_provider(provider.id, date)),
        )
        .await;

        let mut best: Option<(&Provider, Slot)> = None;
        for (provider, slots) in providers.iter().zip(generated) {
            let Some(first) = slots?.into_iter().next() else {
                continue;
            };

            match &best {
                Some((_, current)) if current.start <= first.start => {}
                _ => best = Some((provider, first)),
            }
        }

        match best {
            Some((provider, slot)) => {
                info!(
                    "Emergency slot for {}: provider {} at {}",
                    specialty,
                    provider.id,
                    slot.display_start()
                );
                Ok(EmergencySlot {
                    provider: provider.clone(),
                    slot,
                    providers_checked: providers.len(),
                })
            }
            None => Err(SchedulingError::NoAvailableSlot {
                specialty: specialty.to_string(),
                date,
                providers_checked: providers.len(),
            }),
        }
    }
}
