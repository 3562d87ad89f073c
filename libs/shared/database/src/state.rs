use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use shared_config::{AppConfig, StoreBackend};

use crate::locks::ProviderLocks;
use crate::memory::InMemoryStore;
use crate::seed::seed_sample_data;
use crate::store::{ScheduleStore, StoreError};
use crate::supabase::SupabaseStore;

/// Shared handles every cell router receives.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ScheduleStore>,
    pub booking_locks: Arc<ProviderLocks>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ScheduleStore>) -> Self {
        let booking_locks = Arc::new(ProviderLocks::new(Duration::from_millis(
            config.booking_lock_timeout_ms,
        )));

        Self {
            config,
            store,
            booking_locks,
        }
    }

    /// Builds the configured store backend, seeding the in-memory store when
    /// sample data is enabled.
    pub async fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn ScheduleStore> = match config.store_backend {
            StoreBackend::Memory => {
                let store = Arc::new(InMemoryStore::new());
                if config.seed_sample_data {
                    seed_sample_data(store.as_ref()).await?;
                }
                store as Arc<dyn ScheduleStore>
            }
            StoreBackend::Supabase => {
                if !config.is_configured() {
                    return Err(StoreError::Backend(
                        "supabase backend selected but SUPABASE_URL / SUPABASE_ANON_PUBLIC_KEY are not set".into(),
                    ));
                }
                Arc::new(SupabaseStore::new(&config))
            }
        };

        info!("Schedule store ready ({:?} backend)", config.store_backend);
        Ok(Self::new(config, store))
    }
}
