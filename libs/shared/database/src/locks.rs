use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LockError {
    #[error("Timed out after {waited_ms} ms waiting for the booking lock of provider {provider_id}")]
    Timeout { provider_id: i64, waited_ms: u64 },
}

/// One exclusive booking lock per provider.
///
/// Holding a [`ProviderGuard`] serialises every check-then-insert for that
/// provider inside this process. Locks for different providers never contend.
///
/// Entries nobody holds or waits on are dropped on the next acquire, so the
/// map only tracks providers with a booking in flight.
pub struct ProviderLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

impl ProviderLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // Every clone happens under the map lock, so a count of 1 means idle.
    fn lock_for(&self, provider_id: i64) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(provider_id).or_default())
    }

    /// Number of providers with a lock entry.
    pub fn tracked_providers(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Waits up to the configured timeout for the provider's lock.
    pub async fn acquire(&self, provider_id: i64) -> Result<ProviderGuard, LockError> {
        let lock = self.lock_for(provider_id);

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => {
                debug!("Acquired booking lock for provider {}", provider_id);
                Ok(ProviderGuard {
                    provider_id,
                    _guard: guard,
                })
            }
            Err(_) => Err(LockError::Timeout {
                provider_id,
                waited_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

/// Releases the provider's lock when dropped.
#[derive(Debug)]
pub struct ProviderGuard {
    provider_id: i64,
    _guard: OwnedMutexGuard<()>,
}

impl ProviderGuard {
    pub fn provider_id(&self) -> i64 {
        self.provider_id
    }
}

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        debug!("Released booking lock for provider {}", self.provider_id);
    }
}
