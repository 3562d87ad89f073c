pub mod locks;
pub mod memory;
pub mod seed;
pub mod state;
pub mod store;
pub mod supabase;

pub use locks::{LockError, ProviderGuard, ProviderLocks};
pub use memory::InMemoryStore;
pub use state::AppState;
pub use store::{ScheduleStore, StoreError, StoreResult};
pub use supabase::{SupabaseClient, SupabaseStore};

#[cfg(any(test, feature = "mock"))]
pub use store::MockScheduleStore;
