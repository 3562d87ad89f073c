use std::env;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BOOKING_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Which persistence backend the schedule store runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Supabase,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(StoreBackend::Memory),
            "supabase" | "postgrest" => Ok(StoreBackend::Supabase),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub seed_sample_data: bool,
    pub booking_lock_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_backend: StoreBackend::Memory,
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            seed_sample_data: true,
            booking_lock_timeout_ms: DEFAULT_BOOKING_LOCK_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| {
                warn!("HOST not set, using default {}", DEFAULT_HOST);
                defaults.host.clone()
            }),
            port: parse_or("PORT", defaults.port),
            store_backend: parse_or("STORE_BACKEND", defaults.store_backend),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| String::new()),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| String::new()),
            seed_sample_data: parse_or("SEED_SAMPLE_DATA", defaults.seed_sample_data),
            booking_lock_timeout_ms: parse_or(
                "BOOKING_LOCK_TIMEOUT_MS",
                defaults.booking_lock_timeout_ms,
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - SUPABASE_URL / SUPABASE_ANON_PUBLIC_KEY missing for supabase backend");
        }

        config
    }

    /// True when the selected backend has everything it needs to start.
    pub fn is_configured(&self) -> bool {
        match self.store_backend {
            StoreBackend::Memory => true,
            StoreBackend::Supabase => {
                !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("{} has invalid value '{}', using default {:?}", key, raw, default);
                default
            }
        },
        Err(_) => {
            warn!("{} not set, using default {:?}", key, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_is_always_configured() {
        let config = AppConfig::default();
        assert!(config.is_configured());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn supabase_backend_needs_url_and_key() {
        let mut config = AppConfig {
            store_backend: StoreBackend::Supabase,
            ..AppConfig::default()
        };
        assert!(!config.is_configured());

        config.supabase_url = "http://localhost:54321".into();
        config.supabase_anon_key = "anon".into();
        assert!(config.is_configured());
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!("Supabase".parse::<StoreBackend>(), Ok(StoreBackend::Supabase));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
