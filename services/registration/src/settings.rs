//! Service settings loaded from `REGISTRATION_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Which store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Pooled Redis, configured through `REDIS_*` variables
    Redis,
    /// Process memory; data is lost on restart
    Memory,
}

/// Registration service settings
///
/// # Environment Variables
/// - `REGISTRATION_BIND_ADDRESS`: listen address (default: "0.0.0.0:9487")
/// - `REGISTRATION_STORE_BACKEND`: `redis` or `memory` (default: "redis")
/// - `REGISTRATION_CHECK_IN_MAX_ATTEMPTS`: compare-and-set attempts per check-in (default: 3)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: String,
    pub store_backend: StoreBackend,
    pub check_in_max_attempts: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:9487")?
            .set_default("store_backend", "redis")?
            .set_default("check_in_max_attempts", 3)?
            .add_source(Environment::with_prefix("REGISTRATION").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
