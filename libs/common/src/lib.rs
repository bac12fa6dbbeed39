//! Common library for the registration service
//!
//! This crate provides the store adapter used by the registration service:
//! the [`store::KeyValueStore`] port, a pooled Redis implementation and an
//! in-process implementation for tests and local development.

pub mod error;
pub mod memory;
pub mod pool;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use pool::{RedisConfig, RedisPool};
pub use store::KeyValueStore;

/// Example usage of the store adapter
///
/// ```rust,no_run
/// use common::{KeyValueStore, RedisConfig, RedisPool};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = RedisConfig::from_env()?;
///     let pool = RedisPool::new(&config).await?;
///     let is_healthy = pool.health_check().await?;
///     println!("Store health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
