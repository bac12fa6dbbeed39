//! Custom error types for the common library
//!
//! Every failure of the store adapter is reported through [`StoreError`].
//! Callers treat all of them as "store unavailable": no partial success is
//! implied and nothing is retried here.

use std::time::Duration;

use redis::RedisError;
use thiserror::Error;

/// Custom error type for key-value store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error occurred while opening a connection
    #[error("Store connection error: {0}")]
    Connection(#[source] RedisError),

    /// Error occurred during command execution
    #[error("Store command error: {0}")]
    Command(#[source] RedisError),

    /// No usable connection within the acquire timeout
    #[error("Store pool exhausted: no connection available after {0:?}")]
    PoolExhausted(Duration),

    /// Configuration error
    #[error("Store configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
