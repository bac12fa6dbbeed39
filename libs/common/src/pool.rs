//! Redis connection pool for the registration store
//!
//! This module wraps a `bb8` pool of multiplexed Redis connections and
//! implements [`KeyValueStore`] on top of it. The pool bounds the number of
//! connections, reaps idle ones and probes each connection with `PING` when
//! it is checked out.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection, RunError};
use bb8_redis::RedisConnectionManager;
use redis::{AsyncCommands, RedisError, RedisResult, Script};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::store::KeyValueStore;

const COMPARE_AND_SET_LUA: &str = r"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if current == ARGV[2] then
  redis.call('HSET', KEYS[1], ARGV[1], ARGV[3])
  return 1
end
return 0
";

const REMOVE_BY_SCORE_AND_DELETE_LUA: &str = r"
local removed = redis.call('ZREMRANGEBYSCORE', KEYS[1], ARGV[1], ARGV[1])
if removed == 1 then
  redis.call('DEL', KEYS[2])
end
return removed
";

fn compare_and_set_script() -> &'static Script {
    static SCRIPT: OnceLock<Script> = OnceLock::new();
    SCRIPT.get_or_init(|| Script::new(COMPARE_AND_SET_LUA))
}

fn remove_by_score_and_delete_script() -> &'static Script {
    static SCRIPT: OnceLock<Script> = OnceLock::new();
    SCRIPT.get_or_init(|| Script::new(REMOVE_BY_SCORE_AND_DELETE_LUA))
}

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL; the path selects the database (e.g., "redis://localhost:6379/4")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Idle connections older than this are closed by the pool
    pub idle_timeout: Duration,
    /// How long an operation waits for a usable connection
    pub acquire_timeout: Duration,
    /// Probe connections with PING when they are checked out
    pub test_on_borrow: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/4".to_string(),
            max_connections: 10,
            idle_timeout: Duration::from_secs(10),
            acquire_timeout: Duration::from_secs(5),
            test_on_borrow: true,
        }
    }
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379/4")
    /// - `REDIS_MAX_CONNECTIONS`: Maximum number of connections (default: 10)
    /// - `REDIS_IDLE_TIMEOUT_SECS`: Idle connection lifetime (default: 10)
    /// - `REDIS_ACQUIRE_TIMEOUT_SECS`: Wait for a usable connection (default: 5)
    /// - `REDIS_TEST_ON_BORROW`: Probe connections on check-out (default: true)
    pub fn from_env() -> StoreResult<Self> {
        let defaults = Self::default();

        let url = std::env::var("REDIS_URL").unwrap_or(defaults.url);
        if url.trim().is_empty() {
            return Err(StoreError::Configuration("REDIS_URL is empty".to_string()));
        }

        let max_connections = env_or("REDIS_MAX_CONNECTIONS", defaults.max_connections);
        if max_connections == 0 {
            return Err(StoreError::Configuration(
                "REDIS_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(RedisConfig {
            url,
            max_connections,
            idle_timeout: Duration::from_secs(env_or(
                "REDIS_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout.as_secs(),
            )),
            acquire_timeout: Duration::from_secs(env_or(
                "REDIS_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )),
            test_on_borrow: env_or("REDIS_TEST_ON_BORROW", defaults.test_on_borrow),
        })
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool<RedisConnectionManager>,
    acquire_timeout: Duration,
}

impl RedisPool {
    /// Initialize a new Redis connection pool
    ///
    /// Connections are opened lazily on first use.
    pub async fn new(config: &RedisConfig) -> StoreResult<Self> {
        let manager = RedisConnectionManager::new(config.url.clone())
            .map_err(|e| StoreError::Configuration(format!("Invalid Redis URL: {}", e)))?;

        let pool = Pool::builder()
            .max_size(config.max_connections)
            .idle_timeout(Some(config.idle_timeout))
            .connection_timeout(config.acquire_timeout)
            .test_on_check_out(config.test_on_borrow)
            .build_unchecked(manager);

        info!(
            "Redis pool initialized with URL: {} (max {} connections)",
            config.url, config.max_connections
        );

        Ok(RedisPool {
            pool,
            acquire_timeout: config.acquire_timeout,
        })
    }

    /// Get a connection from the pool
    async fn get_connection(&self) -> StoreResult<PooledConnection<'_, RedisConnectionManager>> {
        self.pool.get().await.map_err(|e| match e {
            RunError::User(e) => StoreError::Connection(e),
            RunError::TimedOut => StoreError::PoolExhausted(self.acquire_timeout),
        })
    }

    /// Number of open connections, and how many of them are idle
    pub fn connections(&self) -> (u32, u32) {
        let state = self.pool.state();
        (state.connections, state.idle_connections)
    }
}

fn command_error(e: RedisError) -> StoreError {
    StoreError::Command(e)
}

#[async_trait]
impl KeyValueStore for RedisPool {
    async fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<i64> = conn.incr(key, 1).await;
        result.map_err(command_error)
    }

    async fn sorted_set_add(&self, key: &str, score: i64, member: &str) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<()> = conn.zadd(key, member, score).await;
        result.map_err(command_error)
    }

    async fn sorted_set_range(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> StoreResult<Vec<String>> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<Vec<String>> = conn.zrange(key, start, stop).await;
        result.map_err(command_error)
    }

    async fn sorted_set_remove_by_score(&self, key: &str, min: i64, max: i64) -> StoreResult<u64> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<u64> = conn.zrembyscore(key, min, max).await;
        result.map_err(command_error)
    }

    async fn hash_field_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<()> = conn.hset(key, field, value).await;
        result.map_err(command_error)
    }

    async fn hash_field_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<Option<String>> = conn.hget(key, field).await;
        result.map_err(command_error)
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<HashMap<String, String>> = conn.hgetall(key).await;
        result.map_err(command_error)
    }

    async fn hash_field_delete(&self, key: &str, field: &str) -> StoreResult<u64> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<u64> = conn.hdel(key, field).await;
        result.map_err(command_error)
    }

    async fn hash_field_compare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        value: &str,
    ) -> StoreResult<bool> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<i64> = compare_and_set_script()
            .key(key)
            .arg(field)
            .arg(expected)
            .arg(value)
            .invoke_async(&mut *conn)
            .await;
        Ok(result.map_err(command_error)? == 1)
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<u64> = conn.del(key).await;
        result.map_err(command_error)
    }

    async fn remove_by_score_and_delete(
        &self,
        set_key: &str,
        score: i64,
        key: &str,
    ) -> StoreResult<u64> {
        let mut conn = self.get_connection().await?;
        let result: RedisResult<u64> = remove_by_score_and_delete_script()
            .key(set_key)
            .key(key)
            .arg(score)
            .invoke_async(&mut *conn)
            .await;
        result.map_err(command_error)
    }

    /// Check if Redis is reachable
    async fn health_check(&self) -> StoreResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(command_error)?;
        Ok(pong == "PONG")
    }
}
