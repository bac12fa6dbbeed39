//! Key-value store port
//!
//! The registration service only talks to the store through [`KeyValueStore`].
//! Each method is a single atomic operation on the backing store.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Atomic primitives over counters, sorted sets and hashes
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Increment a counter by one and return the new value
    async fn increment(&self, key: &str) -> StoreResult<i64>;

    /// Insert `member` with `score`, or move it to `score` if already present
    async fn sorted_set_add(&self, key: &str, score: i64, member: &str) -> StoreResult<()>;

    /// Members by ascending score; `(0, -1)` reads the whole set
    async fn sorted_set_range(&self, key: &str, start: isize, stop: isize)
    -> StoreResult<Vec<String>>;

    /// Remove every member with `min <= score <= max`, returning how many were removed
    async fn sorted_set_remove_by_score(&self, key: &str, min: i64, max: i64) -> StoreResult<u64>;

    async fn hash_field_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    async fn hash_field_get(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// All fields of a hash; a missing key reads as an empty map
    async fn hash_get_all(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    async fn hash_field_delete(&self, key: &str, field: &str) -> StoreResult<u64>;

    /// Write `value` only if the field currently holds exactly `expected`.
    ///
    /// Returns `false` without writing when the field is missing or differs.
    async fn hash_field_compare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        value: &str,
    ) -> StoreResult<bool>;

    /// Remove a whole key of any type, returning the number of keys removed
    async fn delete(&self, key: &str) -> StoreResult<u64>;

    /// Remove the members of `set_key` scored exactly `score` and, only when
    /// exactly one was removed, delete `key` in the same atomic step.
    ///
    /// Returns the number of set members removed.
    async fn remove_by_score_and_delete(
        &self,
        set_key: &str,
        score: i64,
        key: &str,
    ) -> StoreResult<u64>;

    /// Round-trip liveness probe
    async fn health_check(&self) -> StoreResult<bool>;
}
