//! In-process key-value store
//!
//! Mirrors the Redis semantics the registration service relies on: missing
//! keys read as empty, sorted-set members are ordered by score and then
//! lexicographically, and range indices may be negative. Every operation
//! holds a single lock, so each one is atomic with respect to the others.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreResult;
use crate::store::KeyValueStore;

#[derive(Debug, Default)]
struct MemoryState {
    counters: HashMap<String, i64>,
    /// Kept sorted by (score, member)
    sorted_sets: HashMap<String, Vec<(i64, String)>>,
    hashes: HashMap<String, HashMap<String, String>>,
}

impl MemoryState {
    fn delete(&mut self, key: &str) -> u64 {
        let removed = self.counters.remove(key).is_some() as u64
            + self.sorted_sets.remove(key).is_some() as u64
            + self.hashes.remove(key).is_some() as u64;
        removed.min(1)
    }

    fn remove_by_score(&mut self, key: &str, min: i64, max: i64) -> u64 {
        let Some(set) = self.sorted_sets.get_mut(key) else {
            return 0;
        };
        let before = set.len();
        set.retain(|(score, _)| *score < min || *score > max);
        let removed = (before - set.len()) as u64;
        if set.is_empty() {
            self.sorted_sets.remove(key);
        }
        removed
    }
}

/// Resolve Redis-style inclusive `start..=stop` indices against `len`
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Key-value store kept in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut state = self.state.lock().await;
        let counter = state.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn sorted_set_add(&self, key: &str, score: i64, member: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let set = state.sorted_sets.entry(key.to_string()).or_default();
        set.retain(|(_, existing)| existing != member);
        let entry = (score, member.to_string());
        let position = set.partition_point(|existing| *existing < entry);
        set.insert(position, entry);
        Ok(())
    }

    async fn sorted_set_range(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> StoreResult<Vec<String>> {
        let state = self.state.lock().await;
        let Some(set) = state.sorted_sets.get(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = resolve_range(set.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(set[start..=stop]
            .iter()
            .map(|(_, member)| member.clone())
            .collect())
    }

    async fn sorted_set_remove_by_score(&self, key: &str, min: i64, max: i64) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.remove_by_score(key, min, max))
    }

    async fn hash_field_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_field_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let state = self.state.lock().await;
        Ok(state
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field))
            .cloned())
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let state = self.state.lock().await;
        Ok(state.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hash_field_delete(&self, key: &str, field: &str) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        let Some(hash) = state.hashes.get_mut(key) else {
            return Ok(0);
        };
        let removed = hash.remove(field).is_some() as u64;
        if hash.is_empty() {
            state.hashes.remove(key);
        }
        Ok(removed)
    }

    async fn hash_field_compare_and_set(
        &self,
        key: &str,
        field: &str,
        expected: &str,
        value: &str,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state.hashes.get_mut(key).and_then(|hash| hash.get_mut(field)) {
            Some(current) if current == expected => {
                *current = value.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.delete(key))
    }

    async fn remove_by_score_and_delete(
        &self,
        set_key: &str,
        score: i64,
        key: &str,
    ) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        let removed = state.remove_by_score(set_key, score, score);
        if removed == 1 {
            state.delete(key);
        }
        Ok(removed)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_starts_at_one() {
        let store = MemoryStore::new();
        assert_eq!(store.increment("counter").await.unwrap(), 1);
        assert_eq!(store.increment("counter").await.unwrap(), 2);
        assert_eq!(store.increment("other").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sorted_set_orders_by_score_then_member() {
        let store = MemoryStore::new();
        store.sorted_set_add("set", 3, "c").await.unwrap();
        store.sorted_set_add("set", 1, "z").await.unwrap();
        store.sorted_set_add("set", 1, "a").await.unwrap();
        store.sorted_set_add("set", 2, "b").await.unwrap();

        let all = store.sorted_set_range("set", 0, -1).await.unwrap();
        assert_eq!(all, vec!["a", "z", "b", "c"]);

        let tail = store.sorted_set_range("set", -2, -1).await.unwrap();
        assert_eq!(tail, vec!["b", "c"]);

        let past_end = store.sorted_set_range("set", 2, 100).await.unwrap();
        assert_eq!(past_end, vec!["b", "c"]);

        assert!(store.sorted_set_range("set", 5, 10).await.unwrap().is_empty());
        assert!(store.sorted_set_range("missing", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sorted_set_add_moves_existing_member() {
        let store = MemoryStore::new();
        store.sorted_set_add("set", 1, "a").await.unwrap();
        store.sorted_set_add("set", 2, "b").await.unwrap();
        store.sorted_set_add("set", 3, "a").await.unwrap();

        let all = store.sorted_set_range("set", 0, -1).await.unwrap();
        assert_eq!(all, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_remove_by_score_counts_removed_members() {
        let store = MemoryStore::new();
        store.sorted_set_add("set", 1, "a").await.unwrap();
        store.sorted_set_add("set", 2, "b").await.unwrap();

        assert_eq!(store.sorted_set_remove_by_score("set", 2, 2).await.unwrap(), 1);
        assert_eq!(store.sorted_set_remove_by_score("set", 2, 2).await.unwrap(), 0);
        assert_eq!(store.sorted_set_range("set", 0, -1).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_hash_operations() {
        let store = MemoryStore::new();
        store.hash_field_set("hash", "1", "one").await.unwrap();
        store.hash_field_set("hash", "2", "two").await.unwrap();
        store.hash_field_set("hash", "1", "uno").await.unwrap();

        assert_eq!(
            store.hash_field_get("hash", "1").await.unwrap(),
            Some("uno".to_string())
        );
        assert_eq!(store.hash_field_get("hash", "3").await.unwrap(), None);
        assert_eq!(store.hash_get_all("hash").await.unwrap().len(), 2);

        assert_eq!(store.hash_field_delete("hash", "2").await.unwrap(), 1);
        assert_eq!(store.hash_field_delete("hash", "2").await.unwrap(), 0);
        assert!(store.hash_get_all("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_compare_and_set_only_writes_on_match() {
        let store = MemoryStore::new();
        store.hash_field_set("hash", "1", "old").await.unwrap();

        assert!(!store
            .hash_field_compare_and_set("hash", "1", "stale", "new")
            .await
            .unwrap());
        assert!(!store
            .hash_field_compare_and_set("hash", "2", "old", "new")
            .await
            .unwrap());
        assert!(store
            .hash_field_compare_and_set("hash", "1", "old", "new")
            .await
            .unwrap());

        assert_eq!(
            store.hash_field_get("hash", "1").await.unwrap(),
            Some("new".to_string())
        );
        assert_eq!(store.hash_field_get("hash", "2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_by_score_and_delete_only_cascades_on_single_match() {
        let store = MemoryStore::new();
        store.sorted_set_add("set", 1, "a").await.unwrap();
        store.hash_field_set("child:1", "x", "y").await.unwrap();
        store.hash_field_set("child:2", "x", "y").await.unwrap();

        assert_eq!(
            store
                .remove_by_score_and_delete("set", 2, "child:2")
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.hash_get_all("child:2").await.unwrap().len(), 1);

        assert_eq!(
            store
                .remove_by_score_and_delete("set", 1, "child:1")
                .await
                .unwrap(),
            1
        );
        assert!(store.hash_get_all("child:1").await.unwrap().is_empty());
        assert!(store.sorted_set_range("set", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_any_key_type() {
        let store = MemoryStore::new();
        store.increment("counter").await.unwrap();
        store.hash_field_set("hash", "f", "v").await.unwrap();

        assert_eq!(store.delete("counter").await.unwrap(), 1);
        assert_eq!(store.delete("hash").await.unwrap(), 1);
        assert_eq!(store.delete("hash").await.unwrap(), 0);
        assert_eq!(store.increment("counter").await.unwrap(), 1);
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(4, 0, -1), Some((0, 3)));
        assert_eq!(resolve_range(4, -10, 1), Some((0, 1)));
        assert_eq!(resolve_range(4, 3, 1), None);
        assert_eq!(resolve_range(0, 0, -1), None);
    }
}
