//! Integration tests for the Redis store adapter
//!
//! These tests need a reachable Redis (`REDIS_URL`, default database 4) and
//! are ignored by default. Run them with `cargo test -- --ignored`.

use common::{KeyValueStore, RedisConfig, RedisPool};

async fn pool() -> Result<RedisPool, Box<dyn std::error::Error>> {
    let config = RedisConfig::from_env()?;
    Ok(RedisPool::new(&config).await?)
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_health_and_counter() -> Result<(), Box<dyn std::error::Error>> {
    let pool = pool().await?;
    assert!(pool.health_check().await?, "Redis health check failed");

    let key = "integration_test_counter";
    pool.delete(key).await?;
    assert_eq!(pool.increment(key).await?, 1);
    assert_eq!(pool.increment(key).await?, 2);
    pool.delete(key).await?;

    // the connection went back to the pool
    let (open, idle) = pool.connections();
    assert!(open >= 1);
    assert_eq!(open, idle);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_sorted_set_and_cascade() -> Result<(), Box<dyn std::error::Error>> {
    let pool = pool().await?;
    let set_key = "integration_test_classes";
    let child_key = "integration_test_roster:2";
    pool.delete(set_key).await?;
    pool.delete(child_key).await?;

    pool.sorted_set_add(set_key, 2, "second").await?;
    pool.sorted_set_add(set_key, 1, "first").await?;
    assert_eq!(
        pool.sorted_set_range(set_key, 0, -1).await?,
        vec!["first".to_string(), "second".to_string()]
    );

    pool.hash_field_set(child_key, "7", "seven").await?;
    assert_eq!(pool.remove_by_score_and_delete(set_key, 3, child_key).await?, 0);
    assert_eq!(pool.hash_get_all(child_key).await?.len(), 1);

    assert_eq!(pool.remove_by_score_and_delete(set_key, 2, child_key).await?, 1);
    assert!(pool.hash_get_all(child_key).await?.is_empty());
    assert_eq!(pool.sorted_set_range(set_key, 0, -1).await?, vec!["first".to_string()]);

    pool.delete(set_key).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_hash_compare_and_set() -> Result<(), Box<dyn std::error::Error>> {
    let pool = pool().await?;
    let key = "integration_test_hash";
    pool.delete(key).await?;

    pool.hash_field_set(key, "1", "old").await?;
    assert!(!pool.hash_field_compare_and_set(key, "1", "stale", "new").await?);
    assert!(!pool.hash_field_compare_and_set(key, "2", "old", "new").await?);
    assert!(pool.hash_field_compare_and_set(key, "1", "old", "new").await?);
    assert_eq!(pool.hash_field_get(key, "1").await?, Some("new".to_string()));

    assert_eq!(pool.hash_field_delete(key, "1").await?, 1);
    assert_eq!(pool.hash_field_get(key, "1").await?, None);
    Ok(())
}
