//! End-to-end store behavior over the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use ephemeral_store::{
    EphemeralError, EphemeralInput, EphemeralKey, EphemeralLocation, EphemeralStore, Expiration,
    KvEphemeralStore, MemoryBackendClient, MemoryStoreFactory, StoreRegistry, TimeUnit,
};

fn memory_store() -> KvEphemeralStore {
    KvEphemeralStore::new(Arc::new(MemoryBackendClient::new()))
}

fn account_location() -> EphemeralLocation {
    EphemeralLocation::new(["account", "47e456be-b00a-465e-a1db-4b53e64fa"])
}

#[tokio::test]
async fn write_read_delete_round_trip() {
    let store = memory_store();
    let location = account_location();
    let key = EphemeralKey::dynamic("authTokens", "366778080");

    let input = EphemeralInput::new(key.clone(), "8.7.0_GA_1659");
    store.set(&input, &location).await.unwrap();

    let result = store.get(&key, &location).await.unwrap();
    assert_eq!(result.value(), Some("8.7.0_GA_1659"));

    store.delete(&key, &location).await.unwrap();
    assert!(store.get(&key, &location).await.unwrap().is_empty());
}

#[tokio::test]
async fn values_are_scoped_by_location() {
    let store = memory_store();
    let key = EphemeralKey::new("somekey");
    let account = account_location();
    let cos = EphemeralLocation::new(["cos", "47e456be-b00a-465e-a1db-4b53e64fa"]);

    store
        .set(&EphemeralInput::new(key.clone(), "for-account"), &account)
        .await
        .unwrap();
    store
        .set(&EphemeralInput::new(key.clone(), "for-cos"), &cos)
        .await
        .unwrap();

    assert_eq!(
        store.get(&key, &account).await.unwrap().value(),
        Some("for-account")
    );
    assert_eq!(store.get(&key, &cos).await.unwrap().value(), Some("for-cos"));
}

#[tokio::test]
async fn expired_value_reads_back_empty() {
    let store = memory_store();
    let location = account_location();
    let key = EphemeralKey::dynamic("csrfTokenData", "3822663c52f27487f172055ddc0918aa");

    let input = EphemeralInput::new(key.clone(), "token-bytes")
        .with_expiration(Expiration::new(0, TimeUnit::Seconds));
    store.set(&input, &location).await.unwrap();

    assert!(store.get(&key, &location).await.unwrap().is_empty());
}

#[tokio::test]
async fn unexpired_value_remains_readable() {
    let store = memory_store();
    let location = account_location();
    let key = EphemeralKey::new("lastLogonTimestamp");

    let input = EphemeralInput::new(key.clone(), "20160912212057.178Z")
        .with_expiration(Expiration::new(1, TimeUnit::Hours));
    store.set(&input, &location).await.unwrap();

    assert_eq!(
        store.get(&key, &location).await.unwrap().value(),
        Some("20160912212057.178Z")
    );
}

#[tokio::test]
async fn deleting_an_absent_key_twice_matches_deleting_once() {
    let store = memory_store();
    let location = account_location();
    let key = EphemeralKey::new("somekey");

    store.delete(&key, &location).await.unwrap();
    store.delete(&key, &location).await.unwrap();
    assert!(store.get(&key, &location).await.unwrap().is_empty());
}

#[tokio::test]
async fn parallel_writers_with_distinct_keys_do_not_interfere() {
    let store = Arc::new(memory_store());
    let location = account_location();

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = Arc::clone(&store);
        let location = location.clone();
        handles.push(tokio::spawn(async move {
            let key = EphemeralKey::dynamic("authTokens", format!("token-{i}"));
            let input = EphemeralInput::new(key, format!("value-{i}"));
            store.set(&input, &location).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..32 {
        let key = EphemeralKey::dynamic("authTokens", format!("token-{i}"));
        let result = store.get(&key, &location).await.unwrap();
        assert_eq!(result.value(), Some(format!("value-{i}").as_str()));
    }
}

#[tokio::test]
async fn registry_lifecycle_end_to_end() {
    let registry = StoreRegistry::new();
    registry.set_factory(Arc::new(MemoryStoreFactory)).await;

    let store = registry.store().await.unwrap();
    let location = account_location();
    let key = EphemeralKey::new("somekey");
    store
        .set(&EphemeralInput::new(key.clone(), "v1"), &location)
        .await
        .unwrap();
    assert_eq!(store.get(&key, &location).await.unwrap().value(), Some("v1"));

    registry.shutdown().await;
    assert!(matches!(
        store.get(&key, &location).await.unwrap_err(),
        EphemeralError::StoreClosed
    ));

    // A fresh store builds cleanly after shutdown; prior data is gone.
    let rebuilt = registry.store().await.unwrap();
    assert!(rebuilt.get(&key, &location).await.unwrap().is_empty());
}
