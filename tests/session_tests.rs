//! Session store lifecycle and persistence tests

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::CountingProbe;
use snapconsole::auth::storage::{TOKEN_KEY, USER_KEY};
use snapconsole::auth::{FileStorage, Identity, MemoryStorage, Role, SessionStore, SnapshotStorage};

fn identity() -> Identity {
    Identity::new("alice", Role::Standard)
}

#[tokio::test]
async fn test_persistence_roundtrip_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    let first = SessionStore::new(
        Arc::new(FileStorage::new(dir.path())),
        CountingProbe::valid("alice", Role::Standard),
    );
    first.set_authenticated("tok-123", identity()).await;

    let second = SessionStore::new(
        Arc::new(FileStorage::new(dir.path())),
        CountingProbe::valid("alice", Role::Standard),
    );
    assert!(!second.is_authenticated().await);
    assert!(second.restore_from_snapshot().await);

    assert_eq!(second.credential().await.as_deref(), Some("tok-123"));
    assert_eq!(second.current_identity().await, Some(identity()));
    assert!(second.is_authenticated().await);
}

#[tokio::test]
async fn test_clear_twice_matches_clear_once() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = SessionStore::new(storage.clone(), CountingProbe::valid("alice", Role::Standard));

    store.set_authenticated("tok", identity()).await;
    store.clear().await;
    let once = store.snapshot().await;
    store.clear().await;

    assert_eq!(store.snapshot().await, once);
    assert!(storage.get(TOKEN_KEY).is_none());
    assert!(storage.get(USER_KEY).is_none());
}

#[tokio::test]
async fn test_authenticated_implies_credential_through_lifecycle() {
    let storage = Arc::new(MemoryStorage::new());
    let probe = CountingProbe::rejecting();
    let store = SessionStore::new(storage.clone(), probe);

    async fn check(store: &SessionStore) {
        let session = store.snapshot().await;
        if session.is_authenticated() {
            assert!(session.credential().is_some());
        }
        assert_eq!(store.is_authenticated().await, session.is_authenticated());
    }

    check(&store).await;
    store.restore_from_snapshot().await;
    check(&store).await;
    store.set_authenticated("tok", identity()).await;
    check(&store).await;
    store.validate_remotely().await;
    check(&store).await;
    assert!(!store.is_authenticated().await);

    storage.insert_raw(TOKEN_KEY, "tok");
    storage.insert_raw(USER_KEY, "garbage");
    store.restore_from_snapshot().await;
    check(&store).await;
    store.clear().await;
    check(&store).await;
}

#[tokio::test]
async fn test_restore_is_provisional_until_validated() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set_pair("stale", &serde_json::to_string(&identity()).unwrap())
        .unwrap();
    let probe = CountingProbe::rejecting();
    let store = SessionStore::new(storage.clone(), probe.clone());

    // well-formed snapshot counts as authenticated before the backend is asked
    assert!(store.restore_from_snapshot().await);
    assert!(store.is_authenticated().await);
    assert_eq!(probe.calls(), 0);

    assert!(!store.validate_remotely().await);
    assert!(!store.is_authenticated().await);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_identity_without_credential_is_not_authenticated() {
    let storage = Arc::new(MemoryStorage::new());
    storage.insert_raw(USER_KEY, &serde_json::to_string(&Identity::new("root", Role::Admin)).unwrap());
    let store = SessionStore::new(storage.clone(), CountingProbe::valid("root", Role::Admin));

    assert!(!store.restore_from_snapshot().await);
    assert!(!store.is_authenticated().await);
    assert!(!store.is_admin().await);
    assert!(storage.get(USER_KEY).is_none());
}

#[tokio::test]
async fn test_validation_discarded_when_credential_replaced() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(
        storage.clone(),
        CountingProbe::slow_rejecting(Duration::from_millis(100)),
    );
    store.set_authenticated("old", identity()).await;

    let (validated, _) = tokio::join!(store.validate_remotely(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.set_authenticated("new", identity()).await;
    });

    assert!(!validated);
    assert_eq!(store.credential().await.as_deref(), Some("new"));
    assert!(store.is_authenticated().await);
    assert!(store.is_validated().await);
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("new"));
    assert!(storage.get(USER_KEY).is_some());
}
