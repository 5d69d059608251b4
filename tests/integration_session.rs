//! Session store behaviour under concurrent writers and failures.

use sifter::analyser::lifecycle::{Mutation, SessionStore, VersionOrigin};
use sifter::analyser::logic::{CleanRequest, MissingMethod, TransformRequest};
use std::sync::Arc;

const DATA: &[u8] = b"a,b\n1,10\n2,20\n3,30\n,40\n2,20\n";

#[tokio::test]
async fn test_mutations_before_upload_are_state_errors() {
    let store = SessionStore::default();
    let err = store
        .mutate(Mutation::Clean(CleanRequest::default()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "state_error");
    assert!(store.try_current().unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_mutations_get_consecutive_versions() {
    let store = Arc::new(SessionStore::default());
    store.load(DATA.to_vec()).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let request = if i % 2 == 0 {
                    Mutation::Clean(CleanRequest {
                        remove_duplicates: true,
                        ..CleanRequest::default()
                    })
                } else {
                    Mutation::Transform(TransformRequest {
                        normalize: true,
                        ..TransformRequest::default()
                    })
                };
                store.mutate(request).await.unwrap()
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    outcomes.sort_by_key(|o| o.version);

    let versions: Vec<u64> = outcomes.iter().map(|o| o.version).collect();
    assert_eq!(versions, (1..=10).collect::<Vec<u64>>());
    for outcome in &outcomes {
        assert_eq!(
            outcome.previous_version,
            outcome.version - 1,
            "each writer sees the previous commit"
        );
    }
    assert_eq!(store.current().unwrap().id, 10);
}

#[tokio::test]
async fn test_readers_keep_their_snapshot() {
    let store = SessionStore::default();
    store.load(DATA.to_vec()).await.unwrap();
    let snapshot = store.current().unwrap();

    let request = CleanRequest {
        handle_missing: true,
        missing_method: MissingMethod::Drop,
        ..CleanRequest::default()
    };
    store.mutate(Mutation::Clean(request)).await.unwrap();

    assert_eq!(snapshot.stats.rows, 5);
    assert_eq!(store.current().unwrap().stats.rows, 4);
}

#[tokio::test]
async fn test_failed_mutation_keeps_current_version() {
    let store = SessionStore::default();
    store.load(DATA.to_vec()).await.unwrap();

    let request = TransformRequest {
        log_transform: true,
        log_columns: vec!["missing".to_owned()],
        ..TransformRequest::default()
    };
    let err = store.mutate(Mutation::Transform(request)).await.unwrap_err();
    assert_eq!(err.kind(), "validation_error");
    assert_eq!(store.current().unwrap().id, 0);

    let outcome = store
        .mutate(Mutation::Clean(CleanRequest::default()))
        .await
        .unwrap();
    assert_eq!(outcome.version, 1, "failed mutations do not consume ids");
    assert_eq!(store.history().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_resets_lineage() {
    let store = SessionStore::default();
    store.load(DATA.to_vec()).await.unwrap();
    store
        .mutate(Mutation::Clean(CleanRequest {
            remove_duplicates: true,
            ..CleanRequest::default()
        }))
        .await
        .unwrap();

    let fresh = store.load(b"x\n1\n".to_vec()).await.unwrap();
    assert_eq!(fresh.id, 2);
    assert_eq!(fresh.parent_id, None);
    assert_eq!(fresh.origin, VersionOrigin::Upload);

    let mutated = store.current().unwrap();
    assert_eq!(mutated.dataset.column_names(), ["x"]);
}
