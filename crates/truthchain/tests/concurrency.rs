//! Concurrent registrations and flags against a shared registry.
//!
//! The store applies counter bumps and hash rotations to the value it holds at
//! commit time. Racing writers are therefore applied in some serial order:
//! every valid write succeeds and no increment is lost. Two flags racing on one
//! record leave it as if they had run one after the other, and a flag whose
//! hash the other racer already installed is `NoChangeDetected`.

use std::sync::Arc;

use tokio::sync::Barrier;

use truthchain::store::{MemoryStore, Store};
use truthchain::{Caller, DocumentRegistry, Fingerprint, RegistryConfig, RegistryError};
use truthchain_testkit::{multi_party_callers, sample_metadata};

async fn initialized() -> (Arc<DocumentRegistry<MemoryStore>>, Caller) {
    let registry = DocumentRegistry::new(MemoryStore::new(), RegistryConfig::default()).unwrap();
    let admin = Caller::from_keypair(&multi_party_callers(1)[0]);
    registry.initialize_registry(&admin).await.unwrap();
    (Arc::new(registry), admin)
}

/// Flag `fp` with both hashes at once, released together by a barrier.
async fn race_flags(
    registry: &Arc<DocumentRegistry<MemoryStore>>,
    admin: &Caller,
    fp: Fingerprint,
    hashes: [Fingerprint; 2],
) -> Vec<Result<Fingerprint, RegistryError>> {
    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for new_hash in hashes {
        let registry = Arc::clone(registry);
        let admin = admin.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            registry
                .flag_modification(&admin, fp.as_bytes(), new_hash.as_bytes())
                .await
                .map(|record| record.current_hash)
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    outcomes
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_are_all_counted() {
    let (registry, _) = initialized().await;
    let callers = multi_party_callers(8);

    let mut handles = Vec::new();
    for (i, keypair) in callers.iter().enumerate() {
        let registry = Arc::clone(&registry);
        let caller = Caller::from_keypair(keypair);
        handles.push(tokio::spawn(async move {
            for page in 0..16u32 {
                let fp = Fingerprint::digest(format!("caller {} page {}", i, page).as_bytes());
                registry
                    .register_document(&caller, fp.as_bytes(), sample_metadata(page))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.registry().await.unwrap().document_count, 8 * 16);
    assert_eq!(registry.store().scan_documents().await.unwrap().len(), 8 * 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_duplicate_registrations_admit_one() {
    let (registry, _) = initialized().await;
    let fp = Fingerprint::digest(b"contested page");

    let mut handles = Vec::new();
    for keypair in multi_party_callers(12) {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .register_document(&Caller::from_keypair(&keypair), fp.as_bytes(), sample_metadata(1))
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(RegistryError::DuplicateDocument { fingerprint }) => assert_eq!(fingerprint, fp),
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(registry.registry().await.unwrap().document_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_flags_keep_every_increment() {
    let (registry, admin) = initialized().await;
    let fp = Fingerprint::digest(b"hot page");
    registry
        .register_document(&admin, fp.as_bytes(), sample_metadata(1))
        .await
        .unwrap();

    let tasks = 8u32;
    let flags_per_task = 10u32;
    let mut handles = Vec::new();
    for t in 0..tasks {
        let registry = Arc::clone(&registry);
        let admin = admin.clone();
        handles.push(tokio::spawn(async move {
            for n in 0..flags_per_task {
                // Unique hashes, so no flag can be a no-op.
                let new_hash = Fingerprint::digest(format!("edit {} {}", t, n).as_bytes());
                registry
                    .flag_modification(&admin, fp.as_bytes(), new_hash.as_bytes())
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let record = registry.document(&fp).await.unwrap();
    assert_eq!(record.modification_count, tasks * flags_per_task);
    assert!(record.is_modified);
    assert_ne!(record.previous_hash, Some(record.current_hash));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_flags_with_different_hashes_serialize() {
    let (registry, admin) = initialized().await;

    for round in 0..32u32 {
        let fp = Fingerprint::digest(format!("page {}", round).as_bytes());
        registry
            .register_document(&admin, fp.as_bytes(), sample_metadata(round))
            .await
            .unwrap();
        let a = Fingerprint::digest(format!("page {}, edit a", round).as_bytes());
        let b = Fingerprint::digest(format!("page {}, edit b", round).as_bytes());

        let outcomes = race_flags(&registry, &admin, fp, [a, b]).await;
        assert!(outcomes.iter().all(Result::is_ok), "{:?}", outcomes);

        let record = registry.document(&fp).await.unwrap();
        assert_eq!(record.modification_count, 2);
        assert!(record.is_modified);
        // Either a then b, or b then a. The original fingerprint was rotated
        // out by the first flag.
        assert!(
            (record.current_hash == b && record.previous_hash == Some(a))
                || (record.current_hash == a && record.previous_hash == Some(b)),
            "round {}: current {} previous {:?}",
            round,
            record.current_hash,
            record.previous_hash
        );
        assert_eq!(record.fingerprint, fp);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_flags_with_the_same_hash_admit_one() {
    let (registry, admin) = initialized().await;

    for round in 0..32u32 {
        let fp = Fingerprint::digest(format!("page {}", round).as_bytes());
        registry
            .register_document(&admin, fp.as_bytes(), sample_metadata(round))
            .await
            .unwrap();
        let edited = Fingerprint::digest(format!("page {}, edited", round).as_bytes());

        let outcomes = race_flags(&registry, &admin, fp, [edited, edited]).await;
        let winners = outcomes.iter().filter(|o| o.is_ok()).count();
        assert_eq!(winners, 1, "round {}: {:?}", round, outcomes);
        assert!(outcomes.iter().any(|o| matches!(
            o,
            Err(RegistryError::NoChangeDetected { fingerprint, current })
                if *fingerprint == fp && *current == edited
        )));

        let record = registry.document(&fp).await.unwrap();
        assert_eq!(record.modification_count, 1);
        assert_eq!(record.previous_hash, Some(fp));
        assert_eq!(record.current_hash, edited);
    }
}
