//! Readers hold and query snapshots while a writer keeps committing new versions.
//!
//! Each committed version `g` maps every key in `0..KEYS` to `g`, so a reader that ever sees two
//! different values in one snapshot has observed a partially applied transaction.

use std::sync::Arc;

use test_log::test;
use txart::{Snapshot, VectorKey};

const KEYS: u32 = 64;

fn generation(g: u32) -> Snapshot<u32> {
    let mut txn = Snapshot::new().txn();
    for k in 0..KEYS {
        txn.insert(VectorKey::from(k), g);
    }
    txn.commit()
}

fn check_consistent(snapshot: &Snapshot<u32>) {
    let Some((_, first)) = snapshot.first() else {
        panic!("published snapshot is empty");
    };
    let g = *first;
    assert_eq!(snapshot.len(), KEYS as usize);
    for k in 0..KEYS {
        assert_eq!(snapshot.get(VectorKey::from(k)), Some(&g), "key {k} in generation {g}");
    }
    assert!(snapshot.iter().all(|(_, v)| *v == g));
}

fn next_generation(snapshot: &Snapshot<u32>, g: u32) -> Snapshot<u32> {
    let mut txn = snapshot.txn();
    for k in 0..KEYS {
        txn.insert(VectorKey::from(k), g);
    }
    // Churn structure too: a longer key extending key 0 splits its leaf, and dropping it
    // collapses the split node again.
    let extra = VectorKey::from(u64::from(KEYS + g));
    txn.insert(&extra, g);
    txn.remove(&extra);
    txn.commit()
}

#[test]
fn shuttle_readers_see_whole_versions() {
    shuttle::check_random(
        || {
            let published = Arc::new(shuttle::sync::Mutex::new(generation(0)));

            let writer = {
                let published = published.clone();
                shuttle::thread::spawn(move || {
                    for g in 1..4 {
                        // The lock only serializes publication; the transaction itself runs
                        // against a private clone of the snapshot.
                        let base = published.lock().unwrap().clone();
                        let next = next_generation(&base, g);
                        check_consistent(&base);
                        *published.lock().unwrap() = next;
                    }
                })
            };

            let readers: Vec<_> = (0..2)
                .map(|_| {
                    let published = published.clone();
                    shuttle::thread::spawn(move || {
                        for _ in 0..3 {
                            let snapshot = published.lock().unwrap().clone();
                            check_consistent(&snapshot);
                        }
                    })
                })
                .collect();

            writer.join().unwrap();
            for reader in readers {
                reader.join().unwrap();
            }
            check_consistent(&published.lock().unwrap());
        },
        100,
    );
}

#[test]
fn std_threads_share_one_snapshot_during_writes() {
    let base = generation(0);
    let mut handles = Vec::new();
    for _ in 0..4 {
        let snapshot = base.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..50 {
                check_consistent(&snapshot);
            }
        }));
    }

    let mut current = base.clone();
    for g in 1..20 {
        current = next_generation(&current, g);
        check_consistent(&current);
    }
    for handle in handles {
        handle.join().unwrap();
    }

    check_consistent(&base);
    assert_eq!(base.get(VectorKey::from(0u32)), Some(&0));
    assert_eq!(current.get(VectorKey::from(0u32)), Some(&19));
}

#[test]
fn snapshots_outlive_their_successors() {
    let mut versions = vec![generation(0)];
    for g in 1..10 {
        let next = next_generation(&versions[versions.len() - 1], g);
        versions.push(next);
    }
    // Drop every other version; the rest must be untouched.
    let kept: Vec<_> = versions
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 0)
        .collect();
    for (g, snapshot) in kept {
        check_consistent(&snapshot);
        assert_eq!(snapshot.first().map(|(_, v)| *v), Some(g as u32));
        assert_eq!(snapshot.validate(), Ok(()));
    }
}
