#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use txart::{Snapshot, Txn};

#[derive(Arbitrary, Debug, Clone)]
enum TxnOp {
    Get { key: Vec<u8> },
    Insert { key: Vec<u8>, val: u16 },
    Remove { key: Vec<u8> },
    Commit,
    /// Abandon the current transaction and restart from an older snapshot.
    Rebase { snapshot: usize },
}

type Model = BTreeMap<Vec<u8>, u16>;

fn check_snapshot(snapshot: &Snapshot<u16>, model: &Model) {
    if let Err(e) = snapshot.validate() {
        panic!("invalid tree: {e}");
    }
    assert_eq!(snapshot.len(), model.len(), "size mismatch");
    let mut entries = snapshot.iter();
    for (key, val) in model {
        let Some((k, v)) = entries.next() else {
            panic!("iteration ended early, missing {key:?}");
        };
        assert_eq!((k, v), (&key[..], val), "iteration order mismatch");
    }
    assert!(entries.next().is_none(), "iteration yielded extra entries");
}

fuzz_target!(|ops: Vec<TxnOp>| {
    let mut snapshots: Vec<(Snapshot<u16>, Model)> = vec![(Snapshot::new(), Model::new())];
    let mut txn: Txn<u16> = Snapshot::new().txn();
    let mut model = Model::new();

    for op in ops {
        match op {
            TxnOp::Get { key } => {
                assert_eq!(txn.get(&key), model.get(&key), "get mismatch for {key:?}");
            }
            TxnOp::Insert { key, val } => {
                let txn_old = txn.insert(&key, val);
                let model_old = model.insert(key.clone(), val);
                assert_eq!(txn_old, model_old, "insert mismatch for {key:?}");
                assert_eq!(txn.get(&key), Some(&val));
            }
            TxnOp::Remove { key } => {
                let txn_removed = txn.remove(&key);
                let model_removed = model.remove(&key);
                assert_eq!(txn_removed, model_removed, "remove mismatch for {key:?}");
                assert_eq!(txn.get(&key), None);
            }
            TxnOp::Commit => {
                let snapshot = std::mem::replace(&mut txn, Snapshot::new().txn()).commit();
                check_snapshot(&snapshot, &model);
                txn = snapshot.txn();
                snapshots.push((snapshot, model.clone()));
            }
            TxnOp::Rebase { snapshot } => {
                let (base, base_model) = &snapshots[snapshot % snapshots.len()];
                txn = base.txn();
                model = base_model.clone();
            }
        }
        assert_eq!(txn.len(), model.len());
    }

    // No transaction, committed or abandoned, may have touched an earlier version.
    for (snapshot, expected) in &snapshots {
        check_snapshot(snapshot, expected);
    }
});
