//! A transactional adaptive radix tree.
//!
//! Keys are byte strings, stored in a prefix-compressed tree whose internal nodes move between
//! four capacity tiers (4, 16, 48, 256 children) as their fan-out changes. Versions of the tree
//! are immutable [`Snapshot`]s; a [`Txn`] derived from one copies only the nodes on the paths it
//! writes, and [`Txn::commit`] publishes the result as a new snapshot. Readers of any snapshot
//! never block and never see a transaction's writes.
//!
//! ```rust
//! use txart::Snapshot;
//!
//! let base = Snapshot::new();
//! let mut txn = base.txn();
//! txn.insert("a", 1);
//! txn.insert("ab", 2);
//! txn.insert("abc", 3);
//! let snap = txn.commit();
//!
//! let keys: Vec<&[u8]> = snap.iter().map(|(k, _)| k).collect();
//! assert_eq!(keys, [&b"a"[..], &b"ab"[..], &b"abc"[..]]);
//! assert!(base.is_empty());
//! ```

mod error;
pub mod iter;
pub mod keys;
pub mod mapping;
pub mod node;
mod partial;
mod search;
mod snapshot;
pub mod stats;
mod txn;
pub mod utils;
mod validate;

pub use error::{Error, Result};
pub use iter::Iter;
pub use keys::VectorKey;
pub use node::{Node, NodeKind};
pub use snapshot::Snapshot;
pub use stats::{NodeStats, TreeStats};
pub use txn::Txn;
