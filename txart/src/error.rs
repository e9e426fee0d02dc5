use thiserror::Error;

use crate::node::NodeKind;

/// A structural invariant that does not hold, as reported by `validate()`.
///
/// Paths are the key bytes consumed on the way down to the offending node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A leaf is reachable through bytes its key does not contain
    #[error("key {key:02x?} is stored under path {path:02x?}")]
    PrefixMismatch { path: Vec<u8>, key: Vec<u8> },

    /// The value-bearing leaf of an internal node is not keyed by that node's path
    #[error("terminal of node at {path:02x?} holds key {key:02x?}")]
    MisplacedTerminal { path: Vec<u8>, key: Vec<u8> },

    /// An internal node uses a larger tier than its child count needs
    #[error("{kind:?} at {path:02x?} holds {children} children")]
    NonMinimalTier {
        path: Vec<u8>,
        kind: NodeKind,
        children: usize,
    },

    /// An internal node with one child and no value of its own
    #[error("node at {path:02x?} has a single child and no value")]
    Uncollapsed { path: Vec<u8> },

    /// An internal node with no children
    #[error("node at {path:02x?} has no children")]
    EmptyInner { path: Vec<u8> },

    /// The recorded entry count disagrees with the tree
    #[error("size is {recorded} but {counted} values are reachable")]
    SizeMismatch { recorded: usize, counted: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
