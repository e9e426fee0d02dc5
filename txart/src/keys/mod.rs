//! Owned keys with order-preserving encodings.
//!
//! The tree itself accepts anything that is `AsRef<[u8]>`. These types exist for callers whose
//! natural keys are integers or strings and who want iteration order to match the natural order.

pub mod vector_key;

pub use vector_key::VectorKey;
