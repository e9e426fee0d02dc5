//! Child storage for the four inner node tiers.
//!
//! Every mapping associates the next key byte with a child. Iteration over any mapping is in
//! ascending byte order, which is what makes tree traversal ordered.

pub mod direct_mapping;
pub mod indexed_mapping;
pub mod sorted_keyed_mapping;

pub trait NodeMapping<N> {
    /// Maximum number of children this mapping can hold.
    const WIDTH: usize;

    /// Add a child under `key`. The key must not already be present and the mapping must not be
    /// full.
    fn add_child(&mut self, key: u8, node: N);
    fn seek_child(&self, key: u8) -> Option<&N>;
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N>;
    fn delete_child(&mut self, key: u8) -> Option<N>;
    fn num_children(&self) -> usize;

    /// Move every child into `dest`, leaving this mapping empty. Used when a node changes tier.
    fn move_into<M: NodeMapping<N>>(&mut self, dest: &mut M);

    #[inline]
    fn is_full(&self) -> bool {
        self.num_children() >= Self::WIDTH
    }

    #[inline]
    fn width(&self) -> usize {
        Self::WIDTH
    }
}
