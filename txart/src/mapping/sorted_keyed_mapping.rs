use std::mem::MaybeUninit;

use crate::mapping::NodeMapping;
use crate::utils::u8_keys::{
    u8_keys_find_insert_position_sorted, u8_keys_find_key_position_sorted,
};

/// Maps a key byte to a child using a pair of parallel arrays, kept sorted by key.
/// Backs Node4 and Node16. Slots `0..num_children` of `children` are initialized; everything
/// past that is uninitialized and the corresponding key bytes are meaningless.
/// Inserting or deleting shifts the entries to the right of the affected position, which keeps
/// iteration ordered without any extra bookkeeping.
pub struct SortedKeyedMapping<N, const WIDTH: usize> {
    pub(crate) keys: [u8; WIDTH],
    pub(crate) children: [MaybeUninit<N>; WIDTH],
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for SortedKeyedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> SortedKeyedMapping<N, WIDTH> {
    #[inline]
    pub fn new() -> Self {
        Self {
            keys: [0; WIDTH],
            children: [const { MaybeUninit::uninit() }; WIDTH],
            num_children: 0,
        }
    }

    #[inline]
    pub fn iter(&self) -> SortedKeyedMappingIter<'_, N, WIDTH> {
        SortedKeyedMappingIter {
            mapping: self,
            front: 0,
            back: self.num_children as usize,
        }
    }

    /// Copy of this mapping with every child cloned; for `Arc` children that is a refcount bump.
    pub fn clone_shallow(&self) -> Self
    where
        N: Clone,
    {
        let mut new = Self::new();
        for (i, (key, child)) in self.iter().enumerate() {
            new.keys[i] = key;
            new.children[i].write(child.clone());
            new.num_children += 1;
        }
        new
    }

    /// Move every child into `out` in key order, leaving the mapping empty.
    pub fn drain_into(&mut self, out: &mut Vec<N>) {
        let len = self.num_children as usize;
        self.num_children = 0;
        for slot in &mut self.children[..len] {
            let child = std::mem::replace(slot, MaybeUninit::uninit());
            out.push(unsafe { child.assume_init() });
        }
    }

    /// Remove and return the entry at sorted position `idx`.
    fn take_at(&mut self, idx: usize) -> N {
        debug_assert!(idx < self.num_children as usize);
        let node = std::mem::replace(&mut self.children[idx], MaybeUninit::uninit());
        let len = self.num_children as usize;
        for i in idx..len - 1 {
            self.keys[i] = self.keys[i + 1];
            self.children[i] = std::mem::replace(&mut self.children[i + 1], MaybeUninit::uninit());
        }
        self.num_children -= 1;
        unsafe { node.assume_init() }
    }
}

pub struct SortedKeyedMappingIter<'a, N, const WIDTH: usize> {
    mapping: &'a SortedKeyedMapping<N, WIDTH>,
    front: usize,
    back: usize,
}

impl<'a, N, const WIDTH: usize> Iterator for SortedKeyedMappingIter<'a, N, WIDTH> {
    type Item = (u8, &'a N);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let i = self.front;
        self.front += 1;
        Some((self.mapping.keys[i], unsafe {
            self.mapping.children[i].assume_init_ref()
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<N, const WIDTH: usize> DoubleEndedIterator for SortedKeyedMappingIter<'_, N, WIDTH> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let i = self.back;
        Some((self.mapping.keys[i], unsafe {
            self.mapping.children[i].assume_init_ref()
        }))
    }
}

impl<N, const WIDTH: usize> ExactSizeIterator for SortedKeyedMappingIter<'_, N, WIDTH> {}

impl<N, const WIDTH: usize> NodeMapping<N> for SortedKeyedMapping<N, WIDTH> {
    const WIDTH: usize = WIDTH;

    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        let len = self.num_children as usize;
        assert!(len < WIDTH, "add_child on a full SortedKeyedMapping<{WIDTH}>");
        let idx = u8_keys_find_insert_position_sorted::<WIDTH>(key, &self.keys, len);
        for i in (idx..len).rev() {
            self.keys[i + 1] = self.keys[i];
            self.children[i + 1] = std::mem::replace(&mut self.children[i], MaybeUninit::uninit());
        }
        self.keys[idx] = key;
        self.children[idx].write(node);
        self.num_children += 1;
    }

    #[inline]
    fn seek_child(&self, key: u8) -> Option<&N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(unsafe { self.children[idx].assume_init_ref() })
    }

    #[inline]
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(unsafe { self.children[idx].assume_init_mut() })
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(self.take_at(idx))
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    fn move_into<M: NodeMapping<N>>(&mut self, dest: &mut M) {
        let len = self.num_children as usize;
        // Mark empty first so a panic in `dest` can't lead to a double drop.
        self.num_children = 0;
        for i in 0..len {
            let child = std::mem::replace(&mut self.children[i], MaybeUninit::uninit());
            dest.add_child(self.keys[i], unsafe { child.assume_init() });
        }
    }
}

impl<N, const WIDTH: usize> Drop for SortedKeyedMapping<N, WIDTH> {
    fn drop(&mut self) {
        for value in &mut self.children[..self.num_children as usize] {
            unsafe { value.assume_init_drop() }
        }
        self.num_children = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::mapping::NodeMapping;
    use crate::mapping::sorted_keyed_mapping::SortedKeyedMapping;

    #[test]
    fn test_add_seek_delete() {
        let mut node = SortedKeyedMapping::<u8, 4>::new();
        node.add_child(4, 4);
        node.add_child(2, 2);
        node.add_child(3, 3);
        node.add_child(1, 1);
        assert!(node.is_full());
        assert_eq!(node.num_children(), 4);
        for i in 1..=4 {
            assert_eq!(node.seek_child(i), Some(&i));
        }
        assert_eq!(node.seek_child(5), None);
        *node.seek_child_mut(3).unwrap() = 30;
        assert_eq!(node.seek_child(3), Some(&30));
        assert_eq!(node.delete_child(1), Some(1));
        assert_eq!(node.delete_child(3), Some(30));
        assert_eq!(node.delete_child(3), None);
        assert_eq!(node.num_children(), 2);
        assert_eq!(node.iter().collect::<Vec<_>>(), vec![(2, &2), (4, &4)]);
    }

    #[test]
    fn test_iter_is_sorted() {
        let mut node = SortedKeyedMapping::<u8, 16>::new();
        for k in [200u8, 3, 150, 77, 0, 255, 128, 9] {
            node.add_child(k, k);
        }
        let keys: Vec<u8> = node.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![0, 3, 9, 77, 128, 150, 200, 255]);
        let rev: Vec<u8> = node.iter().rev().map(|(k, _)| k).collect();
        assert_eq!(rev, vec![255, 200, 150, 128, 77, 9, 3, 0]);
    }

    #[test]
    fn test_move_into_larger() {
        let mut small = SortedKeyedMapping::<Box<u8>, 4>::new();
        for k in [7u8, 1, 5, 3] {
            small.add_child(k, Box::new(k));
        }
        let mut big = SortedKeyedMapping::<Box<u8>, 16>::new();
        small.move_into(&mut big);
        assert_eq!(small.num_children(), 0);
        assert_eq!(big.num_children(), 4);
        assert_eq!(big.iter().map(|(k, v)| (k, **v)).collect::<Vec<_>>(), vec![
            (1, 1),
            (3, 3),
            (5, 5),
            (7, 7)
        ]);
    }

    #[test]
    fn test_clone_shallow_shares_children() {
        let shared = Arc::new(1);
        let mut node = SortedKeyedMapping::<Arc<i32>, 4>::new();
        node.add_child(9, shared.clone());
        node.add_child(2, shared.clone());
        let copy = node.clone_shallow();
        assert_eq!(Arc::strong_count(&shared), 5);
        assert!(Arc::ptr_eq(copy.seek_child(9).unwrap(), &shared));
        drop(node);
        drop(copy);
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn test_drain_into_empties() {
        let mut node = SortedKeyedMapping::<Box<u8>, 16>::new();
        for k in [9u8, 4, 200] {
            node.add_child(k, Box::new(k));
        }
        let mut out = Vec::new();
        node.drain_into(&mut out);
        assert_eq!(node.num_children(), 0);
        assert_eq!(node.seek_child(4), None);
        assert_eq!(out.into_iter().map(|b| *b).collect::<Vec<_>>(), vec![4, 9, 200]);
    }
}
