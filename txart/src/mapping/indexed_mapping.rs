use crate::mapping::NodeMapping;
use crate::utils::bitarray::BitArray;
use crate::utils::bitset::Bitset64;

/// Maps key bytes to child slots through a 256-entry index. Backs Node48.
///
/// `child_ptr_indexes[byte]` holds the slot in `children` for that byte. Slots are reused via
/// the occupancy bitset, so their order says nothing; ordered iteration walks the index.
pub struct IndexedMapping<N, const WIDTH: usize> {
    child_ptr_indexes: Box<BitArray<u8, 256, Bitset64<4>>>,
    children: Box<BitArray<N, WIDTH, Bitset64<1>>>,
    num_children: u8,
}

impl<N, const WIDTH: usize> Default for IndexedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> IndexedMapping<N, WIDTH> {
    pub fn new() -> Self {
        Self {
            child_ptr_indexes: Box::new(BitArray::new()),
            children: Box::new(BitArray::new()),
            num_children: 0,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u8, &N)> {
        self.child_ptr_indexes.iter().filter_map(move |(key, pos)| {
            self.children
                .get(*pos as usize)
                .map(|child| (key as u8, child))
        })
    }

    pub fn clone_shallow(&self) -> Self
    where
        N: Clone,
    {
        let mut new = Self::new();
        for (key, child) in self.iter() {
            new.add_child(key, child.clone());
        }
        new
    }

    /// Move every child into `out`, leaving the mapping empty.
    pub fn drain_into(&mut self, out: &mut Vec<N>) {
        self.child_ptr_indexes.clear();
        for pos in 0..WIDTH {
            if let Some(child) = self.children.erase(pos) {
                out.push(child);
            }
        }
        self.num_children = 0;
    }
}

impl<N, const WIDTH: usize> NodeMapping<N> for IndexedMapping<N, WIDTH> {
    const WIDTH: usize = WIDTH;

    fn add_child(&mut self, key: u8, node: N) {
        let Some(pos) = self.children.first_free_pos() else {
            panic!("add_child on a full IndexedMapping<{WIDTH}>");
        };
        self.child_ptr_indexes.set(key as usize, pos as u8);
        self.children.set(pos, node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let pos = self.child_ptr_indexes.get(key as usize)?;
        self.children.get(*pos as usize)
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let pos = self.child_ptr_indexes.get(key as usize)?;
        self.children.get_mut(*pos as usize)
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let pos = self.child_ptr_indexes.erase(key as usize)?;
        let old = self.children.erase(pos as usize);
        self.num_children -= 1;
        old
    }

    #[inline]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }

    fn move_into<M: NodeMapping<N>>(&mut self, dest: &mut M) {
        let keys: Vec<usize> = self.child_ptr_indexes.iter_keys().collect();
        for key in keys {
            if let Some(pos) = self.child_ptr_indexes.erase(key)
                && let Some(child) = self.children.erase(pos as usize)
            {
                dest.add_child(key as u8, child);
            }
        }
        self.num_children = 0;
    }
}

#[cfg(test)]
mod test {
    use crate::mapping::NodeMapping;
    use crate::mapping::direct_mapping::DirectMapping;

    #[test]
    fn test_basic_mapping() {
        let mut mapping = super::IndexedMapping::<u8, 48>::new();
        for i in 0..48 {
            mapping.add_child(i, i);
            assert_eq!(*mapping.seek_child(i).unwrap(), i);
        }
        assert!(mapping.is_full());
        for i in 0..48 {
            assert_eq!(mapping.delete_child(i).unwrap(), i);
        }
        for i in 0..48 {
            assert!(mapping.seek_child(i as u8).is_none());
        }
        assert_eq!(mapping.num_children(), 0);
    }

    #[test]
    fn test_iter_orders_by_key_not_slot() {
        let mut mapping = super::IndexedMapping::<u16, 48>::new();
        for key in [250u8, 10, 128, 3] {
            mapping.add_child(key, key as u16);
        }
        // Free slot 1, then reuse it for a key that sorts last.
        mapping.delete_child(10);
        mapping.add_child(255, 255);
        let keys: Vec<u8> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![3, 128, 250, 255]);
        let last = mapping.iter().next_back().map(|(k, _)| k);
        assert_eq!(last, Some(255));
    }

    #[test]
    fn test_move_into_direct() {
        let mut mapping = super::IndexedMapping::<u8, 48>::new();
        for i in 0..48u8 {
            mapping.add_child(i * 5, i);
        }
        let mut direct = DirectMapping::new();
        mapping.move_into(&mut direct);
        assert_eq!(mapping.num_children(), 0);
        assert_eq!(direct.num_children(), 48);
        assert_eq!(direct.seek_child(235), Some(&47));
    }

    #[test]
    fn test_drain_into_then_reuse() {
        let mut mapping = super::IndexedMapping::<u8, 48>::new();
        for i in 0..48u8 {
            mapping.add_child(i * 3, i);
        }
        let mut out = Vec::new();
        mapping.drain_into(&mut out);
        assert_eq!(out.len(), 48);
        assert_eq!(mapping.num_children(), 0);
        assert!(mapping.seek_child(3).is_none());
        mapping.add_child(3, 99);
        assert_eq!(mapping.seek_child(3), Some(&99));
    }
}
