use crate::mapping::NodeMapping;
use crate::utils::bitarray::BitArray;
use crate::utils::bitset::Bitset64;

/// One slot per possible key byte. Backs Node256.
pub struct DirectMapping<N> {
    children: BitArray<N, 256, Bitset64<4>>,
    num_children: usize,
}

impl<N> Default for DirectMapping<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectMapping<N> {
    pub fn new() -> Self {
        Self {
            children: BitArray::new(),
            num_children: 0,
        }
    }

    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u8, &N)> {
        self.children.iter().map(|(key, node)| (key as u8, node))
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

    /// Move every child into `out` in key order, leaving the mapping empty.
    pub fn drain_into(&mut self, out: &mut Vec<N>) {
        for key in 0..256 {
            if let Some(child) = self.children.erase(key) {
                out.push(child);
            }
        }
        self.num_children = 0;
    }
}

impl<N> NodeMapping<N> for DirectMapping<N> {
    const WIDTH: usize = 256;

    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        if self.children.set(key as usize, node).is_none() {
            self.num_children += 1;
        }
    }

    #[inline]
    fn seek_child(&self, key: u8) -> Option<&N> {
        self.children.get(key as usize)
    }

    #[inline]
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        self.children.get_mut(key as usize)
    }

    #[inline]
    fn delete_child(&mut self, key: u8) -> Option<N> {
        let n = self.children.erase(key as usize);
        if n.is_some() {
            self.num_children -= 1;
        }
        n
    }

    #[inline]
    fn num_children(&self) -> usize {
        self.num_children
    }

    fn move_into<M: NodeMapping<N>>(&mut self, dest: &mut M) {
        let keys: Vec<usize> = self.children.iter_keys().collect();
        for key in keys {
            if let Some(child) = self.children.erase(key) {
                dest.add_child(key as u8, child);
            }
        }
        self.num_children = 0;
    }
}
