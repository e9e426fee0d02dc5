use num_traits::PrimInt;

/// Occupancy bits for the fixed-width slot arrays backing Node48 and Node256.
pub trait BitsetTrait: Default {
    fn first_empty(&self) -> Option<usize>;
    fn set(&mut self, pos: usize);
    fn unset(&mut self, pos: usize);
    fn check(&self, pos: usize) -> bool;
    fn clear(&mut self);
    fn is_empty(&self) -> bool;
    fn size(&self) -> usize;
    fn capacity(&self) -> usize;
}

/// `WORDS` machine words of type `W`, bit `pos` living in word `pos / W::BITS`.
pub struct Bitset<W: PrimInt, const WORDS: usize> {
    words: [W; WORDS],
}

impl<W: PrimInt, const WORDS: usize> Bitset<W, WORDS> {
    pub fn new() -> Self {
        Self {
            words: [W::zero(); WORDS],
        }
    }

    #[inline]
    fn word_bits() -> usize {
        W::zero().count_zeros() as usize
    }

    #[inline]
    fn locate(pos: usize) -> (usize, W) {
        let bits = Self::word_bits();
        assert!(pos < WORDS * bits, "bit {pos} out of range");
        (pos / bits, W::one() << (pos % bits))
    }
}

impl<W: PrimInt, const WORDS: usize> BitsetTrait for Bitset<W, WORDS> {
    fn first_empty(&self) -> Option<usize> {
        let bits = Self::word_bits();
        self.words
            .iter()
            .position(|w| *w != W::max_value())
            .map(|i| i * bits + self.words[i].trailing_ones() as usize)
    }

    #[inline]
    fn set(&mut self, pos: usize) {
        let (i, mask) = Self::locate(pos);
        self.words[i] = self.words[i] | mask;
    }

    #[inline]
    fn unset(&mut self, pos: usize) {
        let (i, mask) = Self::locate(pos);
        self.words[i] = self.words[i] & !mask;
    }

    #[inline]
    fn check(&self, pos: usize) -> bool {
        let (i, mask) = Self::locate(pos);
        !(self.words[i] & mask).is_zero()
    }

    fn clear(&mut self) {
        self.words = [W::zero(); WORDS];
    }

    fn is_empty(&self) -> bool {
        self.words.iter().all(|w| w.is_zero())
    }

    fn size(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn capacity(&self) -> usize {
        WORDS * Self::word_bits()
    }
}

impl<W: PrimInt, const WORDS: usize> Default for Bitset<W, WORDS> {
    fn default() -> Self {
        Self::new()
    }
}

pub type Bitset64<const WORDS: usize> = Bitset<u64, WORDS>;

#[cfg(test)]
mod tests {
    use crate::utils::bitset::{Bitset, Bitset64, BitsetTrait};

    #[test]
    fn first_empty_skips_full_words() {
        let mut bs = Bitset::<u8, 4>::new();
        assert_eq!(bs.capacity(), 32);
        bs.set(1);
        bs.set(3);
        assert_eq!(bs.first_empty(), Some(0));
        bs.set(0);
        assert_eq!(bs.first_empty(), Some(2));

        for i in 0..8 {
            bs.set(i);
        }
        assert_eq!(bs.first_empty(), Some(8));
        for i in 0..bs.capacity() {
            bs.set(i);
        }
        assert_eq!(bs.first_empty(), None);
        bs.unset(17);
        assert_eq!(bs.first_empty(), Some(17));
    }

    #[test]
    fn set_check_across_words() {
        let mut bs = Bitset64::<4>::new();
        assert!(bs.is_empty());
        for i in [0, 63, 64, 200, 255] {
            bs.set(i);
        }
        assert!(bs.check(63) && bs.check(64) && bs.check(255));
        assert!(!bs.check(62));
        assert_eq!(bs.size(), 5);
        bs.unset(64);
        assert!(!bs.check(64));
        assert_eq!(bs.size(), 4);
        bs.clear();
        assert!(bs.is_empty());
    }

    #[test]
    #[should_panic]
    fn out_of_range_panics() {
        let mut bs = Bitset64::<1>::new();
        bs.set(64);
    }
}
