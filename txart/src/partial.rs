use std::cmp::min;
use std::fmt;

/// The compressed prefix of an internal node, or the full key of a leaf.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Partial {
    data: Box<[u8]>,
}

impl Partial {
    pub fn from_slice(src: &[u8]) -> Self {
        Self { data: Box::from(src) }
    }

    #[inline(always)]
    pub fn to_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn at(&self, pos: usize) -> u8 {
        self.data[pos]
    }

    /// The first `length` bytes.
    pub fn partial_before(&self, length: usize) -> Self {
        assert!(length <= self.data.len());
        Self::from_slice(&self.data[..length])
    }

    /// Everything from `start` onwards.
    pub fn partial_after(&self, start: usize) -> Self {
        assert!(start <= self.data.len());
        Self::from_slice(&self.data[start..])
    }

    /// `self`, then `byte`, then `other`. Builds the prefix of a node that absorbs its only child.
    pub fn joined(&self, byte: u8, other: &Self) -> Self {
        let mut data = Vec::with_capacity(self.data.len() + 1 + other.data.len());
        data.extend_from_slice(&self.data);
        data.push(byte);
        data.extend_from_slice(&other.data);
        Self {
            data: data.into_boxed_slice(),
        }
    }

    /// Length of the common prefix of `self` and `slice`.
    pub fn prefix_length_slice(&self, slice: &[u8]) -> usize {
        let len = min(self.data.len(), slice.len());
        let mut idx = 0;
        while idx < len {
            if self.data[idx] != slice[idx] {
                break;
            }
            idx += 1;
        }
        idx
    }
}

impl From<&[u8]> for Partial {
    fn from(src: &[u8]) -> Self {
        Self::from_slice(src)
    }
}

impl AsRef<[u8]> for Partial {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x?}", &self.data[..])
    }
}
