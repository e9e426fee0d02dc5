use std::fmt;

/// An owned, variable length byte key.
///
/// Integer conversions are big-endian, and signed integers have their sign bit flipped, so that
/// byte-wise order matches numeric order. String conversions use the UTF-8 bytes as-is, which
/// keeps byte-wise order equal to `str` order.
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Default)]
pub struct VectorKey {
    data: Box<[u8]>,
}

impl VectorKey {
    pub fn new_from_slice(data: &[u8]) -> Self {
        Self {
            data: Box::from(data),
        }
    }

    pub fn new_from_vec(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decodes a key produced from an unsigned integer of at most 8 bytes.
    pub fn to_be_u64(&self) -> u64 {
        assert!(self.data.len() <= 8, "key is longer than 8 bytes");
        let mut arr = [0; 8];
        arr[8 - self.data.len()..].copy_from_slice(&self.data);
        u64::from_be_bytes(arr)
    }
}

impl AsRef<[u8]> for VectorKey {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for VectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.data) {
            Ok(s) => write!(f, "VectorKey({s:?})"),
            Err(_) => write!(f, "VectorKey({:02x?})", &self.data[..]),
        }
    }
}

impl From<&[u8]> for VectorKey {
    fn from(data: &[u8]) -> Self {
        Self::new_from_slice(data)
    }
}

impl From<Vec<u8>> for VectorKey {
    fn from(data: Vec<u8>) -> Self {
        Self::new_from_vec(data)
    }
}

impl From<String> for VectorKey {
    fn from(data: String) -> Self {
        Self::new_from_vec(data.into_bytes())
    }
}

impl From<&String> for VectorKey {
    fn from(data: &String) -> Self {
        Self::new_from_slice(data.as_bytes())
    }
}

impl From<&str> for VectorKey {
    fn from(data: &str) -> Self {
        Self::new_from_slice(data.as_bytes())
    }
}

macro_rules! impl_from_unsigned {
    ( $($t:ty),* ) => {
    $(
    impl From< $t > for VectorKey
    {
        fn from(data: $t) -> Self {
            VectorKey::new_from_slice(&data.to_be_bytes())
        }
    }
    impl From< &$t > for VectorKey
    {
        fn from(data: &$t) -> Self {
            (*data).into()
        }
    }
    ) *
    }
}
impl_from_unsigned!(u8, u16, u32, u64, usize, u128);

macro_rules! impl_from_signed {
    ( $t:ty, $tu:ty ) => {
        impl From<$t> for VectorKey {
            fn from(val: $t) -> Self {
                let flipped = (val as $tu) ^ (1 << (<$tu>::BITS - 1));
                VectorKey::new_from_slice(&flipped.to_be_bytes())
            }
        }

        impl From<&$t> for VectorKey {
            fn from(val: &$t) -> Self {
                (*val).into()
            }
        }
    };
}

impl_from_signed!(i8, u8);
impl_from_signed!(i16, u16);
impl_from_signed!(i32, u32);
impl_from_signed!(i64, u64);
impl_from_signed!(i128, u128);
impl_from_signed!(isize, usize);

#[cfg(test)]
mod test {
    use crate::keys::vector_key::VectorKey;

    #[test]
    fn from_to_u64() {
        let k: VectorKey = 123u64.into();
        assert_eq!(k.to_be_u64(), 123u64);

        let k: VectorKey = 1u64.into();
        assert_eq!(k.to_be_u64(), 1u64);

        let k: VectorKey = 123213123123123u64.into();
        assert_eq!(k.to_be_u64(), 123213123123123u64);

        let k: VectorKey = 7u16.into();
        assert_eq!(k.len(), 2);
        assert_eq!(k.to_be_u64(), 7);
    }

    #[test]
    fn signed_keys_sort_numerically() {
        let values = [i32::MIN, -1000, -1, 0, 1, 42, i32::MAX];
        let keys: Vec<VectorKey> = values.iter().map(VectorKey::from).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let small: Vec<VectorKey> = [-128i8, -1, 0, 127].iter().map(VectorKey::from).collect();
        assert!(small.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(VectorKey::from(0i8).as_slice(), &[0x80]);
    }

    #[test]
    fn strings_keep_their_bytes() {
        let k = VectorKey::from("abc");
        assert_eq!(k.as_slice(), b"abc");
        assert_eq!(VectorKey::from(String::from("abc")), k);
        assert!(VectorKey::from("ab") < k);
        assert_eq!(format!("{k:?}"), "VectorKey(\"abc\")");
    }
}
