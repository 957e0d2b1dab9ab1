//! Reading and writing fixed-width scalars in a chosen byte order.
//!
//! A [`BinaryWriter`] encodes [`Scalar`] values into a
//! [`Writable`](../trait.Writable.html) stream and a [`BinaryReader`]
//! decodes them from a [`Readable`](../trait.Readable.html) stream.
//! The byte order is fixed when the codec is built and is never inferred
//! from the data: the caller is responsible for knowing the wire layout.
//!
//! Hitting the end of the stream in the middle of a value is not an error.
//! Short reads yield `None` and short writes yield `false`.
//!
//! ```
//! use bytestreams::binary::{BinaryReader, Endian};
//! use bytestreams::stream::ExternalMemoryReader;
//!
//! let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
//! let mut view = ExternalMemoryReader::new(&data);
//! let mut reader = BinaryReader::new(&mut view, Endian::Little);
//! assert_eq!(reader.read::<u8>().unwrap(), Some(0x01));
//! assert_eq!(reader.read::<u16>().unwrap(), Some(0x0302));
//! assert_eq!(reader.read::<u32>().unwrap(), Some(0x07060504));
//! assert_eq!(reader.read::<u16>().unwrap(), None);
//! ```

mod reader;
pub use reader::BinaryReader;
mod writer;
pub use writer::BinaryWriter;

/// Byte order of the scalars encoded by a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Endian {
    /// The byte order of the platform.
    #[default]
    Native,
    Little,
    Big,
}

impl Endian {
    /// Whether this byte order is the byte order of the platform.
    pub fn is_native(self) -> bool {
        match self {
            Endian::Native => true,
            Endian::Little => cfg!(target_endian = "little"),
            Endian::Big => cfg!(target_endian = "big"),
        }
    }
}

/// A fixed-width value with a byte representation.
///
/// Every primitive integer and floating point type implements this trait.
/// Other types, such as packed 24-bit integers or 80-bit extended
/// floats, implement it by providing their conversion from and to their
/// bytes in the platform byte order. Their byte order is then swapped by
/// reversing their bytes.
///
/// ```
/// use bytestreams::binary::Scalar;
///
/// #[derive(Debug, PartialEq)]
/// struct U24([u8; 3]);
///
/// impl Scalar for U24 {
///     type Bytes = [u8; 3];
///     fn to_native_bytes(&self) -> [u8; 3] {
///         self.0
///     }
///     fn from_native_bytes(bytes: [u8; 3]) -> Self {
///         U24(bytes)
///     }
/// }
///
/// assert_eq!(U24([1, 2, 3]).swap_byte_order(), U24([3, 2, 1]));
/// ```
pub trait Scalar: Sized {
    /// Byte representation of the value, usually `[u8; N]`.
    ///
    /// Decoding starts from `Bytes::default()`, which the standard
    /// library only provides for arrays of up to 32 bytes. Wider values
    /// use a wrapper around their array implementing `Default`, `AsRef`
    /// and `AsMut`.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_native_bytes(&self) -> Self::Bytes;

    fn from_native_bytes(bytes: Self::Bytes) -> Self;

    /// The value with its bytes in reverse order.
    fn swap_byte_order(self) -> Self {
        let mut bytes = self.to_native_bytes();
        bytes.as_mut().reverse();
        Self::from_native_bytes(bytes)
    }
}

macro_rules! integer_scalar {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            type Bytes = [u8; std::mem::size_of::<$t>()];

            fn to_native_bytes(&self) -> Self::Bytes {
                self.to_ne_bytes()
            }

            fn from_native_bytes(bytes: Self::Bytes) -> Self {
                <$t>::from_ne_bytes(bytes)
            }

            fn swap_byte_order(self) -> Self {
                self.swap_bytes()
            }
        }
    )*};
}

macro_rules! float_scalar {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            type Bytes = [u8; std::mem::size_of::<$t>()];

            fn to_native_bytes(&self) -> Self::Bytes {
                self.to_ne_bytes()
            }

            fn from_native_bytes(bytes: Self::Bytes) -> Self {
                <$t>::from_ne_bytes(bytes)
            }

            fn swap_byte_order(self) -> Self {
                <$t>::from_bits(self.to_bits().swap_bytes())
            }
        }
    )*};
}

integer_scalar!(
    u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, usize, isize
);
float_scalar!(f32, f64);

/// Bring a value between the platform byte order and `endian`.
/// The conversion is its own inverse.
fn to_endian<T: Scalar>(value: T, endian: Endian) -> T {
    if endian.is_native() {
        value
    } else {
        value.swap_byte_order()
    }
}
