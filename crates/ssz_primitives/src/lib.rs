// Modified in 2025 from the original version
// Original source licensed under the Apache License 2.0

//! Primitive types for SSZ serialization.

use core::fmt;
use core::str::FromStr;

use ruint::Uint;

/// A 256-bit unsigned integer type.
///
/// `ruint::Uint<256, 4>` where:
/// - 256 = number of bits
/// - 4 = number of 64-bit limbs (256/64 = 4)
pub type U256 = Uint<256, 4>;

/// A 128-bit unsigned integer type.
pub type U128 = Uint<128, 2>;

/// A 32-byte hash type
pub type Hash256 = FixedBytes<32>;

/// A 20-byte Ethereum address type
pub type Address = FixedBytes<20>;

/// A 256-byte Ethereum bloom filter
pub type Bloom = FixedBytes<256>;

/// A fixed-size byte array type.
///
/// A simple wrapper around `[u8; N]` with convenient methods. The byte order
/// is exactly the serialized order, so SSZ codecs can move it in and out of
/// the wire format without any conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedBytes<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedBytes<N> {
    /// Create a new FixedBytes filled with zeros
    pub const fn zero() -> Self {
        Self([0u8; N])
    }

    /// Create filled with a specific byte
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; N])
    }

    /// Create from a slice, padding with zeros if needed
    pub fn from_slice(slice: &[u8]) -> Self {
        let mut result = [0u8; N];
        let len = slice.len().min(N);
        result[..len].copy_from_slice(&slice[..len]);
        Self(result)
    }

    /// Get as a byte slice
    pub const fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Get as a mutable byte slice
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// Create with right padding from the given slice
    pub fn right_padding_from(slice: &[u8]) -> Self {
        let mut result = [0u8; N];
        let len = slice.len().min(N);
        result[..len].copy_from_slice(&slice[..len]);
        Self(result)
    }

    /// Create with left padding from the given slice
    pub fn left_padding_from(slice: &[u8]) -> Self {
        let mut result = [0u8; N];
        let len = slice.len().min(N);
        let offset = N - len;
        result[offset..].copy_from_slice(&slice[..len]);
        Self(result)
    }

    /// Whether every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl<const N: usize> Default for FixedBytes<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> AsRef<[u8]> for FixedBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> AsMut<[u8]> for FixedBytes<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl<const N: usize> From<[u8; N]> for FixedBytes<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes)
    }
}

impl<const N: usize> From<FixedBytes<N>> for [u8; N] {
    fn from(bytes: FixedBytes<N>) -> Self {
        bytes.0
    }
}

impl<const N: usize> FromStr for FixedBytes<N> {
    type Err = hex::FromHexError;

    /// Parse from a hex string, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != N {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut result = [0u8; N];
        result.copy_from_slice(&bytes);
        Ok(Self(result))
    }
}

impl<const N: usize> fmt::Display for FixedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> serde::Serialize for FixedBytes<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

#[cfg(feature = "serde")]
impl<'de, const N: usize> serde::Deserialize<'de> for FixedBytes<N> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "rand")]
impl<const N: usize> FixedBytes<N> {
    /// Fill from the given random number generator
    pub fn random_with<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; N];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Fill from the thread-local random number generator
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }
}

impl Address {
    /// An address filled with zeros
    pub const ZERO: Self = Self::zero();
}

impl Hash256 {
    /// A hash filled with zeros
    pub const ZERO: Self = Self::zero();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let hash: Hash256 = "0xdb56114e00fdd4c1f85c892bf35ac9a89289aaecb1ebd0a96cde606a748b5d71"
            .parse()
            .unwrap();
        assert_eq!(
            hash.to_string(),
            "0xdb56114e00fdd4c1f85c892bf35ac9a89289aaecb1ebd0a96cde606a748b5d71"
        );
    }

    #[test]
    fn hex_wrong_length() {
        assert!("0x0011".parse::<Hash256>().is_err());
    }

    #[test]
    fn padding() {
        let bytes = FixedBytes::<4>::right_padding_from(&[1, 2]);
        assert_eq!(bytes.0, [1, 2, 0, 0]);
        let bytes = FixedBytes::<4>::left_padding_from(&[1, 2]);
        assert_eq!(bytes.0, [0, 0, 1, 2]);
    }

    #[test]
    fn zero() {
        assert!(Hash256::ZERO.is_zero());
        assert!(!Hash256::repeat_byte(1).is_zero());
        assert_eq!(Hash256::default(), Hash256::ZERO);
    }
}
