//! Fixed-width bitmap fingerprints.
//!
//! Bit `i` lives in byte `i / 8` under mask `1 << (i % 8)`. The stored form
//! is the raw bit bytes wrapped in a length-prefixed buffer, with no header
//! of its own.

use crate::similarity::bitmap as sim;
use crate::{ByteA, FingerprintError, Result};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

/// Number of bytes needed to hold `num_bits` bits.
#[inline]
pub const fn bytes_for_bits(num_bits: usize) -> usize {
    num_bits / 8 + if num_bits % 8 != 0 { 1 } else { 0 }
}

/// A fixed-width bit-vector fingerprint.
///
/// # Example
/// ```
/// use molfp_core::BitmapFingerprint;
///
/// let mut a = BitmapFingerprint::zeros(16);
/// a.set_bit(3, true);
/// a.set_bit(9, true);
///
/// let wire = a.to_varlena();
/// let b = BitmapFingerprint::from_varlena(&wire).unwrap();
/// assert_eq!(a.tanimoto(&b).unwrap(), 1.0);
/// ```
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct BitmapFingerprint {
    bytes: ByteA,
}

impl BitmapFingerprint {
    /// Create an all-zero fingerprint wide enough for `num_bits` bits.
    pub fn zeros(num_bits: usize) -> Self {
        Self {
            bytes: ByteA::from(vec![0u8; bytes_for_bits(num_bits)]),
        }
    }

    /// Wrap raw bit bytes.
    pub fn from_bytes(bytes: impl Into<ByteA>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Construct from the stored length-prefixed form.
    pub fn from_varlena(buf: &[u8]) -> Result<Self> {
        let bytes = ByteA::from_varlena(buf).map_err(|e| match e {
            FingerprintError::Decode { reason, .. } => {
                FingerprintError::decode("bitmap fingerprint", reason)
            }
            other => other,
        })?;
        Ok(Self { bytes })
    }

    /// Produce the stored length-prefixed form.
    #[inline]
    pub fn to_varlena(&self) -> bytes::Bytes {
        self.bytes.to_varlena()
    }

    /// The payload as a `ByteA`.
    #[inline]
    pub fn to_bytea(&self) -> ByteA {
        self.bytes.clone()
    }

    /// Index signature of this fingerprint: a copy of its bits.
    pub fn signature(&self) -> ByteA {
        ByteA::copy_from_slice(self.bytes.as_bytes())
    }

    /// Raw bit bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_bytes()
    }

    /// Width in bits (`byte length * 8`).
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Count the number of set bits.
    #[inline]
    pub fn popcount(&self) -> u32 {
        sim::popcount(self.as_bytes())
    }

    /// Check if a specific bit is set. Out-of-range bits read as unset.
    #[inline]
    pub fn get_bit(&self, index: usize) -> bool {
        self.as_bytes()
            .get(index / 8)
            .map_or(false, |b| b & (1u8 << (index % 8)) != 0)
    }

    /// Set or clear a specific bit. Out-of-range writes are ignored.
    pub fn set_bit(&mut self, index: usize, value: bool) {
        if index >= self.num_bits() {
            return;
        }
        // in place unless the buffer is shared with a clone
        let mut bytes = match std::mem::take(&mut self.bytes).into_bytes().try_into_mut() {
            Ok(unique) => unique,
            Err(shared) => BytesMut::from(&shared[..]),
        };
        if value {
            bytes[index / 8] |= 1u8 << (index % 8);
        } else {
            bytes[index / 8] &= !(1u8 << (index % 8));
        }
        self.bytes = ByteA::from(bytes.freeze());
    }

    /// Tanimoto similarity with another bitmap of the same byte length.
    pub fn tanimoto(&self, other: &Self) -> Result<f64> {
        sim::tanimoto(self.as_bytes(), other.as_bytes())
    }

    /// Dice similarity with another bitmap of the same byte length.
    pub fn dice(&self, other: &Self) -> Result<f64> {
        sim::dice(self.as_bytes(), other.as_bytes())
    }

    /// Tversky similarity with weights `alpha` (self) and `beta` (other).
    pub fn tversky(&self, other: &Self, alpha: f64, beta: f64) -> Result<f64> {
        sim::tversky(self.as_bytes(), other.as_bytes(), alpha, beta)
    }

    /// Convert to hex string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Create from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        hex::decode(s)
            .map(Self::from_bytes)
            .map_err(|e| FingerprintError::decode("bitmap hex", e.to_string()))
    }

    fn zip_with(&self, rhs: &Self, f: impl Fn(u8, u8) -> u8) -> Self {
        let bytes: Vec<u8> = self
            .as_bytes()
            .iter()
            .zip(rhs.as_bytes())
            .map(|(a, b)| f(*a, *b))
            .collect();
        Self::from_bytes(bytes)
    }
}

impl From<ByteA> for BitmapFingerprint {
    fn from(bytes: ByteA) -> Self {
        Self { bytes }
    }
}

impl From<BitmapFingerprint> for ByteA {
    fn from(fp: BitmapFingerprint) -> Self {
        fp.bytes
    }
}

impl BitAnd for &BitmapFingerprint {
    type Output = BitmapFingerprint;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a & b)
    }
}

impl BitOr for &BitmapFingerprint {
    type Output = BitmapFingerprint;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a | b)
    }
}

impl std::fmt::Debug for BitmapFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitmapFingerprint(bits={}, popcount={})",
            self.num_bits(),
            self.popcount()
        )
    }
}

impl Serialize for BitmapFingerprint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(self.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for BitmapFingerprint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            Ok(Self::from_bytes(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_for_bits() {
        assert_eq!(bytes_for_bits(0), 0);
        assert_eq!(bytes_for_bits(1), 1);
        assert_eq!(bytes_for_bits(8), 1);
        assert_eq!(bytes_for_bits(167), 21);
        assert_eq!(bytes_for_bits(2048), 256);
    }

    #[test]
    fn test_bit_layout() {
        let mut fp = BitmapFingerprint::zeros(16);
        fp.set_bit(0, true);
        fp.set_bit(9, true);
        assert_eq!(fp.as_bytes(), &[0b0000_0001, 0b0000_0010]);
        assert!(fp.get_bit(9));
        assert!(!fp.get_bit(8));
        assert!(!fp.get_bit(1000));

        fp.set_bit(9, false);
        assert_eq!(fp.popcount(), 1);
    }

    #[test]
    fn test_set_bit_copy_on_write() {
        let mut fp = BitmapFingerprint::zeros(2048);
        fp.set_bit(1, true);
        let buf = fp.as_bytes().as_ptr();
        for i in (0..2048).step_by(7) {
            fp.set_bit(i, true);
        }
        assert_eq!(fp.as_bytes().as_ptr(), buf);
        assert_eq!(fp.popcount(), 293 + 1);

        let snapshot = fp.clone();
        fp.set_bit(1, false);
        assert!(snapshot.get_bit(1));
        assert!(!fp.get_bit(1));
        assert_eq!(snapshot.popcount(), fp.popcount() + 1);
    }

    #[test]
    fn test_size_is_bytes_times_eight() {
        assert_eq!(BitmapFingerprint::zeros(167).num_bits(), 168);
        assert_eq!(BitmapFingerprint::zeros(512).num_bits(), 512);
    }

    #[test]
    fn test_varlena_round_trip() {
        let wire = [7u8, 0, 0, 0, 0xff, 0x00, 0x81];
        let fp = BitmapFingerprint::from_varlena(&wire).unwrap();
        assert_eq!(fp.popcount(), 10);
        assert_eq!(&fp.to_varlena()[..], &wire);
    }

    #[test]
    fn test_malformed_buffer() {
        let err = BitmapFingerprint::from_varlena(&[3, 0, 0]).unwrap_err();
        match err {
            FingerprintError::Decode { what, .. } => assert_eq!(what, "bitmap fingerprint"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_signature_copies_bits() {
        let fp = BitmapFingerprint::from_bytes(vec![0x0f, 0xf0]);
        assert_eq!(fp.signature().as_bytes(), fp.as_bytes());
    }

    #[test]
    fn test_bit_ops() {
        let a = BitmapFingerprint::from_bytes(vec![0b1100]);
        let b = BitmapFingerprint::from_bytes(vec![0b1010]);
        assert_eq!((&a & &b).as_bytes(), &[0b1000]);
        assert_eq!((&a | &b).as_bytes(), &[0b1110]);
    }

    #[test]
    fn test_hex_round_trip() {
        let fp = BitmapFingerprint::from_bytes(vec![0xde, 0xad]);
        assert_eq!(fp.to_hex(), "dead");
        assert_eq!(BitmapFingerprint::from_hex("dead").unwrap(), fp);
        assert!(BitmapFingerprint::from_hex("zz").is_err());
    }
}
