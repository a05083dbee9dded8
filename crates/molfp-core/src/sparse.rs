//! Sparse integer-vector fingerprints.
//!
//! A sparse fingerprint maps keys in `0..width` to nonzero `i32` counts.
//! Entries live in a `BTreeMap`, so iteration and serialization are always
//! in ascending key order.

use crate::bitmap::bytes_for_bits;
use crate::range::{IntRange, RangeArray};
use crate::wire::{self, WireView};
use crate::{BitmapFingerprint, ByteA, FingerprintError, Operand, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// A sparse fingerprint over a key space of `width` keys.
///
/// # Example
/// ```
/// use molfp_core::SparseFingerprint;
///
/// let a = SparseFingerprint::from_entries(16, [(1, 3), (5, 2)]).unwrap();
/// let b = SparseFingerprint::from_entries(16, [(5, 4), (9, 1)]).unwrap();
/// assert!((a.dice(&b).unwrap() - 0.4).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SparseFingerprint {
    width: u32,
    elements: BTreeMap<u32, i32>,
}

impl SparseFingerprint {
    /// Create an empty fingerprint over `width` keys.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            elements: BTreeMap::new(),
        }
    }

    /// Build from `(key, value)` pairs. Later pairs overwrite earlier ones and
    /// zero values are not stored.
    pub fn from_entries<I>(width: u32, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, i32)>,
    {
        let mut fp = Self::new(width);
        for (key, value) in entries {
            fp.set(key, value)?;
        }
        Ok(fp)
    }

    /// Set the value for `key`. Setting zero removes the key.
    pub fn set(&mut self, key: u32, value: i32) -> Result<()> {
        if key >= self.width {
            return Err(FingerprintError::KeyOutOfRange {
                key,
                width: self.width,
            });
        }
        if value == 0 {
            self.elements.remove(&key);
        } else {
            self.elements.insert(key, value);
        }
        Ok(())
    }

    /// Value stored for `key`, or zero.
    #[inline]
    pub fn get(&self, key: u32) -> i32 {
        self.elements.get(&key).copied().unwrap_or(0)
    }

    /// Size of the key space.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of stored (nonzero) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u32, i32)> + '_ {
        self.elements.iter().map(|(k, v)| (*k, *v))
    }

    /// Sum of all stored values.
    pub fn total(&self) -> i64 {
        self.elements.values().map(|v| *v as i64).sum()
    }

    /// Decode the wire format.
    ///
    /// Keys need not be ascending here, but they must be unique and inside
    /// the declared width.
    pub fn from_wire(buf: &[u8]) -> Result<Self> {
        let view = WireView::parse(buf, Operand::First).map_err(|e| match e {
            FingerprintError::Format {
                field,
                expected,
                found,
                ..
            } => FingerprintError::decode(
                "sparse fingerprint",
                format!("{} expected {}, found {}", field, expected, found),
            ),
            FingerprintError::Decode { reason, .. } => {
                FingerprintError::decode("sparse fingerprint", reason)
            }
            other => other,
        })?;

        let mut fp = Self::new(view.width());
        for (key, value) in view.entries() {
            if key >= fp.width {
                return Err(FingerprintError::decode(
                    "sparse fingerprint",
                    format!("key {} outside width {}", key, fp.width),
                ));
            }
            if value == 0 {
                continue;
            }
            match fp.elements.entry(key) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                btree_map::Entry::Occupied(_) => {
                    return Err(FingerprintError::decode(
                        "sparse fingerprint",
                        format!("duplicate key {}", key),
                    ));
                }
            }
        }
        Ok(fp)
    }

    /// Encode to the wire format, keys ascending.
    pub fn to_wire(&self) -> Vec<u8> {
        wire::encode(self.width, self.elements.len(), self.iter())
    }

    /// Construct from the stored length-prefixed form.
    pub fn from_varlena(buf: &[u8]) -> Result<Self> {
        let bytes = ByteA::from_varlena(buf)?;
        Self::from_wire(bytes.as_bytes())
    }

    /// Produce the stored length-prefixed form.
    pub fn to_varlena(&self) -> bytes::Bytes {
        self.to_bytea().to_varlena()
    }

    /// Wire bytes as a `ByteA`.
    pub fn to_bytea(&self) -> ByteA {
        ByteA::from(self.to_wire())
    }

    /// Fold every key into `key % num_bits` of a bitmap.
    ///
    /// Distinct keys may land on the same bit; that loss is accepted.
    pub fn to_bitmap(&self, num_bits: usize) -> Result<BitmapFingerprint> {
        if num_bits == 0 {
            return Err(FingerprintError::InvalidWidth("bitmap bit count"));
        }
        let mut bytes = vec![0u8; bytes_for_bits(num_bits)];
        for key in self.elements.keys() {
            let n = *key as usize % num_bits;
            bytes[n / 8] |= 1u8 << (n % 8);
        }
        Ok(BitmapFingerprint::from_bytes(bytes))
    }

    /// Fold into a low-resolution `(low, high)` bucket summary.
    pub fn to_range_compressed(&self, num_ints: usize) -> Result<RangeArray> {
        if num_ints == 0 {
            return Err(FingerprintError::InvalidWidth("range bucket count"));
        }
        let mut buckets = vec![IntRange::default(); num_ints];
        for (key, value) in self.iter() {
            buckets[key as usize % num_ints].absorb(value);
        }
        Ok(RangeArray::from_buckets(buckets))
    }

    /// Elementwise sum over the union of keys.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.combine(other, "add", i32::checked_add)
    }

    /// Elementwise difference over the union of keys.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.combine(other, "subtract", i32::checked_sub)
    }

    fn combine(
        &self,
        other: &Self,
        op: &'static str,
        f: fn(i32, i32) -> Option<i32>,
    ) -> Result<Self> {
        if self.width != other.width {
            return Err(FingerprintError::Arithmetic(format!(
                "{}: width {} does not match width {}",
                op, self.width, other.width
            )));
        }

        let mut out = self.clone();
        for (key, value) in other.iter() {
            let current = out.get(key);
            let next = f(current, value).ok_or_else(|| {
                FingerprintError::Arithmetic(format!(
                    "{}: overflow at key {} ({} and {})",
                    op, key, current, value
                ))
            })?;
            out.set(key, next)?;
        }
        Ok(out)
    }

    /// Tanimoto similarity over the materialized vectors.
    pub fn tanimoto(&self, other: &Self) -> Result<f64> {
        crate::similarity::sparse::tanimoto(self, other)
    }

    /// Dice similarity over the materialized vectors.
    pub fn dice(&self, other: &Self) -> Result<f64> {
        crate::similarity::sparse::dice(self, other)
    }
}

impl Serialize for SparseFingerprint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let wire = self.to_wire();
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(wire))
        } else {
            serializer.serialize_bytes(&wire)
        }
    }
}

impl<'de> Deserialize<'de> for SparseFingerprint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(s).map_err(serde::de::Error::custom)?
        } else {
            Vec::<u8>::deserialize(deserializer)?
        };
        Self::from_wire(&wire).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::SPARSE_FORMAT_VERSION;

    fn fp(width: u32, entries: &[(u32, i32)]) -> SparseFingerprint {
        SparseFingerprint::from_entries(width, entries.iter().copied()).unwrap()
    }

    #[test]
    fn test_zero_values_not_stored() {
        let mut a = fp(32, &[(1, 3), (2, 0)]);
        assert_eq!(a.len(), 1);
        a.set(1, 0).unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn test_key_out_of_range() {
        let err = SparseFingerprint::from_entries(8, [(8, 1)]).unwrap_err();
        assert_eq!(err, FingerprintError::KeyOutOfRange { key: 8, width: 8 });
    }

    #[test]
    fn test_wire_is_ascending() {
        let a = fp(100, &[(50, 1), (3, 2), (20, -4)]);
        let wire = a.to_wire();
        let keys: Vec<u32> = WireView::parse(&wire, Operand::First)
            .unwrap()
            .entries()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![3, 20, 50]);
        assert_eq!(SparseFingerprint::from_wire(&wire).unwrap(), a);
    }

    #[test]
    fn test_decode_accepts_unordered_keys() {
        let wire = wire::encode(10, 2, [(7, 1), (2, 5)]);
        let a = SparseFingerprint::from_wire(&wire).unwrap();
        assert_eq!(a.get(2), 5);
        assert_eq!(a.get(7), 1);
    }

    #[test]
    fn test_decode_rejects_duplicates_and_range() {
        let dup = wire::encode(10, 2, [(2, 1), (2, 5)]);
        assert!(matches!(
            SparseFingerprint::from_wire(&dup),
            Err(FingerprintError::Decode { .. })
        ));
        let wide = wire::encode(10, 1, [(10, 1)]);
        assert!(SparseFingerprint::from_wire(&wide).is_err());
    }

    #[test]
    fn test_decode_reports_version_as_decode_error() {
        let mut buf = wire::encode(10, 0, []);
        buf[0] = (SPARSE_FORMAT_VERSION + 1) as u8;
        match SparseFingerprint::from_wire(&buf) {
            Err(FingerprintError::Decode { reason, .. }) => {
                assert!(reason.contains("format version"), "{reason}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_varlena_round_trip() {
        let a = fp(2048, &[(0, 1), (1000, 7), (2047, -3)]);
        let stored = a.to_varlena();
        let b = SparseFingerprint::from_varlena(&stored).unwrap();
        assert_eq!(a, b);
        assert_eq!(b.to_varlena(), stored);
    }

    #[test]
    fn test_to_bitmap_collisions() {
        let num_bits = 64;
        let a = fp(1024, &[(0, 1), (64, 1)]);
        let bm = a.to_bitmap(num_bits).unwrap();
        assert_eq!(bm.popcount(), 1);
        assert!(bm.get_bit(0));
        assert_eq!(bm.as_bytes().len(), 8);
    }

    #[test]
    fn test_to_bitmap_odd_width() {
        let a = fp(1024, &[(12, 2), (5, 1)]);
        let bm = a.to_bitmap(10).unwrap();
        assert_eq!(bm.as_bytes().len(), 2);
        assert!(bm.get_bit(2));
        assert!(bm.get_bit(5));
        assert!(a.to_bitmap(0).is_err());
    }

    #[test]
    fn test_add_and_subtract() {
        let a = fp(16, &[(1, 3), (5, 2)]);
        let b = fp(16, &[(5, 4), (9, 1)]);

        let sum = a.add(&b).unwrap();
        assert_eq!(sum.iter().collect::<Vec<_>>(), vec![(1, 3), (5, 6), (9, 1)]);

        let diff = a.subtract(&b).unwrap();
        assert_eq!(diff.iter().collect::<Vec<_>>(), vec![(1, 3), (5, -2), (9, -1)]);

        let zero = a.subtract(&a).unwrap();
        assert!(zero.is_empty());
    }

    #[test]
    fn test_arithmetic_errors() {
        let a = fp(16, &[(1, i32::MAX)]);
        assert!(matches!(a.add(&a), Err(FingerprintError::Arithmetic(_))));
        let b = fp(32, &[]);
        assert!(matches!(a.subtract(&b), Err(FingerprintError::Arithmetic(_))));
    }

    #[test]
    fn test_total() {
        assert_eq!(fp(16, &[(1, 3), (2, -1), (3, 8)]).total(), 10);
    }
}
