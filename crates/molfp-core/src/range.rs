//! Range-compressed low-resolution summaries of sparse fingerprints.
//!
//! Each bucket keeps the smallest and largest value folded into it, clamped
//! to `INT_RANGE_MAX`. `low == 0` means nothing landed in the bucket.

use crate::{ByteA, FingerprintError, Result};

/// Largest value a bucket bound can hold.
pub const INT_RANGE_MAX: u32 = 0xff;

/// Clamp a sparse value into bucket range. Negative values saturate too.
#[inline]
pub fn saturate(value: i32) -> u8 {
    if value < 0 || value as u32 > INT_RANGE_MAX {
        INT_RANGE_MAX as u8
    } else {
        value as u8
    }
}

/// One bucket of a range summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntRange {
    pub low: u8,
    pub high: u8,
}

impl IntRange {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low == 0
    }

    /// Widen the bounds to include `value`.
    pub(crate) fn absorb(&mut self, value: i32) {
        let v = saturate(value);
        if self.low == 0 || self.low > v {
            self.low = v;
        }
        if self.high < v {
            self.high = v;
        }
    }
}

/// Fixed-size array of `(low, high)` buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeArray {
    buckets: Vec<IntRange>,
}

impl RangeArray {
    pub(crate) fn from_buckets(buckets: Vec<IntRange>) -> Self {
        Self { buckets }
    }

    /// Number of buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    #[inline]
    pub fn buckets(&self) -> &[IntRange] {
        &self.buckets
    }

    /// Serialize as `low, high` byte pairs.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buckets.iter().flat_map(|r| [r.low, r.high]).collect()
    }

    /// Parse `low, high` byte pairs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(FingerprintError::decode(
                "range array",
                format!("odd length {}", bytes.len()),
            ));
        }
        let buckets = bytes
            .chunks_exact(2)
            .map(|pair| IntRange {
                low: pair[0],
                high: pair[1],
            })
            .collect();
        Ok(Self { buckets })
    }

    /// Stored length-prefixed form.
    pub fn to_varlena(&self) -> bytes::Bytes {
        ByteA::from(self.to_bytes()).to_varlena()
    }

    /// Parse the stored length-prefixed form.
    pub fn from_varlena(buf: &[u8]) -> Result<Self> {
        Self::from_bytes(ByteA::from_varlena(buf)?.as_bytes())
    }
}
