//! Overlap accounting between a sparse fingerprint and a folded summary.
//!
//! These feed index-side bound checks: how much of a query could still
//! match a stored bitmap signature or range summary.

use crate::bitmap::bytes_for_bits;
use crate::range::saturate;
use crate::{FingerprintError, RangeArray, Result, SparseFingerprint};

/// Totals from [`count_overlap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapCounts {
    /// Sum of every value in the sparse fingerprint.
    pub sum: i64,
    /// Sum of the values whose folded bit is set.
    pub overlap_sum: i64,
    /// Number of keys whose folded bit is set.
    pub overlap_count: usize,
}

/// Totals from [`count_range_overlap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeOverlap {
    pub query_sum: i64,
    pub key_sum: i64,
    pub overlap_low: i64,
    pub overlap_high: i64,
}

/// Fold each key of `sparse` into `key % num_bits` and total the values
/// that land on set bits of `signature`.
///
/// With no signature every bit counts as set, so every key overlaps.
pub fn count_overlap(
    signature: Option<&[u8]>,
    sparse: &SparseFingerprint,
    num_bits: usize,
) -> Result<OverlapCounts> {
    if num_bits == 0 {
        return Err(FingerprintError::InvalidWidth("bitmap bit count"));
    }

    let mut counts = OverlapCounts::default();

    let Some(sign) = signature else {
        counts.sum = sparse.total();
        counts.overlap_sum = counts.sum;
        counts.overlap_count = sparse.len();
        return Ok(counts);
    };

    let needed = bytes_for_bits(num_bits);
    if sign.len() < needed {
        return Err(FingerprintError::LengthMismatch {
            left: sign.len(),
            right: needed,
        });
    }

    for (key, value) in sparse.iter() {
        counts.sum += value as i64;
        let n = key as usize % num_bits;
        if sign[n / 8] & (1u8 << (n % 8)) != 0 {
            counts.overlap_sum += value as i64;
            counts.overlap_count += 1;
        }
    }
    Ok(counts)
}

/// Compare a query against a range summary bucket by bucket.
///
/// Keys landing in empty buckets contribute only to `query_sum`.
/// `key_sum` counts each bucket's low bound, plus its high bound when the
/// two differ.
pub fn count_range_overlap(
    ranges: &RangeArray,
    sparse: &SparseFingerprint,
) -> Result<RangeOverlap> {
    let buckets = ranges.buckets();
    if buckets.is_empty() {
        return Err(FingerprintError::InvalidWidth("range bucket count"));
    }

    let mut out = RangeOverlap::default();

    for (key, value) in sparse.iter() {
        out.query_sum += value as i64;
        let bucket = buckets[key as usize % buckets.len()];
        if bucket.is_empty() {
            continue;
        }
        let v = saturate(value);
        out.overlap_low += bucket.low.min(v) as i64;
        out.overlap_high += bucket.high.min(v) as i64;
    }

    debug_assert!(out.overlap_low <= out.overlap_high);

    for bucket in buckets {
        out.key_sum += bucket.low as i64;
        if bucket.low != bucket.high {
            out.key_sum += bucket.high as i64;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(width: u32, entries: &[(u32, i32)]) -> SparseFingerprint {
        SparseFingerprint::from_entries(width, entries.iter().copied()).unwrap()
    }

    #[test]
    fn test_overlap_with_signature() {
        let query = fp(1024, &[(3, 2), (10, 5), (17, 1)]);
        // bits 3 and 1 (= 17 % 16) set
        let sign = [0b0000_1010u8, 0];
        let c = count_overlap(Some(&sign), &query, 16).unwrap();
        assert_eq!(
            c,
            OverlapCounts {
                sum: 8,
                overlap_sum: 3,
                overlap_count: 2,
            }
        );
    }

    #[test]
    fn test_overlap_without_signature() {
        let query = fp(1024, &[(3, 2), (10, 5), (17, 1)]);
        let c = count_overlap(None, &query, 16).unwrap();
        assert_eq!(c.sum, 8);
        assert_eq!(c.overlap_sum, 8);
        assert_eq!(c.overlap_count, 3);
    }

    #[test]
    fn test_overlap_against_own_fold() {
        let query = fp(4096, &[(7, 1), (300, 4), (2049, 2)]);
        let sign = query.to_bitmap(2048).unwrap();
        let c = count_overlap(Some(sign.as_bytes()), &query, 2048).unwrap();
        assert_eq!(c.overlap_sum, c.sum);
        assert_eq!(c.overlap_count, query.len());
    }

    #[test]
    fn test_overlap_short_signature() {
        let query = fp(64, &[(3, 2)]);
        let err = count_overlap(Some(&[0u8]), &query, 16).unwrap_err();
        assert_eq!(err, FingerprintError::LengthMismatch { left: 1, right: 2 });
        assert!(count_overlap(None, &query, 0).is_err());
    }

    #[test]
    fn test_range_overlap_values() {
        let stored = fp(64, &[(1, 3), (5, 7), (2, 4)]);
        let ranges = stored.to_range_compressed(4).unwrap();
        // bucket 1 = (3, 7), bucket 2 = (4, 4)
        let query = fp(64, &[(1, 5), (6, 10), (3, 2)]);
        let r = count_range_overlap(&ranges, &query).unwrap();
        assert_eq!(r.query_sum, 17);
        // key 1 -> bucket 1: min(3,5)=3, min(7,5)=5
        // key 6 -> bucket 2: min(4,10)=4, min(4,10)=4
        // key 3 -> bucket 3: empty
        assert_eq!(r.overlap_low, 7);
        assert_eq!(r.overlap_high, 9);
        assert_eq!(r.key_sum, 3 + 7 + 4);
    }

    #[test]
    fn test_range_overlap_invariant_on_own_summary() {
        let query = fp(512, &[(0, 1), (9, 3), (17, 250), (33, 2), (40, 1000)]);
        for num_ints in [1usize, 4, 8, 16, 64] {
            let ranges = query.to_range_compressed(num_ints).unwrap();
            let per_bucket = query
                .iter()
                .fold(vec![Vec::new(); num_ints], |mut acc, (k, v)| {
                    acc[k as usize % num_ints].push(saturate(v));
                    acc
                });
            let r = count_range_overlap(&ranges, &query).unwrap();
            assert!(r.overlap_low <= r.overlap_high, "num_ints {num_ints}");
            // a bucket folding two equal values counts them once in key_sum
            let bounded = per_bucket
                .iter()
                .all(|vals| vals.len() < 2 || (vals.len() == 2 && vals[0] != vals[1]));
            if bounded {
                assert!(r.overlap_high <= r.key_sum, "num_ints {num_ints}");
            }
        }
    }
}
