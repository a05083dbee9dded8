//! Similarity over sparse fingerprints.
//!
//! The materialized functions work on decoded `SparseFingerprint`s. The
//! streaming functions read wire buffers directly and never build a map.

use crate::wire::WireView;
use crate::{FingerprintError, HeaderField, Operand, Result, SparseFingerprint};
use std::cmp::Ordering;
use tracing::debug;

/// Denominators closer to zero than this score 0.0.
pub const DENOM_EPSILON: f64 = 1e-6;

/// Shared-minimum numerator and value totals of two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq)]
struct VectParams {
    numer: f64,
    sum_a: f64,
    sum_b: f64,
}

fn vect_params(a: &SparseFingerprint, b: &SparseFingerprint) -> Result<VectParams> {
    if a.width() != b.width() {
        return Err(FingerprintError::Comparison(format!(
            "fingerprint widths differ: {} vs {}",
            a.width(),
            b.width()
        )));
    }

    let mut numer = 0.0;
    for (key, va) in a.iter() {
        let vb = b.get(key);
        if vb != 0 {
            numer += va.min(vb) as f64;
        }
    }

    Ok(VectParams {
        numer,
        sum_a: a.total() as f64,
        sum_b: b.total() as f64,
    })
}

/// `numer / (sumA + sumB - numer)`.
pub fn tanimoto(a: &SparseFingerprint, b: &SparseFingerprint) -> Result<f64> {
    let p = vect_params(a, b)?;
    let denom = p.sum_a + p.sum_b - p.numer;
    if denom.abs() < DENOM_EPSILON {
        return Ok(0.0);
    }
    Ok(p.numer / denom)
}

/// `2 * numer / (sumA + sumB)`.
pub fn dice(a: &SparseFingerprint, b: &SparseFingerprint) -> Result<f64> {
    let p = vect_params(a, b)?;
    let denom = p.sum_a + p.sum_b;
    if denom.abs() < DENOM_EPSILON {
        return Ok(0.0);
    }
    Ok(2.0 * p.numer / denom)
}

fn parse_pair<'a>(a: &'a [u8], b: &'a [u8]) -> Result<(WireView<'a>, WireView<'a>)> {
    let va = WireView::parse(a, Operand::First).map_err(|e| {
        debug!(error = %e, "rejected first sparse operand");
        e
    })?;
    let vb = WireView::parse(b, Operand::Second).map_err(|e| {
        debug!(error = %e, "rejected second sparse operand");
        e
    })?;
    if va.width() != vb.width() {
        return Err(FingerprintError::Format {
            operand: Operand::Second,
            field: HeaderField::Width,
            expected: va.width(),
            found: vb.width(),
        });
    }
    Ok((va, vb))
}

/// Tracks the last key of one stream to enforce strict ascent.
struct Ascent {
    operand: Operand,
    last: Option<u32>,
}

impl Ascent {
    fn new(operand: Operand) -> Self {
        Self {
            operand,
            last: None,
        }
    }

    #[inline]
    fn check(&mut self, key: u32) -> Result<()> {
        if let Some(prev) = self.last {
            if key <= prev {
                return Err(FingerprintError::Format {
                    operand: self.operand,
                    field: HeaderField::Key,
                    expected: prev.saturating_add(1),
                    found: key,
                });
            }
        }
        self.last = Some(key);
        Ok(())
    }
}

/// Dice similarity of two sparse wire buffers, computed in one merge-join
/// pass with constant extra space.
///
/// Both key streams must be strictly ascending and the declared widths must
/// agree.
pub fn streaming_dice(a: &[u8], b: &[u8]) -> Result<f64> {
    let (va, vb) = parse_pair(a, b)?;
    let mut ia = va.entries();
    let mut ib = vb.entries();
    let mut asc_a = Ascent::new(Operand::First);
    let mut asc_b = Ascent::new(Operand::Second);

    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    let mut numer = 0.0;

    let mut cur_a = ia.next();
    let mut cur_b = ib.next();

    loop {
        match (cur_a, cur_b) {
            (Some((ka, xa)), Some((kb, xb))) => match ka.cmp(&kb) {
                Ordering::Less => {
                    asc_a.check(ka)?;
                    sum_a += xa as f64;
                    cur_a = ia.next();
                }
                Ordering::Greater => {
                    asc_b.check(kb)?;
                    sum_b += xb as f64;
                    cur_b = ib.next();
                }
                Ordering::Equal => {
                    asc_a.check(ka)?;
                    asc_b.check(kb)?;
                    numer += xa.min(xb) as f64;
                    sum_a += xa as f64;
                    sum_b += xb as f64;
                    cur_a = ia.next();
                    cur_b = ib.next();
                }
            },
            (Some((ka, xa)), None) => {
                asc_a.check(ka)?;
                sum_a += xa as f64;
                cur_a = ia.next();
            }
            (None, Some((kb, xb))) => {
                asc_b.check(kb)?;
                sum_b += xb as f64;
                cur_b = ib.next();
            }
            (None, None) => break,
        }
    }

    let denom = sum_a + sum_b;
    if denom.abs() < DENOM_EPSILON {
        return Ok(0.0);
    }
    Ok(2.0 * numer / denom)
}

fn all_values(buf: &[u8], pred: impl Fn(i32) -> bool) -> Result<bool> {
    let view = WireView::parse(buf, Operand::First)?;
    Ok(view.entries().all(|(_, v)| pred(v)))
}

/// True when every value in the buffer is strictly greater than `threshold`.
/// An empty buffer is vacuously true.
pub fn all_values_above(buf: &[u8], threshold: i32) -> Result<bool> {
    all_values(buf, |v| v > threshold)
}

/// True when every value in the buffer is strictly less than `threshold`.
/// An empty buffer is vacuously true.
pub fn all_values_below(buf: &[u8], threshold: i32) -> Result<bool> {
    all_values(buf, |v| v < threshold)
}
