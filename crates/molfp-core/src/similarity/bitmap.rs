//! Popcount similarity over raw bitmap buffers.
//!
//! The word path reads 4 bytes at a time as `u32` and finishes the trailing
//! `len % 4` bytes individually, so it always agrees with the bytewise path.

use crate::{FingerprintError, Result};

/// How population counts are gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopcountPath {
    /// One byte at a time.
    Bytewise,
    /// Four bytes at a time, then the trailing bytes.
    #[default]
    Word,
}

/// Bit counts gathered in a single pass over two equal-length buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairCounts {
    pub a: u32,
    pub b: u32,
    pub intersection: u32,
    pub union: u32,
}

const WORD: usize = std::mem::size_of::<u32>();

#[inline]
fn word(chunk: &[u8]) -> u32 {
    let mut arr = [0u8; WORD];
    arr.copy_from_slice(chunk);
    u32::from_le_bytes(arr)
}

/// Number of set bits in a buffer.
#[inline]
pub fn popcount(bytes: &[u8]) -> u32 {
    let chunks = bytes.chunks_exact(WORD);
    let tail: u32 = chunks.remainder().iter().map(|b| b.count_ones()).sum();
    chunks.map(|c| word(c).count_ones()).sum::<u32>() + tail
}

fn check_lengths(a: &[u8], b: &[u8]) -> Result<()> {
    if a.len() != b.len() {
        return Err(FingerprintError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Gather pair counts along the chosen path.
pub fn pair_counts(a: &[u8], b: &[u8], path: PopcountPath) -> Result<PairCounts> {
    check_lengths(a, b)?;
    let mut counts = PairCounts::default();

    let mut accumulate = |x: u32, y: u32| {
        counts.a += x.count_ones();
        counts.b += y.count_ones();
        counts.intersection += (x & y).count_ones();
        counts.union += (x | y).count_ones();
    };

    match path {
        PopcountPath::Bytewise => {
            for (x, y) in a.iter().zip(b) {
                accumulate(*x as u32, *y as u32);
            }
        }
        PopcountPath::Word => {
            let ca = a.chunks_exact(WORD);
            let cb = b.chunks_exact(WORD);
            let (ta, tb) = (ca.remainder(), cb.remainder());
            for (x, y) in ca.zip(cb) {
                accumulate(word(x), word(y));
            }
            for (x, y) in ta.iter().zip(tb) {
                accumulate(*x as u32, *y as u32);
            }
        }
    }

    Ok(counts)
}

/// `|A & B| / |A | B|`, or 0.0 when both are empty.
pub fn tanimoto(a: &[u8], b: &[u8]) -> Result<f64> {
    let c = pair_counts(a, b, PopcountPath::Word)?;
    if c.union == 0 {
        return Ok(0.0);
    }
    Ok(c.intersection as f64 / c.union as f64)
}

/// `2 |A & B| / (|A| + |B|)`, or 0.0 when both are empty.
pub fn dice(a: &[u8], b: &[u8]) -> Result<f64> {
    let c = pair_counts(a, b, PopcountPath::Word)?;
    let denom = c.a + c.b;
    if denom == 0 {
        return Ok(0.0);
    }
    Ok(2.0 * c.intersection as f64 / denom as f64)
}

/// Tversky similarity with weight `alpha` on `a` and `beta` on `b`.
///
/// `alpha = beta = 1` gives Tanimoto, `alpha = beta = 0.5` gives Dice.
pub fn tversky(a: &[u8], b: &[u8], alpha: f64, beta: f64) -> Result<f64> {
    let c = pair_counts(a, b, PopcountPath::Word)?;
    let both = c.intersection as f64;
    let denom = alpha * c.a as f64 + beta * c.b as f64 + (1.0 - alpha - beta) * both;
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(both / denom)
}
