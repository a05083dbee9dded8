//! Similarity metrics and one-to-many ranking.

pub mod bitmap;
pub mod sparse;

use crate::{BitmapFingerprint, Result, SparseFingerprint};
use rayon::prelude::*;

/// Bitmap metric selector for ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BitmapMetric {
    Tanimoto,
    Dice,
    Tversky { alpha: f64, beta: f64 },
}

impl BitmapMetric {
    pub fn score(&self, a: &[u8], b: &[u8]) -> Result<f64> {
        match *self {
            BitmapMetric::Tanimoto => bitmap::tanimoto(a, b),
            BitmapMetric::Dice => bitmap::dice(a, b),
            BitmapMetric::Tversky { alpha, beta } => bitmap::tversky(a, b, alpha, beta),
        }
    }
}

/// Sparse metric selector for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparseMetric {
    Tanimoto,
    Dice,
}

impl SparseMetric {
    pub fn score(&self, a: &SparseFingerprint, b: &SparseFingerprint) -> Result<f64> {
        match self {
            SparseMetric::Tanimoto => sparse::tanimoto(a, b),
            SparseMetric::Dice => sparse::dice(a, b),
        }
    }
}

fn top_k(mut scored: Vec<(usize, f64)>, threshold: f64, k: usize) -> Vec<(usize, f64)> {
    scored.retain(|(_, s)| *s >= threshold);
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}

/// Score `query` against every candidate in parallel and return the best
/// `k` indices with a score of at least `threshold`, best first.
pub fn rank_bitmaps(
    query: &BitmapFingerprint,
    candidates: &[BitmapFingerprint],
    metric: BitmapMetric,
    threshold: f64,
    k: usize,
) -> Result<Vec<(usize, f64)>> {
    let scored = candidates
        .par_iter()
        .enumerate()
        .map(|(i, c)| metric.score(query.as_bytes(), c.as_bytes()).map(|s| (i, s)))
        .collect::<Result<Vec<_>>>()?;
    Ok(top_k(scored, threshold, k))
}

/// Sparse counterpart of [`rank_bitmaps`].
pub fn rank_sparse(
    query: &SparseFingerprint,
    candidates: &[SparseFingerprint],
    metric: SparseMetric,
    threshold: f64,
    k: usize,
) -> Result<Vec<(usize, f64)>> {
    let scored = candidates
        .par_iter()
        .enumerate()
        .map(|(i, c)| metric.score(query, c).map(|s| (i, s)))
        .collect::<Result<Vec<_>>>()?;
    Ok(top_k(scored, threshold, k))
}
