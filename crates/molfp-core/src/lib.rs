//! # molfp-core
//!
//! Binary molecular fingerprints and the similarity arithmetic that runs
//! directly over their encodings.
//!
//! Features:
//! - Bitmap fingerprints stored as raw bit bytes inside a length-prefixed buffer
//! - Sparse `u32 -> i32` fingerprints with a self-describing little-endian wire format
//! - Tanimoto, Dice and Tversky over bitmaps using word-at-a-time popcount
//! - Streaming Dice over two sparse wire buffers without allocating
//! - Folding of sparse keys into bitmap signatures and `(low, high)` range summaries
//! - Overlap accounting against those summaries

pub mod bitmap;
pub mod bytea;
pub mod error;
pub mod fingerprint;
pub mod overlap;
pub mod range;
pub mod similarity;
pub mod sparse;
pub mod wire;

pub use bitmap::BitmapFingerprint;
pub use bytea::ByteA;
pub use error::*;
pub use fingerprint::{Fingerprint, FingerprintKind};
pub use overlap::{count_overlap, count_range_overlap, OverlapCounts, RangeOverlap};
pub use range::{IntRange, RangeArray, INT_RANGE_MAX};
pub use similarity::sparse::{all_values_above, all_values_below, streaming_dice};
pub use similarity::{rank_bitmaps, rank_sparse, BitmapMetric, SparseMetric};
pub use sparse::SparseFingerprint;

/// Convenience alias for results carrying a [`FingerprintError`].
pub type Result<T> = std::result::Result<T, FingerprintError>;

/// Width of the substructure-screening pattern fingerprint.
pub const SSS_FP_SIZE: usize = 2048;

/// Width of layered and RDKit path fingerprints.
pub const LAYERED_FP_SIZE: usize = 1024;

/// Width of Morgan bitmap fingerprints.
pub const MORGAN_FP_SIZE: usize = 512;

/// Width of hashed topological-torsion fingerprints.
pub const HASHED_TORSION_FP_SIZE: usize = 1024;

/// Width of hashed atom-pair fingerprints.
pub const HASHED_PAIR_FP_SIZE: usize = 2048;

/// Width of MACCS structural-key fingerprints.
pub const MACCS_FP_SIZE: usize = 167;
