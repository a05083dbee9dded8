//! # molfp-engine
//!
//! Fingerprint generation against a pluggable chemistry toolkit.
//!
//! The toolkit sits behind [`ChemistryEngine`]; [`FingerprintGenerator`]
//! supplies widths from [`GeneratorConfig`], validates the toolkit's output
//! and returns `molfp-core` fingerprints.

pub mod algorithm;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;

pub use algorithm::{Algorithm, BitmapAlgorithm, Invariants, SparseAlgorithm};
pub use config::GeneratorConfig;
pub use engine::ChemistryEngine;
pub use error::ConfigError;
pub use generator::{FingerprintGenerator, MORGAN_SPARSE_WIDTH};
