//! Fingerprint generation on top of a [`ChemistryEngine`].
//!
//! The generator picks the configured width for each algorithm, checks what
//! the engine hands back, and converts it into the core fingerprint types.
//! Engine failures become [`FingerprintError::Generation`], or a warning and
//! an empty result when soft failures are enabled.

use crate::algorithm::{Algorithm, BitmapAlgorithm, Invariants, SparseAlgorithm};
use crate::config::GeneratorConfig;
use crate::engine::ChemistryEngine;
use molfp_core::bitmap::bytes_for_bits;
use molfp_core::{
    BitmapFingerprint, Fingerprint, FingerprintError, Result, SparseFingerprint, MACCS_FP_SIZE,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Width of unfolded Morgan count vectors.
pub const MORGAN_SPARSE_WIDTH: u32 = u32::MAX;

fn generation_error(algorithm: impl ToString, reason: impl ToString) -> FingerprintError {
    FingerprintError::Generation {
        algorithm: algorithm.to_string(),
        reason: reason.to_string(),
    }
}

/// Produces bitmap and sparse fingerprints for molecules of engine `E`.
pub struct FingerprintGenerator<E> {
    engine: E,
    config: GeneratorConfig,
}

impl<E: ChemistryEngine> FingerprintGenerator<E> {
    pub fn new(engine: E, config: GeneratorConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Bitmap width used for `algorithm`.
    pub fn bitmap_width(&self, algorithm: &BitmapAlgorithm) -> usize {
        match algorithm {
            BitmapAlgorithm::Pattern => self.config.sss_bits,
            BitmapAlgorithm::Layered { .. } | BitmapAlgorithm::Rdkit { .. } => {
                self.config.layered_bits
            }
            BitmapAlgorithm::Morgan { .. } => self.config.morgan_bits,
            BitmapAlgorithm::AtomPair => self.config.pair_bits,
            BitmapAlgorithm::TopologicalTorsion => self.config.torsion_bits,
            BitmapAlgorithm::Maccs => MACCS_FP_SIZE,
        }
    }

    /// Sparse width used for `algorithm`.
    pub fn sparse_width(&self, algorithm: &SparseAlgorithm) -> Result<u32> {
        let width = match algorithm {
            SparseAlgorithm::Morgan { .. } => return Ok(MORGAN_SPARSE_WIDTH),
            SparseAlgorithm::AtomPair => self.config.pair_bits,
            SparseAlgorithm::TopologicalTorsion => self.config.torsion_bits,
        };
        u32::try_from(width)
            .map_err(|_| generation_error(algorithm, format!("width {width} exceeds u32")))
    }

    /// Generate a bitmap fingerprint with any bitmap algorithm.
    pub fn bitmap(
        &self,
        mol: &E::Molecule,
        algorithm: &BitmapAlgorithm,
    ) -> Result<Option<BitmapFingerprint>> {
        let result = self.try_bitmap(mol, algorithm);
        self.soften(algorithm, result)
    }

    /// Generate a sparse fingerprint with any sparse algorithm.
    pub fn sparse(
        &self,
        mol: &E::Molecule,
        algorithm: &SparseAlgorithm,
    ) -> Result<Option<SparseFingerprint>> {
        let result = self.try_sparse(mol, algorithm);
        self.soften(algorithm, result)
    }

    /// Generate either kind, tagged.
    pub fn generate(&self, mol: &E::Molecule, algorithm: Algorithm) -> Result<Option<Fingerprint>> {
        Ok(match algorithm {
            Algorithm::Bitmap(a) => self.bitmap(mol, &a)?.map(Fingerprint::from),
            Algorithm::Sparse(a) => self.sparse(mol, &a)?.map(Fingerprint::from),
        })
    }

    /// Substructure-screening signature.
    pub fn signature(&self, mol: &E::Molecule) -> Result<Option<BitmapFingerprint>> {
        self.bitmap(mol, &BitmapAlgorithm::Pattern)
    }

    pub fn layered(&self, mol: &E::Molecule) -> Result<Option<BitmapFingerprint>> {
        self.bitmap(mol, &BitmapAlgorithm::layered())
    }

    pub fn rdkit(&self, mol: &E::Molecule) -> Result<Option<BitmapFingerprint>> {
        self.bitmap(mol, &BitmapAlgorithm::rdkit())
    }

    /// Morgan bitmap. `None` uses the configured radius.
    pub fn morgan_bitmap(
        &self,
        mol: &E::Molecule,
        radius: Option<u32>,
    ) -> Result<Option<BitmapFingerprint>> {
        let algorithm = BitmapAlgorithm::morgan(self.radius(radius), Invariants::Connectivity);
        self.bitmap(mol, &algorithm)
    }

    pub fn feat_morgan_bitmap(
        &self,
        mol: &E::Molecule,
        radius: Option<u32>,
    ) -> Result<Option<BitmapFingerprint>> {
        let algorithm = BitmapAlgorithm::morgan(self.radius(radius), Invariants::Feature);
        self.bitmap(mol, &algorithm)
    }

    /// Unfolded Morgan counts. `None` uses the configured radius.
    pub fn morgan_sparse(
        &self,
        mol: &E::Molecule,
        radius: Option<u32>,
    ) -> Result<Option<SparseFingerprint>> {
        let algorithm = SparseAlgorithm::Morgan {
            radius: self.radius(radius),
            invariants: Invariants::Connectivity,
        };
        self.sparse(mol, &algorithm)
    }

    pub fn feat_morgan_sparse(
        &self,
        mol: &E::Molecule,
        radius: Option<u32>,
    ) -> Result<Option<SparseFingerprint>> {
        let algorithm = SparseAlgorithm::Morgan {
            radius: self.radius(radius),
            invariants: Invariants::Feature,
        };
        self.sparse(mol, &algorithm)
    }

    pub fn atom_pair_bitmap(&self, mol: &E::Molecule) -> Result<Option<BitmapFingerprint>> {
        self.bitmap(mol, &BitmapAlgorithm::AtomPair)
    }

    pub fn atom_pair_sparse(&self, mol: &E::Molecule) -> Result<Option<SparseFingerprint>> {
        self.sparse(mol, &SparseAlgorithm::AtomPair)
    }

    pub fn torsion_bitmap(&self, mol: &E::Molecule) -> Result<Option<BitmapFingerprint>> {
        self.bitmap(mol, &BitmapAlgorithm::TopologicalTorsion)
    }

    pub fn torsion_sparse(&self, mol: &E::Molecule) -> Result<Option<SparseFingerprint>> {
        self.sparse(mol, &SparseAlgorithm::TopologicalTorsion)
    }

    pub fn maccs(&self, mol: &E::Molecule) -> Result<Option<BitmapFingerprint>> {
        self.bitmap(mol, &BitmapAlgorithm::Maccs)
    }

    fn radius(&self, radius: Option<u32>) -> u32 {
        radius.unwrap_or(self.config.morgan_radius)
    }

    fn try_bitmap(
        &self,
        mol: &E::Molecule,
        algorithm: &BitmapAlgorithm,
    ) -> Result<Option<BitmapFingerprint>> {
        let width = self.bitmap_width(algorithm);
        let Some(bytes) = self
            .engine
            .bitmap(mol, algorithm, width)
            .map_err(|e| generation_error(algorithm, format!("{e:#}")))?
        else {
            return Ok(None);
        };

        let expected = bytes_for_bits(width);
        if bytes.len() != expected {
            return Err(generation_error(
                algorithm,
                format!("expected {expected} bytes for {width} bits, got {}", bytes.len()),
            ));
        }

        let fp = BitmapFingerprint::from_bytes(bytes);
        debug!(
            algorithm = %algorithm,
            width,
            popcount = fp.popcount(),
            "Generated bitmap fingerprint"
        );
        Ok(Some(fp))
    }

    fn try_sparse(
        &self,
        mol: &E::Molecule,
        algorithm: &SparseAlgorithm,
    ) -> Result<Option<SparseFingerprint>> {
        let width = self.sparse_width(algorithm)?;
        let Some(counts) = self
            .engine
            .sparse(mol, algorithm, width)
            .map_err(|e| generation_error(algorithm, format!("{e:#}")))?
        else {
            return Ok(None);
        };

        // repeated keys accumulate
        let mut merged: BTreeMap<u32, i64> = BTreeMap::new();
        for (key, count) in counts {
            if key >= width {
                return Err(generation_error(
                    algorithm,
                    format!("key {key} outside width {width}"),
                ));
            }
            let slot = merged.entry(key).or_insert(0);
            *slot = slot.checked_add(count).ok_or_else(|| {
                generation_error(algorithm, format!("count overflow at key {key}"))
            })?;
        }

        let mut fp = SparseFingerprint::new(width);
        for (key, count) in merged {
            let value = i32::try_from(count).map_err(|_| {
                generation_error(algorithm, format!("count {count} at key {key} exceeds i32"))
            })?;
            fp.set(key, value)?;
        }

        debug!(
            algorithm = %algorithm,
            width,
            elements = fp.len(),
            "Generated sparse fingerprint"
        );
        Ok(Some(fp))
    }

    fn soften<T>(
        &self,
        algorithm: &dyn std::fmt::Display,
        result: Result<Option<T>>,
    ) -> Result<Option<T>> {
        match result {
            Err(e) if self.config.soft_failures => {
                warn!(algorithm = %algorithm, error = %e, "Fingerprint generation failed");
                Ok(None)
            }
            other => other,
        }
    }
}
