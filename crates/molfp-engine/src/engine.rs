//! The seam to the chemistry toolkit that actually perceives molecules.

use crate::algorithm::{BitmapAlgorithm, SparseAlgorithm};

/// A chemistry toolkit capable of fingerprinting its own molecule type.
///
/// Implementations report failure through `Err`. `Ok(None)` means the
/// toolkit produced nothing for this molecule; it is passed through as an
/// empty result rather than treated as an error.
pub trait ChemistryEngine {
    type Molecule;

    /// Raw bitmap bytes, bit `i` at byte `i / 8`, mask `1 << (i % 8)`.
    /// Must be exactly `ceil(width / 8)` bytes long.
    fn bitmap(
        &self,
        mol: &Self::Molecule,
        algorithm: &BitmapAlgorithm,
        width: usize,
    ) -> anyhow::Result<Option<Vec<u8>>>;

    /// Nonzero `(key, count)` pairs. For hashed algorithms keys must lie in
    /// `0..width`; for Morgan `width` is `u32::MAX`.
    fn sparse(
        &self,
        mol: &Self::Molecule,
        algorithm: &SparseAlgorithm,
        width: u32,
    ) -> anyhow::Result<Option<Vec<(u32, i64)>>>;
}

impl<E: ChemistryEngine + ?Sized> ChemistryEngine for &E {
    type Molecule = E::Molecule;

    fn bitmap(
        &self,
        mol: &Self::Molecule,
        algorithm: &BitmapAlgorithm,
        width: usize,
    ) -> anyhow::Result<Option<Vec<u8>>> {
        (**self).bitmap(mol, algorithm, width)
    }

    fn sparse(
        &self,
        mol: &Self::Molecule,
        algorithm: &SparseAlgorithm,
        width: u32,
    ) -> anyhow::Result<Option<Vec<(u32, i64)>>> {
        (**self).sparse(mol, algorithm, width)
    }
}
