//! Fingerprint algorithm descriptors handed to a [`ChemistryEngine`](crate::ChemistryEngine).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Atom invariants used to seed circular (Morgan) fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Invariants {
    #[default]
    Connectivity,
    Feature,
}

/// Algorithms that produce a fixed-width bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BitmapAlgorithm {
    /// Substructure-screening pattern fingerprint.
    Pattern,
    Layered {
        min_path: u32,
        max_path: u32,
        layer_flags: u32,
    },
    Rdkit {
        min_path: u32,
        max_path: u32,
        bits_per_hash: u32,
    },
    Morgan {
        radius: u32,
        invariants: Invariants,
    },
    AtomPair,
    TopologicalTorsion,
    /// 166 public MACCS keys plus the unused bit 0.
    Maccs,
}

impl BitmapAlgorithm {
    /// Layered fingerprint over paths of length 1..=7 with every layer enabled.
    pub const fn layered() -> Self {
        Self::Layered {
            min_path: 1,
            max_path: 7,
            layer_flags: 0xFFFF_FFFF,
        }
    }

    /// RDKit path fingerprint over paths of length 1..=6, two bits per hash.
    pub const fn rdkit() -> Self {
        Self::Rdkit {
            min_path: 1,
            max_path: 6,
            bits_per_hash: 2,
        }
    }

    pub const fn morgan(radius: u32, invariants: Invariants) -> Self {
        Self::Morgan { radius, invariants }
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Layered { .. } => "layered",
            Self::Rdkit { .. } => "rdkit",
            Self::Morgan {
                invariants: Invariants::Connectivity,
                ..
            } => "morgan",
            Self::Morgan {
                invariants: Invariants::Feature,
                ..
            } => "featmorgan",
            Self::AtomPair => "atompair",
            Self::TopologicalTorsion => "torsion",
            Self::Maccs => "maccs",
        }
    }
}

impl fmt::Display for BitmapAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layered {
                min_path, max_path, ..
            }
            | Self::Rdkit {
                min_path, max_path, ..
            } => write!(f, "{}[{}..{}]", self.name(), min_path, max_path),
            Self::Morgan { radius, .. } => write!(f, "{}[r={}]", self.name(), radius),
            _ => f.write_str(self.name()),
        }
    }
}

/// Algorithms that produce a sparse count vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SparseAlgorithm {
    Morgan { radius: u32, invariants: Invariants },
    AtomPair,
    TopologicalTorsion,
}

impl SparseAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Morgan {
                invariants: Invariants::Connectivity,
                ..
            } => "morgan",
            Self::Morgan {
                invariants: Invariants::Feature,
                ..
            } => "featmorgan",
            Self::AtomPair => "atompair",
            Self::TopologicalTorsion => "torsion",
        }
    }
}

impl fmt::Display for SparseAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morgan { radius, .. } => write!(f, "{}[r={}]", self.name(), radius),
            _ => f.write_str(self.name()),
        }
    }
}

/// Either kind of algorithm.
///
/// Accepted by [`FingerprintGenerator::generate`](crate::FingerprintGenerator::generate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "algorithm", rename_all = "lowercase")]
pub enum Algorithm {
    Bitmap(BitmapAlgorithm),
    Sparse(SparseAlgorithm),
}

impl From<BitmapAlgorithm> for Algorithm {
    fn from(a: BitmapAlgorithm) -> Self {
        Algorithm::Bitmap(a)
    }
}

impl From<SparseAlgorithm> for Algorithm {
    fn from(a: SparseAlgorithm) -> Self {
        Algorithm::Sparse(a)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Bitmap(a) => a.fmt(f),
            Algorithm::Sparse(a) => a.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            BitmapAlgorithm::layered(),
            BitmapAlgorithm::Layered {
                min_path: 1,
                max_path: 7,
                layer_flags: u32::MAX
            }
        );
        assert_eq!(BitmapAlgorithm::rdkit().to_string(), "rdkit[1..6]");
        assert_eq!(Invariants::default(), Invariants::Connectivity);
    }

    #[test]
    fn test_names() {
        assert_eq!(
            BitmapAlgorithm::morgan(2, Invariants::Feature).to_string(),
            "featmorgan[r=2]"
        );
        assert_eq!(BitmapAlgorithm::Maccs.to_string(), "maccs");
        assert_eq!(SparseAlgorithm::AtomPair.to_string(), "atompair");
    }

    #[test]
    fn test_serialization() {
        let alg = Algorithm::from(BitmapAlgorithm::morgan(3, Invariants::Connectivity));
        let json = serde_json::to_string(&alg).unwrap();
        let back: Algorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alg);

        let json = r#"{"kind":"sparse","algorithm":{"type":"atom_pair"}}"#;
        let alg: Algorithm = serde_json::from_str(json).unwrap();
        assert_eq!(alg, Algorithm::Sparse(SparseAlgorithm::AtomPair));
    }
}
