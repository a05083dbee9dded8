//! Tagged fingerprint values.

use crate::{BitmapFingerprint, ByteA, FingerprintError, Result, SparseFingerprint};
use serde::{Deserialize, Serialize};

/// Which representation a fingerprint uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintKind {
    Bitmap,
    Sparse,
}

/// A fingerprint of either kind.
///
/// Stored buffers carry no kind tag, so decoding always names the kind
/// explicitly and the two representations are never confused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Fingerprint {
    Bitmap(BitmapFingerprint),
    Sparse(SparseFingerprint),
}

impl Fingerprint {
    pub fn kind(&self) -> FingerprintKind {
        match self {
            Fingerprint::Bitmap(_) => FingerprintKind::Bitmap,
            Fingerprint::Sparse(_) => FingerprintKind::Sparse,
        }
    }

    /// Decode a stored length-prefixed buffer of the given kind.
    pub fn from_varlena(kind: FingerprintKind, buf: &[u8]) -> Result<Self> {
        match kind {
            FingerprintKind::Bitmap => {
                BitmapFingerprint::from_varlena(buf).map(Fingerprint::Bitmap)
            }
            FingerprintKind::Sparse => {
                SparseFingerprint::from_varlena(buf).map(Fingerprint::Sparse)
            }
        }
    }

    /// Encode to the stored length-prefixed form.
    pub fn to_varlena(&self) -> bytes::Bytes {
        match self {
            Fingerprint::Bitmap(fp) => fp.to_varlena(),
            Fingerprint::Sparse(fp) => fp.to_varlena(),
        }
    }

    /// Payload without the length prefix.
    pub fn to_bytea(&self) -> ByteA {
        match self {
            Fingerprint::Bitmap(fp) => fp.to_bytea(),
            Fingerprint::Sparse(fp) => fp.to_bytea(),
        }
    }

    pub fn as_bitmap(&self) -> Option<&BitmapFingerprint> {
        match self {
            Fingerprint::Bitmap(fp) => Some(fp),
            Fingerprint::Sparse(_) => None,
        }
    }

    pub fn as_sparse(&self) -> Option<&SparseFingerprint> {
        match self {
            Fingerprint::Sparse(fp) => Some(fp),
            Fingerprint::Bitmap(_) => None,
        }
    }

    /// Tanimoto similarity between two fingerprints of the same kind.
    pub fn tanimoto(&self, other: &Self) -> Result<f64> {
        match (self, other) {
            (Fingerprint::Bitmap(a), Fingerprint::Bitmap(b)) => a.tanimoto(b),
            (Fingerprint::Sparse(a), Fingerprint::Sparse(b)) => a.tanimoto(b),
            _ => Err(kind_mismatch(self, other)),
        }
    }

    /// Dice similarity between two fingerprints of the same kind.
    pub fn dice(&self, other: &Self) -> Result<f64> {
        match (self, other) {
            (Fingerprint::Bitmap(a), Fingerprint::Bitmap(b)) => a.dice(b),
            (Fingerprint::Sparse(a), Fingerprint::Sparse(b)) => a.dice(b),
            _ => Err(kind_mismatch(self, other)),
        }
    }
}

fn kind_mismatch(a: &Fingerprint, b: &Fingerprint) -> FingerprintError {
    FingerprintError::Comparison(format!(
        "cannot compare {:?} fingerprint with {:?} fingerprint",
        a.kind(),
        b.kind()
    ))
}

impl From<BitmapFingerprint> for Fingerprint {
    fn from(fp: BitmapFingerprint) -> Self {
        Fingerprint::Bitmap(fp)
    }
}

impl From<SparseFingerprint> for Fingerprint {
    fn from(fp: SparseFingerprint) -> Self {
        Fingerprint::Sparse(fp)
    }
}

impl TryFrom<Fingerprint> for BitmapFingerprint {
    type Error = FingerprintError;

    fn try_from(fp: Fingerprint) -> Result<Self> {
        match fp {
            Fingerprint::Bitmap(b) => Ok(b),
            Fingerprint::Sparse(_) => Err(FingerprintError::Comparison(
                "expected a bitmap fingerprint, found a sparse one".to_string(),
            )),
        }
    }
}

impl TryFrom<Fingerprint> for SparseFingerprint {
    type Error = FingerprintError;

    fn try_from(fp: Fingerprint) -> Result<Self> {
        match fp {
            Fingerprint::Sparse(s) => Ok(s),
            Fingerprint::Bitmap(_) => Err(FingerprintError::Comparison(
                "expected a sparse fingerprint, found a bitmap".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        let bm: Fingerprint = BitmapFingerprint::from_bytes(vec![1, 2]).into();
        let sp: Fingerprint = SparseFingerprint::from_entries(8, [(1, 1)]).unwrap().into();

        for fp in [bm, sp] {
            let stored = fp.to_varlena();
            let back = Fingerprint::from_varlena(fp.kind(), &stored).unwrap();
            assert_eq!(back, fp);
        }
    }

    #[test]
    fn test_mixed_kinds_refused() {
        let bm: Fingerprint = BitmapFingerprint::from_bytes(vec![1]).into();
        let sp: Fingerprint = SparseFingerprint::new(8).into();
        assert!(matches!(bm.dice(&sp), Err(FingerprintError::Comparison(_))));
        assert!(sp.tanimoto(&bm).is_err());
        assert!(BitmapFingerprint::try_from(sp).is_err());
        assert!(SparseFingerprint::try_from(bm).is_err());
    }

    #[test]
    fn test_accessors() {
        let bm: Fingerprint = BitmapFingerprint::from_bytes(vec![1]).into();
        assert_eq!(bm.kind(), FingerprintKind::Bitmap);
        assert!(bm.as_bitmap().is_some());
        assert!(bm.as_sparse().is_none());
    }
}
