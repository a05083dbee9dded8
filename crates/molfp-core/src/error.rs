//! Error types for fingerprint codecs and comparisons.

use std::fmt;
use thiserror::Error;

/// Which side of a two-operand comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::First => f.write_str("argument 1"),
            Operand::Second => f.write_str("argument 2"),
        }
    }
}

/// Field of the sparse wire header (or body) that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Version,
    ElementSize,
    Width,
    Key,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderField::Version => "format version",
            HeaderField::ElementSize => "element size",
            HeaderField::Width => "declared width",
            HeaderField::Key => "key order",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building, decoding or comparing fingerprints.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FingerprintError {
    #[error("Decode error in {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("Format error in {operand}: {field} expected {expected}, found {found}")]
    Format {
        operand: Operand,
        field: HeaderField,
        expected: u32,
        found: u32,
    },

    #[error("Generation error in {algorithm}: {reason}")]
    Generation { algorithm: String, reason: String },

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Length mismatch: {left} bytes vs {right} bytes")]
    LengthMismatch { left: usize, right: usize },

    #[error("Comparison error: {0}")]
    Comparison(String),

    #[error("Key {key} out of range for width {width}")]
    KeyOutOfRange { key: u32, width: u32 },

    #[error("Invalid width: {0} must be nonzero")]
    InvalidWidth(&'static str),
}

impl FingerprintError {
    pub(crate) fn decode(what: &'static str, reason: impl Into<String>) -> Self {
        FingerprintError::Decode {
            what,
            reason: reason.into(),
        }
    }
}
