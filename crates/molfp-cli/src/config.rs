//! Configuration module - Environment-based configuration

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Bitmap width for `fold`
    pub fold_bits: usize,
    /// Bucket count for `range`
    pub range_ints: usize,
    pub tversky_alpha: f64,
    pub tversky_beta: f64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            fold_bits: molfp_core::SSS_FP_SIZE,
            range_ints: 64,
            tversky_alpha: 1.0,
            tversky_beta: 1.0,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unparsable values fall back to their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            log_level: lookup("MOLFP_LOG").unwrap_or(d.log_level),
            fold_bits: lookup("MOLFP_FOLD_BITS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.fold_bits),
            range_ints: lookup("MOLFP_RANGE_INTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.range_ints),
            tversky_alpha: lookup("MOLFP_TVERSKY_ALPHA")
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.tversky_alpha),
            tversky_beta: lookup("MOLFP_TVERSKY_BETA")
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.tversky_beta),
        }
    }
}
