//! Generator configuration.
//!
//! Loaded from environment variables, falling back to the standard widths
//! when a variable is absent. Can also be read from JSON.

use crate::ConfigError;
use molfp_core::{
    HASHED_PAIR_FP_SIZE, HASHED_TORSION_FP_SIZE, LAYERED_FP_SIZE, MORGAN_FP_SIZE, SSS_FP_SIZE,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Default Morgan radius.
pub const DEFAULT_MORGAN_RADIUS: u32 = 2;

/// Widths and behaviour used by [`FingerprintGenerator`](crate::FingerprintGenerator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Substructure-screening signature width.
    pub sss_bits: usize,
    /// Layered and RDKit path fingerprint width.
    pub layered_bits: usize,
    /// Morgan bitmap width.
    pub morgan_bits: usize,
    /// Hashed topological-torsion width (bitmap and sparse).
    pub torsion_bits: usize,
    /// Hashed atom-pair width (bitmap and sparse).
    pub pair_bits: usize,
    pub morgan_radius: u32,
    /// Turn generation failures into warnings and empty results.
    pub soft_failures: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sss_bits: SSS_FP_SIZE,
            layered_bits: LAYERED_FP_SIZE,
            morgan_bits: MORGAN_FP_SIZE,
            torsion_bits: HASHED_TORSION_FP_SIZE,
            pair_bits: HASHED_PAIR_FP_SIZE,
            morgan_radius: DEFAULT_MORGAN_RADIUS,
            soft_failures: false,
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = Self::default();
        let config = Self {
            sss_bits: parse_or(&lookup, "MOLFP_SSS_BITS", d.sss_bits)?,
            layered_bits: parse_or(&lookup, "MOLFP_LAYERED_BITS", d.layered_bits)?,
            morgan_bits: parse_or(&lookup, "MOLFP_MORGAN_BITS", d.morgan_bits)?,
            torsion_bits: parse_or(&lookup, "MOLFP_TORSION_BITS", d.torsion_bits)?,
            pair_bits: parse_or(&lookup, "MOLFP_PAIR_BITS", d.pair_bits)?,
            morgan_radius: parse_or(&lookup, "MOLFP_MORGAN_RADIUS", d.morgan_radius)?,
            soft_failures: parse_or(&lookup, "MOLFP_SOFT_FAILURES", d.soft_failures)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero widths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let widths = [
            ("sss_bits", self.sss_bits),
            ("layered_bits", self.layered_bits),
            ("morgan_bits", self.morgan_bits),
            ("torsion_bits", self.torsion_bits),
            ("pair_bits", self.pair_bits),
        ];
        for (key, value) in widths {
            if value == 0 {
                return Err(ConfigError::ZeroWidth { key });
            }
        }
        // sparse widths are u32 on the wire
        for (key, value) in [("torsion_bits", self.torsion_bits), ("pair_bits", self.pair_bits)] {
            if u32::try_from(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.sss_bits, 2048);
        assert_eq!(config.layered_bits, 1024);
        assert_eq!(config.morgan_bits, 512);
        assert!(!config.soft_failures);
    }

    #[test]
    fn test_overrides() {
        let config = GeneratorConfig::from_lookup(lookup(&[
            ("MOLFP_MORGAN_BITS", "1024"),
            ("MOLFP_MORGAN_RADIUS", " 3 "),
            ("MOLFP_SOFT_FAILURES", "true"),
        ]))
        .unwrap();
        assert_eq!(config.morgan_bits, 1024);
        assert_eq!(config.morgan_radius, 3);
        assert!(config.soft_failures);
    }

    #[test]
    fn test_invalid_values() {
        let err = GeneratorConfig::from_lookup(lookup(&[("MOLFP_PAIR_BITS", "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "MOLFP_PAIR_BITS".to_string(),
                value: "lots".to_string(),
            }
        );
        let err = GeneratorConfig::from_lookup(lookup(&[("MOLFP_SSS_BITS", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroWidth { key: "sss_bits" });
    }

    #[test]
    fn test_from_json() {
        let config = GeneratorConfig::from_json(r#"{"torsion_bits": 4096}"#).unwrap();
        assert_eq!(config.torsion_bits, 4096);
        assert_eq!(config.pair_bits, 2048);
        assert!(GeneratorConfig::from_json("{").is_err());
        assert!(GeneratorConfig::from_json(r#"{"morgan_bits": 0}"#).is_err());
    }
}
