//! Subcommand implementations. Each returns the text to print.

use crate::config::CliConfig;
use anyhow::{Context, Result};
use molfp_core::{
    all_values_above, count_overlap, count_range_overlap, streaming_dice, BitmapFingerprint,
    ByteA, SparseFingerprint,
};
use molfp_engine::GeneratorConfig;
use std::fmt::Write;
use std::path::Path;
use tracing::debug;

/// Read a file holding a hex-encoded varlena buffer.
pub fn load(path: &Path) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let bytes = decode_hex(&text).with_context(|| format!("invalid hex in {}", path.display()))?;
    debug!(path = %path.display(), len = bytes.len(), "Loaded fingerprint");
    Ok(bytes)
}

pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    Ok(hex::decode(compact)?)
}

pub fn bitmap_sim(a: &[u8], b: &[u8], config: &CliConfig) -> Result<String> {
    let a = BitmapFingerprint::from_varlena(a).context("first bitmap")?;
    let b = BitmapFingerprint::from_varlena(b).context("second bitmap")?;
    let mut out = String::new();
    writeln!(out, "tanimoto\t{:.6}", a.tanimoto(&b)?)?;
    writeln!(out, "dice\t{:.6}", a.dice(&b)?)?;
    writeln!(
        out,
        "tversky\t{:.6}",
        a.tversky(&b, config.tversky_alpha, config.tversky_beta)?
    )?;
    Ok(out)
}

pub fn sparse_sim(a: &[u8], b: &[u8]) -> Result<String> {
    let wa = ByteA::from_varlena(a).context("first sparse fingerprint")?;
    let wb = ByteA::from_varlena(b).context("second sparse fingerprint")?;
    let streamed = streaming_dice(wa.as_bytes(), wb.as_bytes())?;

    let fa = SparseFingerprint::from_wire(wa.as_bytes())?;
    let fb = SparseFingerprint::from_wire(wb.as_bytes())?;
    let mut out = String::new();
    writeln!(out, "streaming_dice\t{streamed:.6}")?;
    writeln!(out, "tanimoto\t{:.6}", fa.tanimoto(&fb)?)?;
    writeln!(out, "dice\t{:.6}", fa.dice(&fb)?)?;
    Ok(out)
}

pub fn fold(buf: &[u8], config: &CliConfig) -> Result<String> {
    let fp = SparseFingerprint::from_varlena(buf)?;
    let folded = fp.to_bitmap(config.fold_bits)?;
    Ok(hex::encode(folded.to_varlena()))
}

pub fn range(buf: &[u8], config: &CliConfig) -> Result<String> {
    let fp = SparseFingerprint::from_varlena(buf)?;
    let ranges = fp.to_range_compressed(config.range_ints)?;
    Ok(hex::encode(ranges.to_varlena()))
}

/// Screen a query against a stored sparse fingerprint's folded summaries.
pub fn overlap(stored: &[u8], query: &[u8], config: &CliConfig) -> Result<String> {
    let stored = SparseFingerprint::from_varlena(stored).context("stored fingerprint")?;
    let query = SparseFingerprint::from_varlena(query).context("query fingerprint")?;

    let signature = stored.to_bitmap(config.fold_bits)?;
    let counts = count_overlap(Some(signature.as_bytes()), &query, config.fold_bits)?;
    let ranges = stored.to_range_compressed(config.range_ints)?;
    let r = count_range_overlap(&ranges, &query)?;

    let mut out = String::new();
    writeln!(
        out,
        "bits\tsum={} overlap_sum={} overlap_count={}",
        counts.sum, counts.overlap_sum, counts.overlap_count
    )?;
    writeln!(
        out,
        "ranges\tquery_sum={} key_sum={} overlap_low={} overlap_high={}",
        r.query_sum, r.key_sum, r.overlap_low, r.overlap_high
    )?;
    Ok(out)
}

/// Describe a buffer: sparse when its header parses, bitmap otherwise.
pub fn inspect(buf: &[u8]) -> Result<String> {
    match SparseFingerprint::from_varlena(buf) {
        Ok(fp) => {
            let wire = ByteA::from_varlena(buf)?;
            Ok(format!(
                "sparse\twidth={} elements={} total={} positive={}",
                fp.width(),
                fp.len(),
                fp.total(),
                all_values_above(wire.as_bytes(), 0)?
            ))
        }
        Err(e) => {
            debug!(error = %e, "Not a sparse fingerprint, reading as bitmap");
            let fp = BitmapFingerprint::from_varlena(buf)?;
            Ok(format!(
                "bitmap\tbits={} popcount={}",
                fp.num_bits(),
                fp.popcount()
            ))
        }
    }
}

/// Effective generator configuration as JSON.
pub fn generator_config() -> Result<String> {
    let config = GeneratorConfig::from_env()?;
    Ok(serde_json::to_string_pretty(&config)?)
}
