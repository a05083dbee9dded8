//! molfp command-line tool.
//!
//! Works on fingerprint files holding hex-encoded, length-prefixed buffers:
//! - bitmap and sparse similarity
//! - folding sparse fingerprints into bitmaps and range summaries
//! - overlap screening against those summaries
//! - inspection of stored buffers

mod commands;
mod config;

use anyhow::{bail, Result};
use config::CliConfig;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage: molfp <command> [files]

commands:
  bitmap-sim <a> <b>           tanimoto, dice and tversky of two bitmaps
  sparse-sim <a> <b>           streaming and materialized sparse similarity
  fold <sparse>                fold into a MOLFP_FOLD_BITS bitmap
  range <sparse>               compress into MOLFP_RANGE_INTS (low, high) buckets
  overlap <stored> <query>     screen a query against a stored fingerprint
  inspect <file>               describe a stored fingerprint
  config                       print the generator configuration";

fn main() -> Result<()> {
    let config = CliConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, files)) = args.split_first() else {
        bail!("{USAGE}");
    };
    info!(command = %command, files = files.len(), "Running");

    let output = match (command.as_str(), files) {
        ("bitmap-sim", [a, b]) => commands::bitmap_sim(&load(a)?, &load(b)?, &config)?,
        ("sparse-sim", [a, b]) => commands::sparse_sim(&load(a)?, &load(b)?)?,
        ("fold", [f]) => commands::fold(&load(f)?, &config)?,
        ("range", [f]) => commands::range(&load(f)?, &config)?,
        ("overlap", [s, q]) => commands::overlap(&load(s)?, &load(q)?, &config)?,
        ("inspect", [f]) => commands::inspect(&load(f)?)?,
        ("config", []) => commands::generator_config()?,
        _ => bail!("{USAGE}"),
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn load(path: &str) -> Result<Vec<u8>> {
    commands::load(Path::new(path))
}
