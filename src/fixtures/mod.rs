//! Synthetic archive sets for trying out and benchmarking strategies
//!
//! Produces `0.zip .. {n-1}.zip`, each holding `records` XML documents named
//! `<key>.xml`. Keys are unique across the whole set.

use anyhow::{Context, Result};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const KEY_LEN: usize = 16;

/// Shape of a generated archive set
#[derive(Debug, Clone, Copy)]
pub struct FixtureSpec {
    pub archives: usize,
    pub records_per_archive: usize,
}

impl Default for FixtureSpec {
    fn default() -> Self {
        Self {
            archives: 50,
            records_per_archive: 1000,
        }
    }
}

fn random_token<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// `amount` distinct keys, in generation order
pub fn unique_keys<R: Rng>(rng: &mut R, amount: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(amount);
    let mut keys = Vec::with_capacity(amount);
    while keys.len() < amount {
        let key = random_token(rng, KEY_LEN);
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    keys
}

/// One record document with a random level and 1 to 10 objects
pub fn record_xml<R: Rng>(rng: &mut R, key: &str) -> String {
    let level: u32 = rng.random_range(1..=100);
    let mut xml = format!(
        r#"<root><var name="id" value="{key}"/><var name="level" value="{level}"/><objects>"#
    );
    for _ in 0..rng.random_range(1..=10) {
        let _ = write!(xml, r#"<object name="{}"/>"#, random_token(rng, KEY_LEN));
    }
    xml.push_str("</objects></root>");
    xml
}

fn write_archive<R: Rng>(rng: &mut R, path: &Path, keys: &[String]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for key in keys {
        zip.start_file(format!("{key}.xml"), options)
            .with_context(|| format!("Failed to add entry to {}", path.display()))?;
        zip.write_all(record_xml(rng, key).as_bytes())?;
    }

    zip.finish()
        .with_context(|| format!("Failed to finish {}", path.display()))?
        .flush()?;
    Ok(())
}

/// Write a full archive set into `dir`, creating it if needed
pub fn generate<R: Rng>(rng: &mut R, dir: &Path, spec: FixtureSpec) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let keys = unique_keys(rng, spec.archives * spec.records_per_archive);
    let mut paths = Vec::with_capacity(spec.archives);

    for (index, batch) in keys.chunks(spec.records_per_archive.max(1)).enumerate() {
        let path = dir.join(format!("{index}.zip"));
        write_archive(rng, &path, batch)?;
        paths.push(path);
    }

    // Zero records per archive still yields the requested number of (empty) archives
    for index in paths.len()..spec.archives {
        let path = dir.join(format!("{index}.zip"));
        write_archive(rng, &path, &[])?;
        paths.push(path);
    }

    tracing::info!(
        "Generated {} archives with {} records each in {}",
        spec.archives,
        spec.records_per_archive,
        dir.display()
    );
    Ok(paths)
}
