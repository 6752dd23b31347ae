// src/output.rs

//! Result files and the unresolved-requirements report
//!
//! Each result is written as four plain-text files, one package per line
//! in dependency-set order:
//! - binary short: `name`, or `name#arch` for multi-arch packages
//! - binary full: `epoch:name-version-release.arch`
//! - source short and source full, likewise

use crate::error::{Error, Result};
use crate::packages::{ArchPolicy, Package};
use crate::resolver::{AmbiguityRecord, DependencySet};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Header printed above open ambiguities
pub const UNRESOLVED_HEADER: &str = "=== Unresolved Requirements ===";

/// Destination of the four result files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub binary_short: PathBuf,
    pub binary_full: PathBuf,
    pub source_short: PathBuf,
    pub source_full: PathBuf,
}

impl OutputFiles {
    /// `<prefix>binaries-short.txt` and friends
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            binary_short: PathBuf::from(format!("{}binaries-short.txt", prefix)),
            binary_full: PathBuf::from(format!("{}binaries-full.txt", prefix)),
            source_short: PathBuf::from(format!("{}sources-short.txt", prefix)),
            source_full: PathBuf::from(format!("{}sources-full.txt", prefix)),
        }
    }
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self::with_prefix("")
    }
}

/// Short form of a binary package for the target architecture
pub fn binary_short_name(pkg: &Package, arch: &ArchPolicy) -> String {
    if arch.is_multi(&pkg.arch) {
        format!("{}#{}", pkg.name, pkg.arch)
    } else {
        pkg.name.clone()
    }
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut count = 0;
    for line in lines {
        writeln!(out, "{}", line)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Write binaries and sources to the four result files
pub fn write_results(
    binaries: &DependencySet,
    sources: &DependencySet,
    arch: &ArchPolicy,
    files: &OutputFiles,
) -> Result<()> {
    write_lines(&files.binary_short, binaries.iter().map(|p| binary_short_name(p, arch)))?;
    let written = write_lines(&files.binary_full, binaries.iter().map(|p| p.full_nevra()))?;
    info!("Wrote {} binaries to {}", written, files.binary_full.display());

    write_lines(&files.source_short, sources.iter().map(|p| p.name.clone()))?;
    let written = write_lines(&files.source_full, sources.iter().map(|p| p.full_nevra()))?;
    info!("Wrote {} sources to {}", written, files.source_full.display());
    Ok(())
}

/// Human-readable report of open ambiguities; empty when there are none
pub fn format_unresolved(ambiguities: &[AmbiguityRecord]) -> String {
    if ambiguities.is_empty() {
        return String::new();
    }
    let mut report = String::from(UNRESOLVED_HEADER);
    report.push('\n');
    for record in ambiguities {
        report.push_str("    ");
        report.push_str(&record.to_string());
        report.push('\n');
    }
    report
}

#[derive(Debug, Serialize)]
struct UnresolvedEntry<'a> {
    requirement: String,
    required_by: &'a str,
    candidates: Vec<String>,
}

/// Open ambiguities as a JSON array
pub fn unresolved_json(ambiguities: &[AmbiguityRecord]) -> Result<String> {
    let entries: Vec<UnresolvedEntry<'_>> = ambiguities
        .iter()
        .map(|record| UnresolvedEntry {
            requirement: record.requirement.to_string(),
            required_by: &record.required_by,
            candidates: record.candidates().map(|p| p.full_nevra()).collect(),
        })
        .collect();
    serde_json::to_string_pretty(&entries)
        .map_err(|e| Error::ParseError(format!("Failed to encode report: {}", e)))
}
