// src/packages/filename.rs

//! Parsing of RPM file names such as `bash-4.3.43-4.fc25.src.rpm`

use crate::error::{Error, Result};

/// Components of an RPM file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmFilename {
    pub name: String,
    pub version: String,
    pub release: String,
    pub epoch: Option<String>,
    pub arch: String,
}

impl RpmFilename {
    /// `name-version-release.arch`, the file name without `.rpm`
    pub fn canonical(&self) -> String {
        format!("{}-{}-{}.{}", self.name, self.version, self.release, self.arch)
    }
}

/// Split `[epoch:]name-version-release.arch[.rpm]`
pub fn split_filename(filename: &str) -> Result<RpmFilename> {
    let malformed = || Error::ParseError(format!("Malformed RPM file name '{}'", filename));

    let base = filename.strip_suffix(".rpm").unwrap_or(filename);
    let (rest, arch) = base.rsplit_once('.').ok_or_else(malformed)?;
    let (rest, release) = rest.rsplit_once('-').ok_or_else(malformed)?;
    let (nameish, version) = rest.rsplit_once('-').ok_or_else(malformed)?;

    let (epoch, name) = match nameish.split_once(':') {
        Some((e, n)) => (Some(e.to_string()), n),
        None => (None, nameish),
    };

    if name.is_empty() || version.is_empty() || release.is_empty() || arch.is_empty() {
        return Err(malformed());
    }

    Ok(RpmFilename {
        name: name.to_string(),
        version: version.to_string(),
        release: release.to_string(),
        epoch,
        arch: arch.to_string(),
    })
}
