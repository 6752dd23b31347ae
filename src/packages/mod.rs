// src/packages/mod.rs

//! Package data model
//!
//! Packages are loaded once from repository metadata and shared as
//! `Arc<Package>` between the index, the resolver and the output writer.
//! Nothing mutates a package after the index is built.

pub mod arch;
pub mod capability;
pub mod filename;

pub use arch::{ArchPolicy, split_pkgname};
pub use capability::{Capability, Relation};
pub use filename::{RpmFilename, split_filename};

use crate::error::Result;
use crate::version::RpmVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a package within a result set: `name#arch`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageKey(String);

impl PackageKey {
    pub fn new(name: &str, arch: &str) -> Self {
        Self(format!("{}#{}", name, arch))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A binary or source package as described by repository metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub arch: String,
    pub evr: RpmVersion,
    /// Repodata checksum identifying the package across metadata files
    pub pkgid: String,
    /// Name of the repository the package was loaded from
    pub repo: String,
    /// Source package file name, e.g. `bash-4.3-1.fc25.src.rpm`
    pub sourcerpm: Option<String>,
    pub provides: Vec<Capability>,
    pub requires: Vec<Capability>,
    pub requires_pre: Vec<Capability>,
    pub recommends: Vec<Capability>,
    pub files: Vec<String>,
}

impl Package {
    pub fn new(name: impl Into<String>, arch: impl Into<String>, evr: RpmVersion) -> Self {
        Self {
            name: name.into(),
            arch: arch.into(),
            evr,
            pkgid: String::new(),
            repo: String::new(),
            sourcerpm: None,
            provides: Vec::new(),
            requires: Vec::new(),
            requires_pre: Vec::new(),
            recommends: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.name, &self.arch)
    }

    pub fn epoch(&self) -> u64 {
        self.evr.epoch
    }

    pub fn version(&self) -> &str {
        &self.evr.version
    }

    pub fn release(&self) -> &str {
        self.evr.release.as_deref().unwrap_or("")
    }

    pub fn is_source(&self) -> bool {
        arch::is_source_arch(&self.arch)
    }

    /// `name-version-release.arch`, as used in diagnostics
    pub fn nvra(&self) -> String {
        format!("{}-{}-{}.{}", self.name, self.version(), self.release(), self.arch)
    }

    /// `epoch:name-version-release.arch` with the epoch always present
    pub fn full_nevra(&self) -> String {
        format!(
            "{}:{}-{}-{}.{}",
            self.epoch(),
            self.name,
            self.version(),
            self.release(),
            self.arch
        )
    }

    /// The capability every package implicitly provides: `name = evr`
    pub fn self_provide(&self) -> Capability {
        Capability::versioned(self.name.clone(), Relation::Eq, self.evr.clone())
    }

    /// Add the self-provide when the metadata did not list it
    pub fn ensure_self_provide(&mut self) {
        if !self.provides.iter().any(|p| p.name == self.name) {
            let own = self.self_provide();
            self.provides.push(own);
        }
    }

    /// Parsed source package reference, if the package has one
    pub fn source_ref(&self) -> Option<Result<RpmFilename>> {
        self.sourcerpm.as_deref().map(split_filename)
    }

    /// Whether any provide or file of the package satisfies `cap`
    pub fn satisfies(&self, cap: &Capability) -> bool {
        if cap.is_file() && cap.range.is_none() && self.files.iter().any(|f| *f == cap.name) {
            return true;
        }
        self.provides.iter().any(|p| p.overlaps(cap))
    }

    /// Every requirement in resolution order: requires, pre-requires,
    /// then recommends when asked for
    pub fn requirements(&self, recommends: bool) -> impl Iterator<Item = &Capability> {
        let recs: &[Capability] = if recommends { &self.recommends } else { &[] };
        self.requires.iter().chain(self.requires_pre.iter()).chain(recs.iter())
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.name, self.evr, self.arch)
    }
}
