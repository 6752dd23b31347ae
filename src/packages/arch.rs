// src/packages/arch.rs

//! Architecture tiers
//!
//! Lookups try the primary architecture first, then the multi-arch
//! compatible one (the 32-bit sibling a 64-bit distribution still ships),
//! then `noarch`.

use serde::{Deserialize, Serialize};

/// Architecture of architecture-independent packages
pub const NOARCH: &str = "noarch";

/// Architecture of source packages
pub const SRC: &str = "src";

/// Architecture of source packages that carry no sources
pub const NOSRC: &str = "nosrc";

/// Multi-arch compatible architecture for a primary architecture
pub fn multilib_arch(arch: &str) -> Option<&'static str> {
    match arch {
        "x86_64" => Some("i686"),
        "ppc64" => Some("ppc"),
        "s390x" => Some("s390"),
        _ => None,
    }
}

/// Whether an architecture names a source package
pub fn is_source_arch(arch: &str) -> bool {
    arch == SRC || arch == NOSRC
}

/// Target architecture and its compatible tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchPolicy {
    pub primary: String,
    pub multi: Option<String>,
}

impl ArchPolicy {
    pub fn new(primary: impl Into<String>) -> Self {
        let primary = primary.into();
        let multi = multilib_arch(&primary).map(str::to_string);
        Self { primary, multi }
    }

    /// Architectures to query, in preference order
    pub fn tiers(&self) -> Vec<&str> {
        let mut tiers = vec![self.primary.as_str()];
        if let Some(multi) = &self.multi {
            tiers.push(multi.as_str());
        }
        tiers.push(NOARCH);
        tiers
    }

    /// Whether a package of this architecture may be installed on the target
    pub fn accepts(&self, arch: &str) -> bool {
        arch == NOARCH || arch == self.primary || self.multi.as_deref() == Some(arch)
    }

    pub fn is_multi(&self, arch: &str) -> bool {
        self.multi.as_deref() == Some(arch)
    }
}

impl Default for ArchPolicy {
    fn default() -> Self {
        Self::new("x86_64")
    }
}

/// Split a `name#arch` argument into its parts
pub fn split_pkgname(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once('#') {
        Some((name, arch)) if !arch.is_empty() => (name, Some(arch)),
        Some((name, _)) => (name, None),
        None => (spec, None),
    }
}
