// src/index/lookup.rs

//! Exact-one lookups by name and by source reference

use super::PackageIndex;
use crate::error::{Error, Result};
use crate::packages::arch::{NOARCH, NOSRC, SRC, is_source_arch, multilib_arch};
use crate::packages::{Package, split_filename, split_pkgname};
use std::sync::Arc;

/// Outcome of a lookup that expects exactly one package
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(Arc<Package>),
    Ambiguous(Vec<Arc<Package>>),
    NotFound,
}

impl Lookup {
    fn from_matches(mut matches: Vec<Arc<Package>>) -> Self {
        match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches.remove(0)),
            _ => Lookup::Ambiguous(matches),
        }
    }

    /// Turn anything but a single match into an error naming `what`
    pub fn into_result(self, what: &str) -> Result<Arc<Package>> {
        match self {
            Lookup::Found(pkg) => Ok(pkg),
            Lookup::NotFound => Err(Error::NoSuchPackage(what.to_string())),
            Lookup::Ambiguous(candidates) => Err(Error::AmbiguousPackage {
                name: what.to_string(),
                candidates: candidates.iter().map(|p| p.nvra()).collect(),
            }),
        }
    }
}

impl PackageIndex {
    /// Find the single latest package called `name`
    ///
    /// The arch tiers are tried in turn and the first non-empty tier
    /// decides. Without `arch` the tiers are those of the index target;
    /// with it they are that arch, its multilib arch, then noarch.
    pub fn lookup_name(&self, name: &str, arch: Option<&str>) -> Lookup {
        let tiers: Vec<&str> = match arch {
            Some(arch) if is_source_arch(arch) || arch == NOARCH => vec![arch],
            Some(arch) => [Some(arch), multilib_arch(arch), Some(NOARCH)]
                .into_iter()
                .flatten()
                .collect(),
            None => self.arch().tiers(),
        };

        for tier in tiers {
            let matches = self.filter_name(name, Some(tier), true);
            if !matches.is_empty() {
                return Lookup::from_matches(matches);
            }
        }
        Lookup::NotFound
    }

    /// Look up a command-line argument of the form `name` or `name#arch`
    pub fn lookup_spec(&self, spec: &str) -> Lookup {
        let (name, arch) = split_pkgname(spec);
        self.lookup_name(name, arch)
    }

    /// Find the source package a binary package was built from
    ///
    /// Candidates are restricted to the source repository paired with the
    /// binary's repository when the index knows one.
    pub fn lookup_source(&self, pkg: &Package) -> Result<Lookup> {
        let Some(sourcerpm) = pkg.sourcerpm.as_deref() else {
            return Ok(Lookup::NotFound);
        };
        let source = split_filename(sourcerpm)?;
        let paired = self.paired_source_repo(&pkg.repo);

        for arch in [SRC, NOSRC] {
            let mut matches = self.filter_name(&source.name, Some(arch), true);
            if let Some(repo) = paired {
                let in_pair: Vec<_> = matches.iter().filter(|p| p.repo == repo).cloned().collect();
                if !in_pair.is_empty() {
                    matches = in_pair;
                }
            }
            if !matches.is_empty() {
                return Ok(Lookup::from_matches(matches));
            }
        }
        Ok(Lookup::NotFound)
    }

    /// Source packages whose `name-version-release.arch` equals `canonical`
    pub fn lookup_source_canonical(&self, canonical: &str, repo: Option<&str>) -> Vec<Arc<Package>> {
        let name = split_filename(canonical).map(|f| f.name).ok();
        let Some(name) = name else {
            return Vec::new();
        };

        self.filter_name(&name, None, false)
            .into_iter()
            .filter(|p| p.is_source())
            .filter(|p| repo.is_none_or(|r| p.repo == r))
            .filter(|p| p.nvra() == canonical)
            .collect()
    }
}
