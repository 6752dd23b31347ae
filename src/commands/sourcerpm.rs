// src/commands/sourcerpm.rs

//! Source package lookup

use super::{lookup_roots, open_index};
use crate::cli::RepoArgs;
use anyhow::Result;
use depchase::resolver::{DependencySet, source_packages};

/// Print the source packages `pkgnames` were built from, deduplicated
pub fn cmd_getsourcerpm(pkgnames: &[String], full_name: bool, repo: &RepoArgs) -> Result<()> {
    let index = open_index(repo)?;
    let binaries: DependencySet = lookup_roots(&index, pkgnames)?.into_iter().collect();
    let sources = source_packages(&index, &binaries)?;

    for pkg in sources.iter() {
        if full_name {
            println!("{}", pkg.full_nevra());
        } else {
            println!("{}", pkg.name);
        }
    }
    Ok(())
}
