// src/commands/mod.rs
//! Command handlers for the depchase CLI

mod neededby;
mod resolve;
mod selfhost;
mod sourcerpm;

pub use neededby::cmd_neededby;
pub use resolve::cmd_resolve;
pub use selfhost::cmd_neededtoselfhost;
pub use sourcerpm::cmd_getsourcerpm;

use crate::cli::RepoArgs;
use anyhow::{Context, Result};
use depchase::index::PackageIndex;
use depchase::output::{format_unresolved, unresolved_json};
use depchase::packages::Package;
use depchase::repository::{RepoCache, RepoSetup, RepositoryClient, prep_repositories};
use depchase::resolver::AmbiguityRecord;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::info;

/// Environment variable overriding the default cache directory
const CACHE_DIR_ENV: &str = "DEPCHASE_CACHE_DIR";

/// Cache directory: the flag, then the environment, then the user cache dir
fn cache_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::cache_dir()
        .map(|d| d.join("depchase"))
        .context("No cache directory available; pass --cache-dir")
}

/// Load the configured repositories into an index
pub(crate) fn open_index(args: &RepoArgs) -> Result<PackageIndex> {
    let setup = RepoSetup {
        os: args.os.clone(),
        version: args.version,
        milestone: args.milestone.clone(),
        arch: args.arch.clone(),
        overrides: !args.no_overrides,
        local_override: args.local_override.clone(),
    };
    let dir = cache_dir(args.cache_dir.as_deref())?;
    info!("Using cache directory {}", dir.display());

    let client = RepositoryClient::new()?;
    let index = prep_repositories(&setup, Rc::new(client), RepoCache::new(dir))
        .context("Failed to load repositories")?;
    Ok(index)
}

/// Look up each command-line package argument
pub(crate) fn lookup_roots(index: &PackageIndex, pkgnames: &[String]) -> Result<Vec<Arc<Package>>> {
    pkgnames
        .iter()
        .map(|spec| Ok(index.lookup_spec(spec).into_result(spec)?))
        .collect()
}

/// Print open ambiguities and optionally dump them as JSON
pub(crate) fn report_unresolved(ambiguities: &[AmbiguityRecord], json: Option<&Path>) -> Result<()> {
    let report = format_unresolved(ambiguities);
    if !report.is_empty() {
        eprint!("{}", report);
    }
    if let Some(path) = json {
        std::fs::write(path, unresolved_json(ambiguities)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
