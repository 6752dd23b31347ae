// src/commands/neededby.rs

//! Runtime closure of packages

use super::{lookup_roots, open_index, report_unresolved};
use crate::cli::{OutputArgs, PolicyArgs, RepoArgs};
use anyhow::Result;
use depchase::output::write_results;
use depchase::packages::split_pkgname;
use depchase::resolver::{Resolver, source_packages};
use tracing::info;

/// Compute the runtime closure of `pkgnames` and the sources it builds from
pub fn cmd_neededby(
    pkgnames: &[String],
    policy: &PolicyArgs,
    repo: &RepoArgs,
    output: &OutputArgs,
) -> Result<()> {
    let index = open_index(repo)?;
    let options = policy.options();

    let wanted: Vec<String> = pkgnames
        .iter()
        .filter(|spec| !options.filters.contains(split_pkgname(spec).0))
        .cloned()
        .collect();
    let roots = lookup_roots(&index, &wanted)?;

    let mut resolver = Resolver::new(&index, &options);
    for root in &roots {
        resolver.resolve(root)?;
    }
    let closure = resolver.finish();
    let sources = source_packages(&index, &closure.packages)?;
    info!(
        "{} binaries and {} sources needed by {}",
        closure.packages.len(),
        sources.len(),
        pkgnames.join(" ")
    );

    write_results(&closure.packages, &sources, index.arch(), &output.files(""))?;
    report_unresolved(&closure.ambiguities, output.json_unresolved.as_deref())
}
