// src/commands/selfhost.rs

//! Self-hosting closure by traversal

use super::{lookup_roots, open_index, report_unresolved};
use crate::cli::{OutputArgs, PolicyArgs, RepoArgs};
use anyhow::Result;
use depchase::output::write_results;
use depchase::packages::split_pkgname;
use depchase::resolver::resolve_selfhost;
use tracing::info;

/// Compute everything needed to rebuild `pkgnames` from source
pub fn cmd_neededtoselfhost(
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

    let plan = resolve_selfhost(&index, &roots, &options)?;
    info!(
        "{} binaries and {} sources needed to self-host",
        plan.binaries.len(),
        plan.sources.len()
    );

    write_results(&plan.binaries, &plan.sources, index.arch(), &output.files("selfhost-"))?;
    report_unresolved(&plan.ambiguities, output.json_unresolved.as_deref())
}
