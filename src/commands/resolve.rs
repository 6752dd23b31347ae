// src/commands/resolve.rs

//! Solver-driven resolution

use super::{lookup_roots, open_index};
use crate::cli::{OutputArgs, RepoArgs};
use anyhow::Result;
use depchase::index::DEFAULT_DROPPED_REQUIREMENTS;
use depchase::output::write_results;
use depchase::resolver::{GreedySolver, resolve_with_solver};
use tracing::info;

/// Resolve `pkgnames` with the solver, optionally to a self-hosting set
#[allow(clippy::too_many_arguments)]
pub fn cmd_resolve(
    pkgnames: &[String],
    selfhost: bool,
    ignore_requirement: &[String],
    hints: &[String],
    recommends: bool,
    repo: &RepoArgs,
    output: &OutputArgs,
) -> Result<()> {
    let mut index = open_index(repo)?;

    // Validate the arguments before any solving
    lookup_roots(&index, pkgnames)?;

    if !ignore_requirement.is_empty() {
        index.drop_requirements(ignore_requirement);
    } else if selfhost {
        index.drop_requirements(DEFAULT_DROPPED_REQUIREMENTS);
    }

    let mut solver = GreedySolver::new(&index)
        .with_hints(hints.to_vec())
        .with_recommends(recommends);
    let plan = resolve_with_solver(&index, &mut solver, pkgnames, selfhost)?;
    info!(
        "Solved {} binaries and {} sources",
        plan.binaries.len(),
        plan.sources.len()
    );

    for pkg in plan.binaries.iter().chain(plan.sources.iter()) {
        println!("{}", pkg);
    }
    if selfhost {
        write_results(&plan.binaries, &plan.sources, index.arch(), &output.files("selfhost-"))?;
    }
    Ok(())
}
