// src/resolver/fixpoint.rs

//! Self-hosting closure driven by an install-set solver
//!
//! Starting from the install set of the requested names, every new binary
//! package queues its source package, and every queued package is
//! weak-installed on the next round. Rounds continue until nothing is
//! left queued. A round that installs none of the queued packages means
//! they can never be installed, and resolution fails with their problems.

use super::depset::DependencySet;
use super::plan::SelfHostPlan;
use super::solver::{InstallSolver, Job, package_id};
use crate::error::{Error, Result};
use crate::index::PackageIndex;
use crate::packages::Package;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve `names` with `solver`, optionally to a self-hosting set
///
/// Without `selfhost` the binaries are the initial install set and no
/// sources are computed.
pub fn resolve_with_solver(
    index: &PackageIndex,
    solver: &mut dyn InstallSolver,
    names: &[String],
    selfhost: bool,
) -> Result<SelfHostPlan> {
    let jobs: Vec<Job> = names.iter().map(|name| Job::install_name(name.as_str())).collect();
    let initial = solver.solve(&jobs)?;
    if !initial.problems.is_empty() {
        return Err(Error::SolverContradiction {
            problems: initial.problems,
        });
    }

    if !selfhost {
        return Ok(SelfHostPlan {
            binaries: initial.packages.into_iter().collect(),
            ..SelfHostPlan::default()
        });
    }

    let mut binaries = DependencySet::new();
    let mut sources = DependencySet::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut srcs_done: HashSet<String> = HashSet::new();
    let mut queue: Vec<Arc<Package>> = initial.packages;
    let mut round = 0usize;

    while !queue.is_empty() {
        round += 1;
        let jobs: Vec<Job> = queue.iter().map(|p| Job::install(Arc::clone(p)).weak()).collect();
        let solution = solver.solve(&jobs)?;

        let mut new_binaries = Vec::new();
        for pkg in &solution.packages {
            if pkg.is_source() {
                srcs_done.insert(pkg.nvra());
                sources.insert(Arc::clone(pkg));
            } else if seen.insert(package_id(pkg)) {
                binaries.insert(Arc::clone(pkg));
                new_binaries.push(Arc::clone(pkg));
            }
        }
        solver.favor(&new_binaries);

        let remaining: Vec<Arc<Package>> = queue
            .iter()
            .filter(|p| !solution.contains(p))
            .cloned()
            .collect();
        if remaining.len() == queue.len() {
            let mut problems = Vec::new();
            for pkg in &queue {
                problems.extend(solver.problems(pkg)?);
            }
            return Err(Error::SolverContradiction { problems });
        }
        queue = remaining;

        let mut queued: HashSet<String> = queue
            .iter()
            .filter(|p| p.is_source())
            .map(|p| p.nvra())
            .collect();
        for pkg in &new_binaries {
            let Some(sourcerpm) = pkg.sourcerpm.as_deref() else {
                debug!("{} has no source package", pkg);
                continue;
            };
            let canonical = sourcerpm.strip_suffix(".rpm").unwrap_or(sourcerpm);
            if srcs_done.contains(canonical) || queued.contains(canonical) {
                continue;
            }

            // Repositories without a `-source` pair search every source repo
            let repo = index.paired_source_repo(&pkg.repo);
            let mut matches = index.lookup_source_canonical(canonical, repo);
            if matches.len() > 1 {
                return Err(Error::AmbiguousPackage {
                    name: canonical.to_string(),
                    candidates: matches.iter().map(|p| p.nvra()).collect(),
                });
            }
            let source = matches
                .pop()
                .ok_or_else(|| Error::NoSuchPackage(canonical.to_string()))?;
            queued.insert(canonical.to_string());
            queue.push(source);
        }

        info!(
            "Round {}: {} binaries, {} sources, {} queued",
            round,
            binaries.len(),
            sources.len(),
            queue.len()
        );
    }

    Ok(SelfHostPlan {
        binaries,
        sources,
        ..SelfHostPlan::default()
    })
}
