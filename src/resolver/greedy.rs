// src/resolver/greedy.rs

//! Deterministic depth-first install-set solver
//!
//! For each requirement the solver keeps a provider already in the install
//! set, else takes a favored provider, else a hinted one, else the first
//! provider in architecture-tier order. It never backtracks across
//! alternatives; a job whose closure hits an unprovided requirement or a
//! second version of an installed `name#arch` fails as a whole.

use super::depset::DependencySet;
use super::solver::{InstallSolver, Job, JobTarget, Solution, package_id};
use crate::error::Result;
use crate::index::{Lookup, PackageIndex};
use crate::packages::{Capability, Package};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

pub struct GreedySolver<'a> {
    index: &'a PackageIndex,
    favored: HashSet<String>,
    hints: Vec<String>,
    follow_recommends: bool,
}

impl<'a> GreedySolver<'a> {
    pub fn new(index: &'a PackageIndex) -> Self {
        Self {
            index,
            favored: HashSet::new(),
            hints: Vec::new(),
            follow_recommends: false,
        }
    }

    /// Names preferred when several providers qualify
    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_recommends(mut self, follow: bool) -> Self {
        self.follow_recommends = follow;
        self
    }

    fn choose<'p>(&self, candidates: &'p [Arc<Package>]) -> &'p Arc<Package> {
        candidates
            .iter()
            .find(|c| self.favored.contains(&package_id(c)))
            .or_else(|| {
                self.hints
                    .iter()
                    .find_map(|hint| candidates.iter().find(|c| c.name == *hint))
            })
            .unwrap_or(&candidates[0])
    }

    fn is_installed(set: &DependencySet, candidate: &Package, cap: &Capability) -> bool {
        set.get(&candidate.key())
            .is_some_and(|p| package_id(p) == package_id(candidate) || p.satisfies(cap))
    }

    /// Add `pkg` and its requirements to `set`; `Some(problem)` on failure
    ///
    /// On failure `set` may hold a partial closure; callers roll back.
    fn install(&self, pkg: &Arc<Package>, set: &mut DependencySet) -> Result<Option<String>> {
        let mut stack = vec![Arc::clone(pkg)];

        while let Some(next) = stack.pop() {
            if let Some(existing) = set.get(&next.key()) {
                if package_id(existing) != package_id(&next) {
                    return Ok(Some(format!(
                        "cannot install both {} and {}",
                        existing, next
                    )));
                }
                continue;
            }
            set.insert(Arc::clone(&next));

            let hard = next.requires.iter().chain(next.requires_pre.iter());
            let soft: &[Capability] = if self.follow_recommends { &next.recommends } else { &[] };
            let mut picks: Vec<Arc<Package>> = Vec::new();

            for (cap, required) in hard.map(|c| (c, true)).chain(soft.iter().map(|c| (c, false))) {
                let candidates = self.index.whatprovides(cap)?;
                if candidates.is_empty() {
                    if required {
                        return Ok(Some(format!("nothing provides {} needed by {}", cap, next)));
                    }
                    continue;
                }
                if candidates.iter().any(|c| Self::is_installed(set, c, cap)) {
                    continue;
                }
                if picks.iter().any(|p| p.satisfies(cap)) {
                    continue;
                }
                picks.push(Arc::clone(self.choose(&candidates)));
            }

            // Reversed so the first requirement is installed first
            stack.extend(picks.into_iter().rev());
        }

        Ok(None)
    }

    fn job_package(&self, job: &Job) -> Option<Arc<Package>> {
        match &job.target {
            JobTarget::Package(pkg) => Some(Arc::clone(pkg)),
            JobTarget::Name(name) => match self.index.lookup_spec(name) {
                Lookup::Found(pkg) => Some(pkg),
                Lookup::Ambiguous(candidates) => Some(Arc::clone(self.choose(&candidates))),
                Lookup::NotFound => None,
            },
        }
    }
}

impl InstallSolver for GreedySolver<'_> {
    fn solve(&mut self, jobs: &[Job]) -> Result<Solution> {
        let mut set = DependencySet::new();
        let mut problems = Vec::new();

        for job in jobs {
            let Some(pkg) = self.job_package(job) else {
                if !job.weak {
                    problems.push(format!("no package matches {}", job));
                }
                continue;
            };

            let mark = set.len();
            if let Some(problem) = self.install(&pkg, &mut set)? {
                set.truncate(mark);
                if job.weak {
                    debug!("Leaving {} undecided: {}", pkg, problem);
                } else {
                    problems.push(problem);
                }
            }
        }

        Ok(Solution {
            packages: set.iter().cloned().collect(),
            problems,
        })
    }

    fn favor(&mut self, packages: &[Arc<Package>]) {
        self.favored.extend(packages.iter().map(|p| package_id(p)));
    }

    fn problems(&mut self, pkg: &Arc<Package>) -> Result<Vec<String>> {
        let mut set = DependencySet::new();
        Ok(self.install(pkg, &mut set)?.into_iter().collect())
    }
}
