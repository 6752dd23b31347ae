// src/resolver/solver.rs

//! Install-set solver contract used by the fixed-point self-host mode

use crate::error::Result;
use crate::packages::Package;
use std::fmt;
use std::sync::Arc;

/// What a job asks to install
#[derive(Debug, Clone)]
pub enum JobTarget {
    /// A package argument, `name` or `name#arch`
    Name(String),
    Package(Arc<Package>),
}

/// One install request
///
/// A weak job that cannot be satisfied is left out of the solution instead
/// of producing a problem.
#[derive(Debug, Clone)]
pub struct Job {
    pub target: JobTarget,
    pub weak: bool,
}

impl Job {
    pub fn install_name(name: impl Into<String>) -> Self {
        Self {
            target: JobTarget::Name(name.into()),
            weak: false,
        }
    }

    pub fn install(pkg: Arc<Package>) -> Self {
        Self {
            target: JobTarget::Package(pkg),
            weak: false,
        }
    }

    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weak = if self.weak { " (weak)" } else { "" };
        match &self.target {
            JobTarget::Name(name) => write!(f, "install {}{}", name, weak),
            JobTarget::Package(pkg) => write!(f, "install {}{}", pkg, weak),
        }
    }
}

/// Identity of a package across repositories: full NEVRA plus repository
pub fn package_id(pkg: &Package) -> String {
    format!("{}@{}", pkg.full_nevra(), pkg.repo)
}

/// Packages a solve decided to install, and the problems of hard jobs
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub packages: Vec<Arc<Package>>,
    pub problems: Vec<String>,
}

impl Solution {
    pub fn contains(&self, pkg: &Package) -> bool {
        let id = package_id(pkg);
        self.packages.iter().any(|p| package_id(p) == id)
    }
}

/// A dependency solver computing install sets against a package index
pub trait InstallSolver {
    /// Compute the install set for `jobs` starting from nothing installed
    fn solve(&mut self, jobs: &[Job]) -> Result<Solution>;

    /// Prefer these packages in later solves whenever they qualify
    fn favor(&mut self, packages: &[Arc<Package>]);

    /// Problems that keep `pkg` from being installed on its own
    fn problems(&mut self, pkg: &Arc<Package>) -> Result<Vec<String>>;
}
