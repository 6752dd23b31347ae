// src/resolver/mod.rs

//! Dependency closure and self-hosting resolution
//!
//! Two ways of computing what a set of packages needs:
//!
//! - [`Resolver`] / [`resolve_selfhost`] walk requirements directly against
//!   the [`PackageIndex`](crate::index::PackageIndex), recording
//!   requirements with several providers as [`AmbiguityRecord`]s instead of
//!   guessing.
//! - [`resolve_with_solver`] drives an [`InstallSolver`] to a fixed point,
//!   letting the solver pick providers.

mod ambiguity;
mod depset;
mod engine;
mod fixpoint;
mod greedy;
mod plan;
mod selfhost;
mod solver;
mod walker;

pub use ambiguity::{AmbiguityRecord, prune, resolved};
pub use depset::DependencySet;
pub use engine::{Resolver, resolve_closure, source_packages};
pub use fixpoint::resolve_with_solver;
pub use greedy::GreedySolver;
pub use plan::{Closure, Diagnostic, SelfHostPlan};
pub use selfhost::resolve_selfhost;
pub use solver::{InstallSolver, Job, JobTarget, Solution, package_id};

use std::collections::HashSet;

/// Caller policy for the traversal resolvers
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Package names preferred, in order, when several providers qualify
    pub hints: Vec<String>,
    /// Package names never added to a result
    pub filters: HashSet<String>,
    /// Package names whose selection is traced
    pub whatreqs: HashSet<String>,
    /// Take the first acceptable provider instead of recording an ambiguity
    pub pick_first: bool,
    /// Also walk weak (Recommends) requirements
    pub follow_recommends: bool,
}
