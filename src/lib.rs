// src/lib.rs

//! depchase: dependency closures of RPM package sets
//!
//! Loads rpm-md repositories through a checksum-verified cache into an
//! in-memory package index, then answers two questions about a set of
//! packages:
//!
//! - What do they need at runtime? ([`resolver::Resolver`])
//! - What is needed to rebuild all of that from source, recursively?
//!   ([`resolver::resolve_selfhost`], or [`resolver::resolve_with_solver`]
//!   driving an install-set solver to a fixed point)
//!
//! # Architecture
//!
//! - [`repository`]: fetching, parsing and caching repository metadata
//! - [`index`]: name and capability queries with arch tiers and priorities
//! - [`resolver`]: closure walks, ambiguity tracking and the solver loop
//! - [`output`]: result files and reports

pub mod compression;
mod error;
pub mod hash;
pub mod index;
pub mod output;
pub mod packages;
pub mod repository;
pub mod resolver;
pub mod version;

pub use error::{Error, Result};
pub use index::PackageIndex;
pub use packages::{Capability, Package, PackageKey};
pub use resolver::{DependencySet, ResolveOptions};
pub use version::RpmVersion;
