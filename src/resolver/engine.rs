// src/resolver/engine.rs

//! Runtime dependency closure
//!
//! The resolver walks requirements depth-first from each root. A package
//! is inserted into the set before its requirements are expanded, so
//! cycles terminate and diamonds are visited once. The walk uses an
//! explicit stack of child iterators instead of recursion; the visiting
//! order is the same as a recursive walk.

use super::ResolveOptions;
use super::ambiguity::prune;
use super::depset::DependencySet;
use super::plan::Closure;
use super::walker::{Findings, Walker};
use crate::error::Result;
use crate::index::PackageIndex;
use crate::packages::Package;
use std::sync::Arc;
use std::vec::IntoIter;
use tracing::{debug, info};

/// Accumulates the closure of one or more roots
pub struct Resolver<'a> {
    walker: Walker<'a>,
    options: &'a ResolveOptions,
    packages: DependencySet,
    findings: Findings,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a PackageIndex, options: &'a ResolveOptions) -> Self {
        Self {
            walker: Walker::new(index, options),
            options,
            packages: DependencySet::new(),
            findings: Findings::default(),
        }
    }

    /// Add the closure of `root` to the accumulated set
    ///
    /// Ambiguities that the set now settles are dropped afterwards.
    pub fn resolve(&mut self, root: &Arc<Package>) -> Result<()> {
        if self.options.filters.contains(&root.name) {
            debug!("Skipping filtered root {}", root.name);
            return Ok(());
        }

        let before = self.packages.len();
        let mut stack: Vec<IntoIter<Arc<Package>>> = Vec::new();
        if let Some(children) = self.visit(root)? {
            stack.push(children);
        }

        while let Some(top) = stack.last_mut() {
            match top.next() {
                Some(child) => {
                    if let Some(children) = self.visit(&child)? {
                        stack.push(children);
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }

        let open = std::mem::take(&mut self.findings.ambiguities);
        self.findings.ambiguities = prune(open, &self.packages);
        info!(
            "{} added {} packages ({} total)",
            root.name,
            self.packages.len() - before,
            self.packages.len()
        );
        Ok(())
    }

    /// Insert `pkg` and select its requirements; `None` if already present
    fn visit(&mut self, pkg: &Arc<Package>) -> Result<Option<IntoIter<Arc<Package>>>> {
        if !self.packages.insert(Arc::clone(pkg)) {
            return Ok(None);
        }
        let children = self.walker.select(
            pkg,
            pkg.requirements(self.options.follow_recommends),
            &self.packages,
            &mut self.findings,
        )?;
        Ok(Some(children.into_iter()))
    }

    pub fn packages(&self) -> &DependencySet {
        &self.packages
    }

    pub fn finish(self) -> Closure {
        Closure {
            packages: self.packages,
            ambiguities: self.findings.ambiguities,
            diagnostics: self.findings.diagnostics,
        }
    }
}

/// Closure of several roots resolved in order
pub fn resolve_closure(
    index: &PackageIndex,
    roots: &[Arc<Package>],
    options: &ResolveOptions,
) -> Result<Closure> {
    let mut resolver = Resolver::new(index, options);
    for root in roots {
        resolver.resolve(root)?;
    }
    Ok(resolver.finish())
}

/// Source package of every binary in `binaries`
///
/// A binary whose source cannot be identified exactly is an error.
pub fn source_packages(index: &PackageIndex, binaries: &DependencySet) -> Result<DependencySet> {
    let mut sources = DependencySet::new();
    for pkg in binaries.iter() {
        let what = pkg.sourcerpm.as_deref().unwrap_or(pkg.name.as_str());
        let source = index.lookup_source(pkg)?.into_result(what)?;
        sources.insert(source);
    }
    Ok(sources)
}
