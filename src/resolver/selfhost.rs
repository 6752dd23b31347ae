// src/resolver/selfhost.rs

//! Self-hosting closure by plain traversal
//!
//! Every binary package pulls in its runtime requirements and, through its
//! source package, the build requirements needed to rebuild it. Build
//! requirements are resolved to binaries, which in turn need their own
//! sources, until nothing new appears.

use super::ResolveOptions;
use super::ambiguity::prune;
use super::depset::DependencySet;
use super::plan::SelfHostPlan;
use super::walker::{Findings, Walker};
use crate::error::Result;
use crate::index::PackageIndex;
use crate::packages::Package;
use std::sync::Arc;
use std::vec::IntoIter;
use tracing::{debug, info};

struct SelfHost<'a> {
    walker: Walker<'a>,
    options: &'a ResolveOptions,
    binaries: DependencySet,
    sources: DependencySet,
    findings: Findings,
}

impl<'a> SelfHost<'a> {
    fn resolve(&mut self, root: &Arc<Package>) -> Result<()> {
        if self.options.filters.contains(&root.name) {
            debug!("Skipping filtered root {}", root.name);
            return Ok(());
        }

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
        self.findings.ambiguities = prune(open, &self.binaries);
        info!(
            "{}: {} binaries, {} sources so far",
            root.name,
            self.binaries.len(),
            self.sources.len()
        );
        Ok(())
    }

    /// Insert a binary and collect its runtime and build requirements
    fn visit(&mut self, pkg: &Arc<Package>) -> Result<Option<IntoIter<Arc<Package>>>> {
        if !self.binaries.insert(Arc::clone(pkg)) {
            return Ok(None);
        }

        let mut children = self.walker.select(
            pkg,
            pkg.requirements(self.options.follow_recommends),
            &self.binaries,
            &mut self.findings,
        )?;

        let what = pkg.sourcerpm.as_deref().unwrap_or(pkg.name.as_str());
        let source = self.walker.index().lookup_source(pkg)?.into_result(what)?;
        if self.sources.insert(Arc::clone(&source)) {
            debug!("{} builds from {}", pkg.name, source.nvra());
            let build = self.walker.select(
                &source,
                source.requires.iter(),
                &self.binaries,
                &mut self.findings,
            )?;
            children.extend(build);
        }

        Ok(Some(children.into_iter()))
    }
}

/// Binaries and sources needed to rebuild `roots` from source
///
/// A binary whose source package is missing or ambiguous aborts the walk.
pub fn resolve_selfhost(
    index: &PackageIndex,
    roots: &[Arc<Package>],
    options: &ResolveOptions,
) -> Result<SelfHostPlan> {
    let mut state = SelfHost {
        walker: Walker::new(index, options),
        options,
        binaries: DependencySet::new(),
        sources: DependencySet::new(),
        findings: Findings::default(),
    };
    for root in roots {
        state.resolve(root)?;
    }
    Ok(SelfHostPlan {
        binaries: state.binaries,
        sources: state.sources,
        ambiguities: state.findings.ambiguities,
        diagnostics: state.findings.diagnostics,
    })
}
