// src/resolver/walker.rs

//! Candidate selection for one package's requirements

use super::ResolveOptions;
use super::ambiguity::AmbiguityRecord;
use super::depset::DependencySet;
use super::plan::Diagnostic;
use crate::error::Result;
use crate::index::PackageIndex;
use crate::packages::{Capability, Package};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ambiguities and diagnostics gathered while walking
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub ambiguities: Vec<AmbiguityRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

pub(crate) struct Walker<'a> {
    index: &'a PackageIndex,
    options: &'a ResolveOptions,
}

impl<'a> Walker<'a> {
    pub fn new(index: &'a PackageIndex, options: &'a ResolveOptions) -> Self {
        Self { index, options }
    }

    pub fn index(&self) -> &'a PackageIndex {
        self.index
    }

    /// Pick packages for each requirement of `parent`, in order
    ///
    /// `resolved` is the set built so far; `pick_first` consults it to
    /// leave a requirement alone when one of its candidates is already in.
    pub fn select<'c, I>(
        &self,
        parent: &Package,
        requirements: I,
        resolved: &DependencySet,
        findings: &mut Findings,
    ) -> Result<Vec<Arc<Package>>>
    where
        I: IntoIterator<Item = &'c Capability>,
    {
        let mut picked = Vec::new();

        for cap in requirements {
            let candidates = distinct(self.index.whatprovides(cap)?);
            match candidates.len() {
                0 => {
                    warn!("No package for [{}] required by [{}]", cap, parent.nvra());
                    findings.diagnostics.push(Diagnostic::MissingProvider {
                        capability: cap.to_string(),
                        required_by: parent.nvra(),
                    });
                }
                1 => self.accept(parent, &candidates[0], &mut picked, findings),
                _ => {
                    if let Some(hinted) = self.hinted(&candidates) {
                        debug!("Hint {} selected for {}", hinted.name, cap);
                        self.accept(parent, hinted, &mut picked, findings);
                    } else if self.options.pick_first {
                        if candidates.iter().any(|c| resolved.contains(&c.key())) {
                            continue;
                        }
                        let arch = self.index.arch();
                        if let Some(first) = candidates.iter().find(|c| arch.accepts(&c.arch)) {
                            debug!("Picked {} for {}", first.key(), cap);
                            self.accept(parent, first, &mut picked, findings);
                        }
                    } else {
                        findings
                            .ambiguities
                            .push(AmbiguityRecord::new(cap.clone(), parent, &candidates));
                    }
                }
            }
        }

        Ok(picked)
    }

    /// First candidate named by a hint, trying hints in the caller's order
    fn hinted<'p>(&self, candidates: &'p [Arc<Package>]) -> Option<&'p Arc<Package>> {
        self.options
            .hints
            .iter()
            .find_map(|hint| candidates.iter().find(|c| c.name == *hint))
    }

    fn accept(
        &self,
        parent: &Package,
        pkg: &Arc<Package>,
        picked: &mut Vec<Arc<Package>>,
        findings: &mut Findings,
    ) {
        if self.options.whatreqs.contains(&pkg.name) {
            info!("{} is pulled in by {}", pkg.name, parent.name);
            findings.diagnostics.push(Diagnostic::PulledIn {
                package: pkg.name.clone(),
                parent: parent.name.clone(),
            });
        }
        if self.options.filters.contains(&pkg.name) {
            debug!("Filtered {}", pkg.name);
            return;
        }
        picked.push(Arc::clone(pkg));
    }
}

/// Collapse candidates sharing a `name#arch` key onto the first of them
fn distinct(candidates: Vec<Arc<Package>>) -> Vec<Arc<Package>> {
    let mut seen = HashSet::new();
    candidates.into_iter().filter(|c| seen.insert(c.key())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::{pkg, with_provides, with_requires};
    use crate::packages::ArchPolicy;

    fn index() -> PackageIndex {
        let mut index = PackageIndex::new(ArchPolicy::new("x86_64"));
        index.add_package(with_requires(pkg("app", "x86_64", "1-1"), &["libfoo", "missing"]));
        index.add_package(with_provides(pkg("foo-1", "x86_64", "1-1"), &["libfoo"]));
        index.add_package(with_provides(pkg("foo-2", "x86_64", "1-1"), &["libfoo"]));
        index
    }

    fn app(index: &PackageIndex) -> Arc<Package> {
        index.filter_name("app", None, true).remove(0)
    }

    #[test]
    fn test_ambiguous_without_hint() {
        let index = index();
        let options = ResolveOptions::default();
        let walker = Walker::new(&index, &options);
        let mut findings = Findings::default();
        let parent = app(&index);

        let picked = walker
            .select(&parent, parent.requirements(false), &DependencySet::new(), &mut findings)
            .unwrap();
        assert!(picked.is_empty());
        assert_eq!(findings.ambiguities.len(), 1);
        assert!(matches!(
            &findings.diagnostics[0],
            Diagnostic::MissingProvider { capability, .. } if capability == "missing"
        ));
    }

    #[test]
    fn test_hint_order_and_filter() {
        let index = index();
        let options = ResolveOptions {
            hints: vec!["foo-2".to_string(), "foo-1".to_string()],
            ..ResolveOptions::default()
        };
        let walker = Walker::new(&index, &options);
        let mut findings = Findings::default();
        let parent = app(&index);

        let picked = walker
            .select(&parent, parent.requirements(false), &DependencySet::new(), &mut findings)
            .unwrap();
        assert_eq!(picked[0].name, "foo-2");

        let options = ResolveOptions {
            hints: vec!["foo-2".to_string()],
            filters: ["foo-2".to_string()].into_iter().collect(),
            whatreqs: ["foo-2".to_string()].into_iter().collect(),
            ..ResolveOptions::default()
        };
        let walker = Walker::new(&index, &options);
        let mut findings = Findings::default();
        let picked = walker
            .select(&parent, parent.requirements(false), &DependencySet::new(), &mut findings)
            .unwrap();
        assert!(picked.is_empty());
        assert!(findings.diagnostics.contains(&Diagnostic::PulledIn {
            package: "foo-2".to_string(),
            parent: "app".to_string(),
        }));
    }

    #[test]
    fn test_pick_first_skips_when_resolved() {
        let index = index();
        let options = ResolveOptions {
            pick_first: true,
            ..ResolveOptions::default()
        };
        let walker = Walker::new(&index, &options);
        let parent = app(&index);

        let mut findings = Findings::default();
        let picked = walker
            .select(&parent, parent.requirements(false), &DependencySet::new(), &mut findings)
            .unwrap();
        assert_eq!(picked[0].name, "foo-1");
        assert!(findings.ambiguities.is_empty());

        let resolved: DependencySet = index.filter_name("foo-2", None, true).into_iter().collect();
        let picked = walker
            .select(&parent, parent.requirements(false), &resolved, &mut findings)
            .unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn test_same_build_in_two_repos_is_one_choice() {
        let mut index = PackageIndex::new(ArchPolicy::new("x86_64"));
        index.add_package(with_requires(pkg("app", "x86_64", "1-1"), &["libbar"]));
        for repo in ["one", "two"] {
            let mut bar = with_provides(pkg("bar", "x86_64", "2-1"), &["libbar"]);
            bar.repo = repo.to_string();
            index.add_package(bar);
        }
        let options = ResolveOptions::default();
        let walker = Walker::new(&index, &options);
        let mut findings = Findings::default();
        let parent = app(&index);

        let picked = walker
            .select(&parent, parent.requirements(false), &DependencySet::new(), &mut findings)
            .unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].repo, "one");
        assert!(findings.ambiguities.is_empty());
    }
}
