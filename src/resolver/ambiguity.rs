// src/resolver/ambiguity.rs

//! Requirements left open because several providers qualified
//!
//! A record stays open until one of its candidates ends up in the
//! dependency set through some other path.

use super::depset::DependencySet;
use crate::packages::{Capability, Package, PackageKey};
use std::fmt;
use std::sync::Arc;

/// An unresolved requirement and the packages that could satisfy it
#[derive(Debug, Clone)]
pub struct AmbiguityRecord {
    pub requirement: Capability,
    /// `name-version-release.arch` of the requiring package
    pub required_by: String,
    candidates: Vec<(PackageKey, Arc<Package>)>,
}

impl AmbiguityRecord {
    /// Record `candidates` for `requirement`; duplicate keys keep their
    /// first position and the last package seen
    pub fn new(requirement: Capability, parent: &Package, candidates: &[Arc<Package>]) -> Self {
        let mut entries: Vec<(PackageKey, Arc<Package>)> = Vec::with_capacity(candidates.len());
        for pkg in candidates {
            let key = pkg.key();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = Arc::clone(pkg),
                None => entries.push((key, Arc::clone(pkg))),
            }
        }
        Self {
            requirement,
            required_by: parent.nvra(),
            candidates: entries,
        }
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.candidates.iter().map(|(_, p)| p)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PackageKey> {
        self.candidates.iter().map(|(k, _)| k)
    }
}

impl fmt::Display for AmbiguityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.keys().map(PackageKey::as_str).collect();
        write!(
            f,
            "{} (required by {}): {}",
            self.requirement,
            self.required_by,
            keys.join(", ")
        )
    }
}

/// Whether any candidate of `record` is already in `set`
pub fn resolved(record: &AmbiguityRecord, set: &DependencySet) -> bool {
    record.keys().any(|key| set.contains(key))
}

/// Keep only the records `set` does not resolve
pub fn prune(records: Vec<AmbiguityRecord>, set: &DependencySet) -> Vec<AmbiguityRecord> {
    records.into_iter().filter(|r| !resolved(r, set)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::pkg;

    fn record() -> AmbiguityRecord {
        let parent = pkg("app", "x86_64", "1-1");
        let candidates = vec![
            Arc::new(pkg("foo-1", "x86_64", "1-1")),
            Arc::new(pkg("foo-2", "x86_64", "1-1")),
            Arc::new(pkg("foo-1", "x86_64", "1-2")),
        ];
        AmbiguityRecord::new(Capability::new("libfoo"), &parent, &candidates)
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let rec = record();
        let keys: Vec<_> = rec.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["foo-1#x86_64", "foo-2#x86_64"]);
        assert_eq!(rec.candidates().next().unwrap().release(), "2");
        assert_eq!(
            rec.to_string(),
            "libfoo (required by app-1-1.x86_64): foo-1#x86_64, foo-2#x86_64"
        );
    }

    #[test]
    fn test_prune_resolved() {
        let mut set = DependencySet::new();
        let records = vec![record()];
        let records = prune(records, &set);
        assert_eq!(records.len(), 1);

        set.insert(Arc::new(pkg("foo-2", "x86_64", "1-1")));
        assert!(resolved(&records[0], &set));
        assert!(prune(records, &set).is_empty());
    }
}
