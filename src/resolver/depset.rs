// src/resolver/depset.rs

//! Insertion-ordered set of packages keyed by `name#arch`

use crate::packages::{Package, PackageKey};
use std::collections::HashMap;
use std::sync::Arc;

/// Packages selected by a traversal, at most one per `name#arch`
///
/// Iteration follows insertion order so output files are stable.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    order: Vec<PackageKey>,
    packages: HashMap<PackageKey, Arc<Package>>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &PackageKey) -> bool {
        self.packages.contains_key(key)
    }

    /// Whether a package with this name exists under any arch
    pub fn contains_name(&self, name: &str) -> bool {
        self.packages.values().any(|p| p.name == name)
    }

    pub fn get(&self, key: &PackageKey) -> Option<&Arc<Package>> {
        self.packages.get(key)
    }

    /// Insert a package; returns false when its key was already present
    pub fn insert(&mut self, pkg: Arc<Package>) -> bool {
        let key = pkg.key();
        if self.packages.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.packages.insert(key, pkg);
        true
    }

    /// Drop everything inserted after the first `len` packages
    pub fn truncate(&mut self, len: usize) {
        for key in self.order.drain(len.min(self.order.len())..) {
            self.packages.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PackageKey> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.order.iter().filter_map(|key| self.packages.get(key))
    }
}

impl FromIterator<Arc<Package>> for DependencySet {
    fn from_iter<I: IntoIterator<Item = Arc<Package>>>(iter: I) -> Self {
        let mut set = Self::new();
        for pkg in iter {
            set.insert(pkg);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::pkg;

    #[test]
    fn test_insert_keeps_first_and_order() {
        let mut set = DependencySet::new();
        assert!(set.insert(Arc::new(pkg("b", "x86_64", "1-1"))));
        assert!(set.insert(Arc::new(pkg("a", "noarch", "1-1"))));
        assert!(!set.insert(Arc::new(pkg("b", "x86_64", "2-1"))));

        let keys: Vec<_> = set.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["b#x86_64", "a#noarch"]);
        assert_eq!(set.get(&PackageKey::new("b", "x86_64")).unwrap().version(), "1");
        assert!(set.contains_name("a"));
    }

    #[test]
    fn test_truncate() {
        let mut set: DependencySet = ["a", "b", "c"]
            .iter()
            .map(|n| Arc::new(pkg(n, "x86_64", "1-1")))
            .collect();
        set.truncate(1);
        assert_eq!(set.len(), 1);
        assert!(!set.contains(&PackageKey::new("b", "x86_64")));
        assert!(set.insert(Arc::new(pkg("c", "x86_64", "1-1"))));
    }
}
