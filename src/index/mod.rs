// src/index/mod.rs

//! In-memory package index
//!
//! The index answers the two queries the resolver needs: packages by name
//! and packages by provided capability, both restricted to one architecture
//! and optionally to the latest version. Results always come back in
//! insertion order (repository order, then document order), which keeps
//! first-match policies reproducible across runs.
//!
//! File-path capabilities are answered from the file subset shipped in
//! primary metadata. A path outside that subset triggers loading of every
//! pending file-list extension through the registered [`ExtensionLoader`].

pub mod ext;
pub mod lookup;

pub use ext::{ExtStub, ExtensionLoader, FileListData, FileListEntry, is_primary_file};
pub use lookup::Lookup;

use crate::error::Result;
use crate::packages::{ArchPolicy, Capability, Package};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Requirements the Fedora package set is known to carry broken
pub const DEFAULT_DROPPED_REQUIREMENTS: &[&str] =
    &["gnu-efi = 3.0w", "gnu-efi-devel = 3.0w", "pkgconfig(botan-1.10)"];

/// A repository known to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    /// Higher wins when the same name and arch is offered by several repos
    pub priority: i32,
}

/// Package index over one or more loaded repositories
pub struct PackageIndex {
    arch: ArchPolicy,
    repos: Vec<RepoEntry>,
    packages: Vec<Arc<Package>>,
    by_name: HashMap<String, Vec<usize>>,
    by_provide: HashMap<String, Vec<usize>>,
    by_pkgid: HashMap<(String, String), usize>,
    by_file: RefCell<HashMap<String, Vec<usize>>>,
    pending: RefCell<Vec<ExtStub>>,
    loader: Option<Box<dyn ExtensionLoader>>,
}

impl std::fmt::Debug for PackageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageIndex")
            .field("arch", &self.arch)
            .field("repos", &self.repos)
            .field("packages", &self.packages.len())
            .field("pending", &self.pending)
            .field("loader", &self.loader.is_some())
            .finish_non_exhaustive()
    }
}

impl PackageIndex {
    pub fn new(arch: ArchPolicy) -> Self {
        Self {
            arch,
            repos: Vec::new(),
            packages: Vec::new(),
            by_name: HashMap::new(),
            by_provide: HashMap::new(),
            by_pkgid: HashMap::new(),
            by_file: RefCell::new(HashMap::new()),
            pending: RefCell::new(Vec::new()),
            loader: None,
        }
    }

    pub fn arch(&self) -> &ArchPolicy {
        &self.arch
    }

    /// Register a repository; packages added later may name it
    pub fn add_repo(&mut self, name: impl Into<String>, priority: i32) {
        let name = name.into();
        match self.repos.iter_mut().find(|r| r.name == name) {
            Some(entry) => entry.priority = priority,
            None => self.repos.push(RepoEntry { name, priority }),
        }
    }

    pub fn repos(&self) -> &[RepoEntry] {
        &self.repos
    }

    pub fn has_repo(&self, name: &str) -> bool {
        self.repos.iter().any(|r| r.name == name)
    }

    fn priority(&self, repo: &str) -> i32 {
        self.repos
            .iter()
            .find(|r| r.name == repo)
            .map(|r| r.priority)
            .unwrap_or(0)
    }

    /// Source repository paired with a binary repository (`<repo>-source`)
    pub fn paired_source_repo(&self, repo: &str) -> Option<&str> {
        let wanted = format!("{}-source", repo);
        self.repos
            .iter()
            .find(|r| r.name == wanted)
            .map(|r| r.name.as_str())
    }

    /// Add a package, giving it its implicit self-provide
    pub fn add_package(&mut self, mut pkg: Package) -> Arc<Package> {
        pkg.ensure_self_provide();
        if !self.has_repo(&pkg.repo) {
            self.add_repo(pkg.repo.clone(), 0);
        }

        let idx = self.packages.len();
        self.by_name.entry(pkg.name.clone()).or_default().push(idx);
        for provide in &pkg.provides {
            let slot = self.by_provide.entry(provide.name.clone()).or_default();
            if slot.last() != Some(&idx) {
                slot.push(idx);
            }
        }
        {
            let mut by_file = self.by_file.borrow_mut();
            for file in &pkg.files {
                by_file.entry(file.clone()).or_default().push(idx);
            }
        }
        if !pkg.pkgid.is_empty() {
            self.by_pkgid.insert((pkg.repo.clone(), pkg.pkgid.clone()), idx);
        }

        let pkg = Arc::new(pkg);
        self.packages.push(Arc::clone(&pkg));
        pkg
    }

    /// Register an extension block to load on demand
    pub fn add_stub(&mut self, stub: ExtStub) {
        self.pending.get_mut().push(stub);
    }

    pub fn set_extension_loader(&mut self, loader: Box<dyn ExtensionLoader>) {
        self.loader = Some(loader);
    }

    pub fn pending_stubs(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn packages(&self) -> &[Arc<Package>] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Merge a file-list block into the file index
    pub fn merge_filelists(&self, repo: &str, data: &FileListData) {
        let mut by_file = self.by_file.borrow_mut();
        let mut merged = 0usize;
        for entry in &data.entries {
            let Some(&idx) = self.by_pkgid.get(&(repo.to_string(), entry.pkgid.clone())) else {
                continue;
            };
            let known = &self.packages[idx].files;
            for file in &entry.files {
                if known.contains(file) {
                    continue;
                }
                by_file.entry(file.clone()).or_default().push(idx);
            }
            merged += 1;
        }
        debug!("Merged file lists of {} packages from {}", merged, repo);
    }

    /// Load every pending extension block
    ///
    /// A stub leaves the pending list only once it has loaded, so a failed
    /// load is retried by the next query that needs file lists.
    fn load_pending(&self) -> Result<()> {
        let Some(loader) = &self.loader else {
            return Ok(());
        };
        loop {
            let Some(stub) = self.pending.borrow().first().cloned() else {
                return Ok(());
            };
            info!("Loading {} extension of {}", stub.ext, stub.repo);
            let data = loader.load(&stub)?;
            self.merge_filelists(&stub.repo, &data);
            self.pending.borrow_mut().remove(0);
        }
    }

    fn arch_matches(&self, idx: usize, arch: Option<&str>) -> bool {
        arch.is_none_or(|a| self.packages[idx].arch == a)
    }

    /// Keep, per (name, arch), the packages of the highest-priority
    /// repository with the greatest version; ties all survive
    fn latest(&self, idxs: Vec<usize>) -> Vec<usize> {
        let mut best: HashMap<(&str, &str), usize> = HashMap::new();
        for &idx in &idxs {
            let pkg = &self.packages[idx];
            let slot = best.entry((pkg.name.as_str(), pkg.arch.as_str())).or_insert(idx);
            if self.newer(idx, *slot) {
                *slot = idx;
            }
        }

        idxs.iter()
            .copied()
            .filter(|&idx| {
                let pkg = &self.packages[idx];
                let top = best[&(pkg.name.as_str(), pkg.arch.as_str())];
                !self.newer(top, idx)
            })
            .collect()
    }

    fn newer(&self, a: usize, b: usize) -> bool {
        let (pa, pb) = (&self.packages[a], &self.packages[b]);
        match self.priority(&pa.repo).cmp(&self.priority(&pb.repo)) {
            std::cmp::Ordering::Equal => pa.evr > pb.evr,
            ord => ord.is_gt(),
        }
    }

    fn collect(&self, mut idxs: Vec<usize>, arch: Option<&str>, latest: bool) -> Vec<Arc<Package>> {
        idxs.sort_unstable();
        idxs.dedup();
        idxs.retain(|&idx| self.arch_matches(idx, arch));
        if latest {
            idxs = self.latest(idxs);
        }
        idxs.into_iter().map(|idx| Arc::clone(&self.packages[idx])).collect()
    }

    /// Packages with the given name
    pub fn filter_name(&self, name: &str, arch: Option<&str>, latest: bool) -> Vec<Arc<Package>> {
        let idxs = self.by_name.get(name).cloned().unwrap_or_default();
        self.collect(idxs, arch, latest)
    }

    /// Packages providing a capability
    ///
    /// Fails only when a lazy file-list load fails.
    pub fn filter_provides(
        &self,
        cap: &Capability,
        arch: Option<&str>,
        latest: bool,
    ) -> Result<Vec<Arc<Package>>> {
        let mut idxs: Vec<usize> = self
            .by_provide
            .get(&cap.name)
            .map(|v| {
                v.iter()
                    .copied()
                    .filter(|&idx| self.packages[idx].provides.iter().any(|p| p.overlaps(cap)))
                    .collect()
            })
            .unwrap_or_default();

        if cap.is_file() && cap.range.is_none() {
            if !is_primary_file(&cap.name) && !self.pending.borrow().is_empty() {
                self.load_pending()?;
            }
            if let Some(owners) = self.by_file.borrow().get(&cap.name) {
                idxs.extend(owners.iter().copied());
            }
        }

        Ok(self.collect(idxs, arch, latest))
    }

    /// Latest providers from the first architecture tier that has any
    pub fn whatprovides(&self, cap: &Capability) -> Result<Vec<Arc<Package>>> {
        for arch in self.arch.tiers() {
            let found = self.filter_provides(cap, Some(arch), true)?;
            if !found.is_empty() {
                return Ok(found);
            }
        }
        Ok(Vec::new())
    }

    /// Remove requirements whose text matches one of `caps` from every package
    pub fn drop_requirements<S: AsRef<str>>(&mut self, caps: &[S]) {
        let wanted: Vec<&str> = caps.iter().map(AsRef::as_ref).collect();
        let mut touched = 0usize;
        for pkg in &mut self.packages {
            if !pkg.requires.iter().any(|r| wanted.contains(&r.to_string().as_str())) {
                continue;
            }
            let pkg = Arc::make_mut(pkg);
            pkg.requires.retain(|r| !wanted.contains(&r.to_string().as_str()));
            touched += 1;
        }
        debug!("Dropped requirements from {} packages", touched);
    }
}
