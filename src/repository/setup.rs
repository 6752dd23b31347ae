// src/repository/setup.rs

//! Repository configuration and index construction
//!
//! A release is described by a binary repository and its paired source
//! repository (`<name>-source`). Override repositories carry rebuilt
//! packages at a higher priority; they are optional and a failure to load
//! them only produces a warning.

use super::cache::RepoCache;
use super::client::Fetch;
use super::repo::{CachedExtLoader, Repo};
use crate::error::{Error, Result};
use crate::index::PackageIndex;
use crate::packages::ArchPolicy;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, warn};

/// Priority of override repositories; plain repositories use 0
pub const OVERRIDE_PRIORITY: i32 = 99;

const FEDORA_MIRROR: &str = "http://dl.fedoraproject.org/pub";
const OVERRIDE_MIRROR: &str =
    "https://fedorapeople.org/groups/modularity/repos/fedora/gencore-override";

/// One repository to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    pub name: String,
    pub baseurl: String,
    pub priority: i32,
    /// Whether a load failure aborts index construction
    pub required: bool,
}

impl RepoDescriptor {
    pub fn new(name: impl Into<String>, baseurl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            baseurl: baseurl.into(),
            priority: 0,
            required: true,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Which distribution release to resolve against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSetup {
    pub os: String,
    pub version: u32,
    pub milestone: Option<String>,
    pub arch: String,
    /// Whether to add the gencore override repositories
    pub overrides: bool,
    /// Local repository layered on top at override priority
    pub local_override: Option<PathBuf>,
}

impl Default for RepoSetup {
    fn default() -> Self {
        Self {
            os: "Fedora".to_string(),
            version: 25,
            milestone: None,
            arch: "x86_64".to_string(),
            overrides: true,
            local_override: None,
        }
    }
}

fn is_secondary_arch(arch: &str) -> bool {
    !matches!(arch, "x86_64" | "armhfp" | "i386")
}

impl RepoSetup {
    fn is_rawhide(&self) -> Result<bool> {
        match self.os.as_str() {
            "Fedora" => Ok(false),
            "Rawhide" => Ok(true),
            other => Err(Error::InvalidConfig(format!(
                "Unsupported OS '{}': only Fedora and Rawhide are supported",
                other
            ))),
        }
    }

    /// Release path component: `25`, `test/26_Alpha` or `rawhide`
    pub fn version_path(&self) -> Result<String> {
        if self.is_rawhide()? {
            return Ok("rawhide".to_string());
        }
        Ok(match &self.milestone {
            Some(milestone) => format!("test/{}_{}", self.version, milestone),
            None => self.version.to_string(),
        })
    }

    fn release_root(&self, tree: &str) -> Result<String> {
        let vp = self.version_path()?;
        if self.is_rawhide()? {
            Ok(format!("{}/{}/development/rawhide", FEDORA_MIRROR, tree))
        } else {
            Ok(format!("{}/{}/releases/{}", FEDORA_MIRROR, tree, vp))
        }
    }

    /// Repositories to load, in index order
    pub fn descriptors(&self) -> Result<Vec<RepoDescriptor>> {
        let vp = self.version_path()?;
        let base_name = format!("depchase-{}-{}", self.os, vp);

        let binary_tree = if is_secondary_arch(&self.arch) {
            "fedora-secondary"
        } else {
            "fedora/linux"
        };
        let binary_url = format!("{}/Everything/{}/os", self.release_root(binary_tree)?, self.arch);
        // Sources always come from the primary tree
        let source_url = format!("{}/Everything/source/tree", self.release_root("fedora/linux")?);

        let mut repos = vec![
            RepoDescriptor::new(base_name.clone(), binary_url),
            RepoDescriptor::new(format!("{}-source", base_name), source_url),
        ];

        if self.overrides {
            let override_name = format!("depchase-{}-override", vp);
            repos.push(
                RepoDescriptor::new(
                    override_name.clone(),
                    format!("{}/{}/{}/os", OVERRIDE_MIRROR, vp, self.arch),
                )
                .with_priority(OVERRIDE_PRIORITY)
                .optional(),
            );
            repos.push(
                RepoDescriptor::new(
                    format!("{}-source", override_name),
                    format!("{}/{}/source/tree", OVERRIDE_MIRROR, vp),
                )
                .with_priority(OVERRIDE_PRIORITY)
                .optional(),
            );
        }

        if let Some(path) = &self.local_override {
            repos.push(
                RepoDescriptor::new("depchase-local-override", path.display().to_string())
                    .with_priority(OVERRIDE_PRIORITY),
            );
        }

        Ok(repos)
    }
}

/// Load every repository into a fresh index
///
/// File-list extensions are registered as stubs and fetched on first use
/// through the same fetcher and cache.
pub fn load_index(
    descriptors: &[RepoDescriptor],
    arch: ArchPolicy,
    fetch: Rc<dyn Fetch>,
    cache: RepoCache,
) -> Result<PackageIndex> {
    let mut index = PackageIndex::new(arch);
    let mut loaded = Vec::new();

    for desc in descriptors {
        let mut repo = Repo::new(desc.name.clone(), desc.baseurl.clone());
        let data = match repo.load(fetch.as_ref(), &cache) {
            Ok(data) => data,
            Err(e) if !desc.required => {
                warn!(
                    "Repository {} could not be loaded ({}); proceeding without it",
                    desc.name, e
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        index.add_repo(desc.name.clone(), desc.priority);
        for pkg in data.packages {
            index.add_package(pkg);
        }
        for stub in data.stubs {
            index.add_stub(stub);
        }
        loaded.push(repo);
    }

    info!("Index holds {} packages from {} repositories", index.len(), loaded.len());
    index.set_extension_loader(Box::new(CachedExtLoader::new(loaded, fetch, cache)));
    Ok(index)
}

/// Configure the release repositories and load them
pub fn prep_repositories(setup: &RepoSetup, fetch: Rc<dyn Fetch>, cache: RepoCache) -> Result<PackageIndex> {
    let descriptors = setup.descriptors()?;
    load_index(&descriptors, ArchPolicy::new(setup.arch.clone()), fetch, cache)
}
