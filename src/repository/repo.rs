// src/repository/repo.rs

//! Loading one repository through the cache

use super::cache::{RepoCache, calc_cookie};
use super::client::Fetch;
use super::metadata::{RepoMdEntry, parse_filelists, parse_primary, parse_repomd};
use crate::compression::decompress_auto;
use crate::error::{Error, Result};
use crate::hash::{ChecksumType, Cookie, verify_checksum};
use crate::index::{ExtStub, ExtensionLoader, FileListData, ext::FILELISTS_EXT};
use crate::packages::Package;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Location of the repository description relative to the base URL
pub const REPOMD_PATH: &str = "repodata/repomd.xml";

/// Everything the main cache file stores for a repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoData {
    pub packages: Vec<Package>,
    pub stubs: Vec<ExtStub>,
}

/// A repository and the cookies of the generation last loaded
#[derive(Debug, Clone)]
pub struct Repo {
    pub name: String,
    pub baseurl: String,
    cookie: Option<Cookie>,
    extcookie: Option<Cookie>,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| Error::ParseError(format!("Failed to encode cache body: {}", e)))?;
    Ok(buf)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    ciborium::from_reader(body)
        .map_err(|e| Error::ParseError(format!("Failed to decode cache body: {}", e)))
}

impl Repo {
    pub fn new(name: impl Into<String>, baseurl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            baseurl: baseurl.into(),
            cookie: None,
            extcookie: None,
        }
    }

    pub fn cookie(&self) -> Option<&Cookie> {
        self.cookie.as_ref()
    }

    pub fn extcookie(&self) -> Option<&Cookie> {
        self.extcookie.as_ref()
    }

    /// Fetch a metadata document, verify its checksum and decompress it
    fn fetch_document(&self, fetch: &dyn Fetch, entry: &RepoMdEntry) -> Result<Vec<u8>> {
        let raw = fetch.fetch(&self.baseurl, &entry.location)?;
        match &entry.checksum {
            Some((kind, value)) => {
                let kind: ChecksumType = kind.parse().unwrap_or(ChecksumType::Other);
                verify_checksum(&entry.location, kind, value, &raw)?;
            }
            None => warn!("No checksum for {} in {}", entry.location, self.name),
        }
        decompress_auto(&entry.location, &raw)
    }

    /// Load the repository, from the cache when its cookie still matches
    ///
    /// Only a failure to retrieve `repomd.xml` or the primary document is
    /// an error. Cache problems fall back to a full load, and a failed
    /// cache write is logged and ignored.
    pub fn load(&mut self, fetch: &dyn Fetch, cache: &RepoCache) -> Result<RepoData> {
        let repomd_raw = fetch.fetch(&self.baseurl, REPOMD_PATH)?;
        let cookie = calc_cookie(&repomd_raw);
        self.cookie = Some(cookie);
        self.extcookie = None;

        match cache.read(&self.name, None, &cookie, true) {
            Ok(Some(hit)) => match decode::<RepoData>(&hit.body) {
                Ok(data) => {
                    info!("Loaded {} from cache ({} packages)", self.name, data.packages.len());
                    self.extcookie = hit.extcookie;
                    return Ok(data);
                }
                Err(e) => debug!("Ignoring cache for {}: {}", self.name, e),
            },
            Ok(None) => debug!("No cache for {}", self.name),
            Err(e) => debug!("Ignoring cache for {}: {}", self.name, e),
        }

        let repomd = parse_repomd(&repomd_raw)?;
        let primary = repomd.find("primary").ok_or_else(|| {
            Error::ParseError(format!("{} has no primary metadata", self.name))
        })?;
        let packages = parse_primary(&self.fetch_document(fetch, primary)?, &self.name)?;

        let stubs = repomd
            .find("filelists")
            .map(|entry| ExtStub {
                repo: self.name.clone(),
                ext: FILELISTS_EXT.to_string(),
                location: entry.location.clone(),
                checksum: entry.checksum.clone(),
            })
            .into_iter()
            .collect();

        let data = RepoData { packages, stubs };
        info!("Fetched {} ({} packages)", self.name, data.packages.len());

        match encode(&data).and_then(|body| cache.write(&self.name, None, &body, &cookie, None)) {
            Ok(extcookie) => self.extcookie = Some(extcookie),
            Err(e) => warn!("Could not write cache for {}: {}", self.name, e),
        }

        Ok(data)
    }

    /// Load an extension block, from its cache file when the extcookie matches
    ///
    /// Without an extcookie (the main cache write failed) extension data is
    /// neither read from nor written to the cache.
    pub fn load_ext(&self, stub: &ExtStub, fetch: &dyn Fetch, cache: &RepoCache) -> Result<FileListData> {
        if let Some(extcookie) = &self.extcookie {
            match cache.read(&self.name, Some(&stub.ext), extcookie, false) {
                Ok(Some(hit)) => match decode::<FileListData>(&hit.body) {
                    Ok(data) => {
                        debug!("Loaded {} extension of {} from cache", stub.ext, self.name);
                        return Ok(data);
                    }
                    Err(e) => debug!("Ignoring {} cache for {}: {}", stub.ext, self.name, e),
                },
                Ok(None) => {}
                Err(e) => debug!("Ignoring {} cache for {}: {}", stub.ext, self.name, e),
            }
        }

        let entry = RepoMdEntry {
            kind: stub.ext.clone(),
            location: stub.location.clone(),
            checksum: stub.checksum.clone(),
        };
        let data = parse_filelists(&self.fetch_document(fetch, &entry)?)?;

        if let (Some(cookie), Some(extcookie)) = (self.cookie, self.extcookie) {
            let written = encode(&data).and_then(|body| {
                cache.write(&self.name, Some(&stub.ext), &body, &cookie, Some(extcookie))
            });
            if let Err(e) = written {
                warn!("Could not write {} cache for {}: {}", stub.ext, self.name, e);
            }
        }

        Ok(data)
    }
}

/// Extension loader over the repositories an index was built from
pub struct CachedExtLoader {
    repos: HashMap<String, Repo>,
    fetch: Rc<dyn Fetch>,
    cache: RepoCache,
}

impl CachedExtLoader {
    pub fn new(repos: impl IntoIterator<Item = Repo>, fetch: Rc<dyn Fetch>, cache: RepoCache) -> Self {
        Self {
            repos: repos.into_iter().map(|r| (r.name.clone(), r)).collect(),
            fetch,
            cache,
        }
    }
}

impl ExtensionLoader for CachedExtLoader {
    fn load(&self, stub: &ExtStub) -> Result<FileListData> {
        let repo = self.repos.get(&stub.repo).ok_or_else(|| {
            Error::InvalidConfig(format!("extension stub for unknown repository {}", stub.repo))
        })?;
        repo.load_ext(stub, self.fetch.as_ref(), &self.cache)
    }
}
