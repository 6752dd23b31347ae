// src/repository/client.rs

//! Transport for repository metadata
//!
//! Repositories are addressed by a base URL. `http://` and `https://` URLs
//! are fetched with a retrying reqwest client; `file://` URLs and plain
//! paths are read from the local filesystem.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for failed downloads
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Something that can retrieve a file relative to a repository base URL
pub trait Fetch {
    fn fetch(&self, baseurl: &str, path: &str) -> Result<Vec<u8>>;
}

/// Join a base URL and a relative location
pub fn join_url(baseurl: &str, path: &str) -> String {
    format!("{}/{}", baseurl.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn is_remote(baseurl: &str) -> bool {
    baseurl.starts_with("http://") || baseurl.starts_with("https://")
}

/// Reads repositories from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl LocalFetcher {
    fn resolve(baseurl: &str, path: &str) -> Result<PathBuf> {
        let root = if baseurl.starts_with("file://") {
            Url::parse(baseurl)
                .map_err(|e| Error::fetch(baseurl, e))?
                .to_file_path()
                .map_err(|_| Error::fetch(baseurl, "not a local path"))?
        } else {
            PathBuf::from(baseurl)
        };
        Ok(root.join(path.trim_start_matches('/')))
    }
}

impl Fetch for LocalFetcher {
    fn fetch(&self, baseurl: &str, path: &str) -> Result<Vec<u8>> {
        let full = Self::resolve(baseurl, path)?;
        debug!("Reading {}", full.display());
        fs::read(&full).map_err(|e| Error::fetch(full.display().to_string(), e))
    }
}

/// HTTP client wrapper with retry support
pub struct RepositoryClient {
    client: Client,
    max_retries: u32,
}

impl RepositoryClient {
    /// Create a new repository client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Download a URL to bytes, retrying transport failures
    ///
    /// A non-success status is returned immediately without retrying.
    pub fn download_to_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => {
                    if !response.status().is_success() {
                        return Err(Error::fetch(url, format!("HTTP {}", response.status())));
                    }

                    let bytes = response
                        .bytes()
                        .map_err(|e| Error::fetch(url, format!("Failed to read response: {e}")))?;
                    debug!("Fetched {} bytes from {}", bytes.len(), url);
                    return Ok(bytes.to_vec());
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::fetch(
                            url,
                            format!("failed after {attempt} attempts: {e}"),
                        ));
                    }
                    warn!("Fetch attempt {} for {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }
}

impl Fetch for RepositoryClient {
    fn fetch(&self, baseurl: &str, path: &str) -> Result<Vec<u8>> {
        if is_remote(baseurl) {
            self.download_to_bytes(&join_url(baseurl, path))
        } else {
            LocalFetcher.fetch(baseurl, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://example.com/os/", "repodata/repomd.xml"),
            "http://example.com/os/repodata/repomd.xml"
        );
        assert_eq!(join_url("/srv/repo", "/repodata/x"), "/srv/repo/repodata/x");
    }

    #[test]
    fn test_local_fetch_plain_path_and_file_url() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("repodata")).unwrap();
        fs::write(dir.path().join("repodata/repomd.xml"), b"<repomd/>").unwrap();

        let base = dir.path().to_str().unwrap();
        assert_eq!(LocalFetcher.fetch(base, "repodata/repomd.xml").unwrap(), b"<repomd/>");

        let url = Url::from_directory_path(dir.path()).unwrap();
        assert_eq!(
            LocalFetcher.fetch(url.as_str(), "repodata/repomd.xml").unwrap(),
            b"<repomd/>"
        );
    }

    #[test]
    fn test_local_fetch_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = LocalFetcher
            .fetch(dir.path().to_str().unwrap(), "repodata/repomd.xml")
            .unwrap_err();
        assert!(matches!(err, Error::FetchFailure { .. }));
    }
}
