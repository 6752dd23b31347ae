// src/repository/cache.rs

//! Checksum-verified on-disk cache of parsed repository metadata
//!
//! File layout:
//! - main file `<name>.cache`: `[body][extcookie: 32][cookie: 32]`
//! - extension file `<name>-<EXT>.cachex`: `[body][extcookie: 32]`
//!
//! The cookie is SHA-256 over a format tag and the raw bytes of
//! `repomd.xml`, so any upstream change invalidates the main file. The
//! extcookie additionally mixes in the stat fingerprint of the freshly
//! written main file, binding extension files to one generation of it.
//!
//! Files are written to a `.newcache-*` temporary in the cache directory
//! and renamed into place. Readers never observe a partial file under the
//! canonical name.

use crate::error::{Error, Result};
use crate::hash::{COOKIE_LEN, Cookie, sha256_parts};
use filetime::FileTime;
use std::fs::{self, File, Permissions};
use std::io::Write;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Format tag mixed into every cookie
pub const CACHE_FORMAT_TAG: &[u8] = b"1.1";

/// Prefix of temporary files in the cache directory
const TEMP_PREFIX: &str = ".newcache-";

/// Compute the cookie of a repository generation from its repomd.xml
pub fn calc_cookie(repomd: &[u8]) -> Cookie {
    sha256_parts(&[CACHE_FORMAT_TAG, repomd])
}

/// Compute an extcookie from a cookie and the stat fingerprint of `file`
pub fn calc_ext_cookie(file: &File, cookie: &Cookie) -> Result<Cookie> {
    let meta = file.metadata()?;
    let mut fingerprint = Vec::with_capacity(32);
    fingerprint.extend_from_slice(&meta.dev().to_le_bytes());
    fingerprint.extend_from_slice(&meta.ino().to_le_bytes());
    fingerprint.extend_from_slice(&meta.size().to_le_bytes());
    fingerprint.extend_from_slice(&meta.mtime().to_le_bytes());
    Ok(sha256_parts(&[CACHE_FORMAT_TAG, cookie, &fingerprint]))
}

/// A cache file whose trailer matched
#[derive(Debug, Clone)]
pub struct CachedFile {
    pub body: Vec<u8>,
    /// Extcookie stored in a main file; `None` for extension files
    pub extcookie: Option<Cookie>,
}

/// Cache directory handle
#[derive(Debug, Clone)]
pub struct RepoCache {
    dir: PathBuf,
}

impl RepoCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic cache path for a repository or one of its extensions
    pub fn path(&self, name: &str, ext: Option<&str>) -> PathBuf {
        let base = name.replace('.', "_");
        let file = match ext {
            Some(ext) => format!("{}-{}.cachex", base, ext),
            None => format!("{}.cache", base),
        };
        self.dir.join(file.replace('/', "_"))
    }

    /// Read a cache file if its trailer matches `expected`
    ///
    /// `Ok(None)` means there is no cache file. A file that exists but does
    /// not validate is reported as `CorruptCache`; callers treat both as a
    /// miss. With `touch` the file's mtime is bumped on a hit.
    pub fn read(
        &self,
        name: &str,
        ext: Option<&str>,
        expected: &Cookie,
        touch: bool,
    ) -> Result<Option<CachedFile>> {
        let path = self.path(name, ext);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let corrupt = |reason: &str| Error::CorruptCache {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };

        let trailer = if ext.is_some() { COOKIE_LEN } else { 2 * COOKIE_LEN };
        if data.len() < trailer {
            return Err(corrupt("file shorter than its trailer"));
        }

        let tail = &data[data.len() - COOKIE_LEN..];
        if tail != expected.as_slice() {
            return Err(corrupt("cookie mismatch"));
        }

        let extcookie = if ext.is_none() {
            let start = data.len() - trailer;
            let mut cookie = [0u8; COOKIE_LEN];
            cookie.copy_from_slice(&data[start..start + COOKIE_LEN]);
            Some(cookie)
        } else {
            None
        };

        if touch {
            if let Err(e) = filetime::set_file_mtime(&path, FileTime::now()) {
                debug!("Could not touch {}: {}", path.display(), e);
            }
        }

        let mut body = data;
        body.truncate(body.len() - trailer);
        Ok(Some(CachedFile { body, extcookie }))
    }

    /// Atomically write a cache file
    ///
    /// For the main file (`ext == None`) the trailer is `extcookie` then
    /// `cookie`; the extcookie is computed from the temporary file when none
    /// is given. Extension files carry `extcookie` alone, which is then
    /// required. Returns the extcookie written.
    pub fn write(
        &self,
        name: &str,
        ext: Option<&str>,
        body: &[u8],
        cookie: &Cookie,
        extcookie: Option<Cookie>,
    ) -> Result<Cookie> {
        if ext.is_some() && extcookie.is_none() {
            return Err(Error::InvalidConfig(format!(
                "extension cache for {} needs an extcookie",
                name
            )));
        }

        fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)?;
        tmp.as_file().set_permissions(Permissions::from_mode(0o444))?;

        tmp.write_all(body)?;
        tmp.flush()?;

        let extcookie = match extcookie {
            Some(c) => c,
            None => calc_ext_cookie(tmp.as_file(), cookie)?,
        };
        tmp.write_all(&extcookie)?;
        if ext.is_none() {
            tmp.write_all(cookie)?;
        }
        tmp.flush()?;

        let path = self.path(name, ext);
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!("Wrote cache file {}", path.display());
        Ok(extcookie)
    }
}
