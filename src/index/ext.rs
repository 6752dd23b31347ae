// src/index/ext.rs

//! Lazily loaded extension blocks
//!
//! Primary metadata only lists the files most packages depend on. The full
//! file lists live in a separate `filelists` document that is registered as
//! a stub when a repository is loaded and fetched on the first query that
//! needs it.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Extension tag of the file-list block
pub const FILELISTS_EXT: &str = "FL";

/// Whether a path is covered by primary metadata
///
/// Primary metadata carries `/etc/*`, anything under a `bin/` directory and
/// `/usr/lib/sendmail`. Every other path needs the file-list extension.
pub fn is_primary_file(path: &str) -> bool {
    path.starts_with("/etc/") || path.contains("bin/") || path == "/usr/lib/sendmail"
}

/// A registered but not yet loaded extension block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtStub {
    /// Repository the block belongs to
    pub repo: String,
    /// Extension tag, used in the cache file name
    pub ext: String,
    /// Location of the document relative to the repository base URL
    pub location: String,
    /// Checksum type and value advertised by repomd.xml
    pub checksum: Option<(String, String)>,
}

/// File list of one package inside an extension block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListEntry {
    pub pkgid: String,
    pub name: String,
    pub arch: String,
    pub files: Vec<String>,
}

/// Decoded contents of a file-list extension block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListData {
    pub entries: Vec<FileListEntry>,
}

/// Loads extension blocks on demand
///
/// The index calls this once per pending stub, the first time a query
/// needs data that only the extension carries.
pub trait ExtensionLoader {
    fn load(&self, stub: &ExtStub) -> Result<FileListData>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_file_subset() {
        assert!(is_primary_file("/etc/passwd"));
        assert!(is_primary_file("/usr/bin/python3"));
        assert!(is_primary_file("/usr/sbin/useradd"));
        assert!(is_primary_file("/usr/lib/sendmail"));
        assert!(!is_primary_file("/usr/lib64/libfoo.so.1"));
        assert!(!is_primary_file("/usr/share/doc/foo/README"));
    }
}
