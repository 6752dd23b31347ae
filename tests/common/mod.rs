// tests/common/mod.rs

//! Shared helpers for integration tests: rpm-md repositories written to
//! temporary directories and a fetcher that records what it reads.

#![allow(dead_code)]

use depchase::Result;
use depchase::hash::sha256;
use depchase::repository::{Fetch, LocalFetcher};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Package description for a generated repository
#[derive(Debug, Clone)]
pub struct TestPackage {
    pub name: String,
    pub arch: String,
    pub epoch: u64,
    pub version: String,
    pub release: String,
    pub sourcerpm: Option<String>,
    pub provides: Vec<String>,
    pub requires: Vec<String>,
    pub requires_pre: Vec<String>,
    pub files: Vec<String>,
}

impl TestPackage {
    /// A binary package whose source is `<name>-<version>-<release>.src.rpm`
    pub fn binary(name: &str, arch: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            arch: arch.to_string(),
            epoch: 0,
            version: version.to_string(),
            release: "1".to_string(),
            sourcerpm: Some(format!("{}-{}-1.src.rpm", name, version)),
            provides: Vec::new(),
            requires: Vec::new(),
            requires_pre: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn source(name: &str, version: &str) -> Self {
        Self {
            sourcerpm: None,
            ..Self::binary(name, "src", version)
        }
    }

    pub fn requires(mut self, caps: &[&str]) -> Self {
        self.requires.extend(caps.iter().map(|c| c.to_string()));
        self
    }

    /// Requirements marked `pre="1"`
    pub fn requires_pre(mut self, caps: &[&str]) -> Self {
        self.requires_pre.extend(caps.iter().map(|c| c.to_string()));
        self
    }

    pub fn epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn provides(mut self, caps: &[&str]) -> Self {
        self.provides.extend(caps.iter().map(|c| c.to_string()));
        self
    }

    pub fn files(mut self, files: &[&str]) -> Self {
        self.files.extend(files.iter().map(|f| f.to_string()));
        self
    }

    pub fn source_of(mut self, sourcerpm: &str) -> Self {
        self.sourcerpm = Some(sourcerpm.to_string());
        self
    }

    fn pkgid(&self) -> String {
        sha256(format!("{}-{}-{}.{}", self.name, self.version, self.release, self.arch).as_bytes())
    }

    /// `<rpm:entry>` for `name` or `name OP [epoch:]version[-release]`
    fn entry(cap: &str, pre: bool) -> String {
        let parts: Vec<&str> = cap.split_whitespace().collect();
        let mut xml = format!("      <rpm:entry name=\"{}\"", parts[0]);
        if let [_, op, evr] = parts.as_slice() {
            let flags = match *op {
                "=" => "EQ",
                ">=" => "GE",
                "<=" => "LE",
                ">" => "GT",
                "<" => "LT",
                other => panic!("unknown relation {other}"),
            };
            let (epoch, rest) = evr.split_once(':').unwrap_or(("0", *evr));
            xml.push_str(&format!(" flags=\"{}\" epoch=\"{}\"", flags, epoch));
            match rest.split_once('-') {
                Some((ver, rel)) => xml.push_str(&format!(" ver=\"{}\" rel=\"{}\"", ver, rel)),
                None => xml.push_str(&format!(" ver=\"{}\"", rest)),
            }
        }
        if pre {
            xml.push_str(" pre=\"1\"");
        }
        xml.push_str("/>\n");
        xml
    }

    fn entries(tag: &str, caps: &[String], pre: &[String]) -> String {
        if caps.is_empty() && pre.is_empty() {
            return String::new();
        }
        let mut xml = format!("    <rpm:{}>\n", tag);
        for cap in pre {
            xml.push_str(&Self::entry(cap, true));
        }
        for cap in caps {
            xml.push_str(&Self::entry(cap, false));
        }
        xml.push_str(&format!("    </rpm:{}>\n", tag));
        xml
    }

    fn primary_xml(&self) -> String {
        let mut xml = String::from("<package type=\"rpm\">\n");
        xml.push_str(&format!("  <name>{}</name>\n  <arch>{}</arch>\n", self.name, self.arch));
        xml.push_str(&format!(
            "  <version epoch=\"{}\" ver=\"{}\" rel=\"{}\"/>\n",
            self.epoch, self.version, self.release
        ));
        xml.push_str(&format!("  <checksum type=\"sha256\" pkgid=\"YES\">{}</checksum>\n", self.pkgid()));
        xml.push_str("  <format>\n");
        match &self.sourcerpm {
            Some(s) => xml.push_str(&format!("    <rpm:sourcerpm>{}</rpm:sourcerpm>\n", s)),
            None => xml.push_str("    <rpm:sourcerpm/>\n"),
        }
        xml.push_str(&Self::entries("provides", &self.provides, &[]));
        xml.push_str(&Self::entries("requires", &self.requires, &self.requires_pre));
        for file in self.files.iter().filter(|f| depchase::index::is_primary_file(f)) {
            xml.push_str(&format!("    <file>{}</file>\n", file));
        }
        xml.push_str("  </format>\n</package>\n");
        xml
    }

    fn filelists_xml(&self) -> String {
        let mut xml = format!(
            "<package pkgid=\"{}\" name=\"{}\" arch=\"{}\">\n",
            self.pkgid(),
            self.name,
            self.arch
        );
        xml.push_str(&format!(
            "  <version epoch=\"{}\" ver=\"{}\" rel=\"{}\"/>\n",
            self.epoch, self.version, self.release
        ));
        for file in &self.files {
            xml.push_str(&format!("  <file>{}</file>\n", file));
        }
        xml.push_str("</package>\n");
        xml
    }
}

/// Write an rpm-md repository for `pkgs` under `dir`
///
/// Metadata files are stored uncompressed with correct sha256 checksums in
/// repomd.xml. Rewriting a repository with different packages changes
/// repomd.xml and therefore its cache cookie.
pub fn write_repo(dir: &Path, pkgs: &[TestPackage]) -> PathBuf {
    let repodata = dir.join("repodata");
    fs::create_dir_all(&repodata).unwrap();

    let mut primary = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<metadata xmlns=\"http://linux.duke.edu/metadata/common\" xmlns:rpm=\"http://linux.duke.edu/metadata/rpm\" packages=\"{}\">\n",
        pkgs.len()
    );
    let mut filelists = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<filelists xmlns=\"http://linux.duke.edu/metadata/filelists\" packages=\"{}\">\n",
        pkgs.len()
    );
    for pkg in pkgs {
        primary.push_str(&pkg.primary_xml());
        filelists.push_str(&pkg.filelists_xml());
    }
    primary.push_str("</metadata>\n");
    filelists.push_str("</filelists>\n");

    let primary_sum = sha256(primary.as_bytes());
    let filelists_sum = sha256(filelists.as_bytes());
    let primary_href = format!("repodata/{}-primary.xml", primary_sum);
    let filelists_href = format!("repodata/{}-filelists.xml", filelists_sum);
    fs::write(dir.join(&primary_href), &primary).unwrap();
    fs::write(dir.join(&filelists_href), &filelists).unwrap();

    let repomd = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<repomd xmlns="http://linux.duke.edu/metadata/repo">
  <data type="primary">
    <checksum type="sha256">{}</checksum>
    <location href="{}"/>
  </data>
  <data type="filelists">
    <checksum type="sha256">{}</checksum>
    <location href="{}"/>
  </data>
</repomd>
"#,
        primary_sum, primary_href, filelists_sum, filelists_href
    );
    fs::write(repodata.join("repomd.xml"), repomd).unwrap();
    dir.to_path_buf()
}

/// Local fetcher that records every path it reads
#[derive(Default)]
pub struct CountingFetcher {
    fetched: RefCell<Vec<String>>,
}

impl CountingFetcher {
    /// Number of reads whose path contains `fragment`
    pub fn count(&self, fragment: &str) -> usize {
        self.fetched.borrow().iter().filter(|p| p.contains(fragment)).count()
    }

    pub fn reset(&self) {
        self.fetched.borrow_mut().clear();
    }
}

impl Fetch for CountingFetcher {
    fn fetch(&self, baseurl: &str, path: &str) -> Result<Vec<u8>> {
        self.fetched.borrow_mut().push(path.to_string());
        LocalFetcher.fetch(baseurl, path)
    }
}
