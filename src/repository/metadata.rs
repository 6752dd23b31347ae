// src/repository/metadata.rs

//! rpm-md repodata parsing
//!
//! Three documents are understood:
//! - `repomd.xml`: index of the other metadata files with their checksums
//! - `primary.xml`: packages with their dependencies and a file subset
//! - `filelists.xml`: complete file lists keyed by package checksum
//!
//! `rpmlib(...)` requirements describe rpm features rather than packages
//! and are dropped while parsing.

use crate::error::{Error, Result};
use crate::index::{FileListData, FileListEntry};
use crate::packages::{Capability, Package, Relation};
use crate::version::RpmVersion;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One `<data>` element of repomd.xml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMdEntry {
    pub kind: String,
    pub location: String,
    /// Checksum type and value
    pub checksum: Option<(String, String)>,
}

/// Parsed repomd.xml
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMd {
    pub entries: Vec<RepoMdEntry>,
}

impl RepoMd {
    /// Entry of the given type (`primary`, `filelists`, ...)
    pub fn find(&self, kind: &str) -> Option<&RepoMdEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }
}

fn xml_err(e: impl std::fmt::Display) -> Error {
    Error::ParseError(format!("Malformed repodata XML: {}", e))
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a.map_err(xml_err)?;
        if a.key.as_ref() == key {
            return Ok(Some(a.unescape_value().map_err(xml_err)?.into_owned()));
        }
    }
    Ok(None)
}

fn reader(data: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(data);
    reader.trim_text(true);
    reader
}

/// Parse repomd.xml
pub fn parse_repomd(data: &[u8]) -> Result<RepoMd> {
    let mut reader = reader(data);
    let mut buf = Vec::new();
    let mut repomd = RepoMd::default();
    let mut current: Option<RepoMdEntry> = None;
    let mut in_checksum = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"data" => {
                    current = Some(RepoMdEntry {
                        kind: attr(&e, b"type")?.unwrap_or_default(),
                        location: String::new(),
                        checksum: None,
                    });
                }
                b"location" => {
                    if let Some(entry) = current.as_mut() {
                        entry.location = attr(&e, b"href")?.unwrap_or_default();
                    }
                }
                b"checksum" => {
                    if let Some(entry) = current.as_mut() {
                        let kind = attr(&e, b"type")?.unwrap_or_else(|| "sha256".to_string());
                        entry.checksum = Some((kind, String::new()));
                        in_checksum = true;
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_checksum {
                    if let Some((_, value)) = current.as_mut().and_then(|e| e.checksum.as_mut()) {
                        *value = t.unescape().map_err(xml_err)?.trim().to_string();
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"checksum" => in_checksum = false,
                b"data" => {
                    if let Some(entry) = current.take() {
                        repomd.entries.push(entry);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(repomd)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Provides,
    Requires,
    Recommends,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    None,
    Name,
    Arch,
    PkgId,
    SourceRpm,
    File,
}

fn parse_entry(e: &BytesStart<'_>) -> Result<Option<(Capability, bool)>> {
    let Some(name) = attr(e, b"name")? else {
        return Ok(None);
    };
    let pre = attr(e, b"pre")?.is_some_and(|v| v == "1");

    let relation = attr(e, b"flags")?.and_then(|f| Relation::from_flags(&f));
    let cap = match (relation, attr(e, b"ver")?) {
        (Some(relation), Some(ver)) => {
            let epoch = match attr(e, b"epoch")? {
                Some(epoch) => epoch
                    .parse::<u64>()
                    .map_err(|err| Error::ParseError(format!("Invalid epoch '{}': {}", epoch, err)))?,
                None => 0,
            };
            let evr = RpmVersion::new(epoch, ver, attr(e, b"rel")?);
            Capability::versioned(name, relation, evr)
        }
        _ => Capability::new(name),
    };
    Ok(Some((cap, pre)))
}

fn parse_version(e: &BytesStart<'_>) -> Result<RpmVersion> {
    let epoch = attr(e, b"epoch")?
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|err| Error::ParseError(format!("Invalid epoch '{}': {}", s, err)))
        })
        .transpose()?
        .unwrap_or(0);
    let ver = attr(e, b"ver")?
        .ok_or_else(|| Error::ParseError("Package version without 'ver'".to_string()))?;
    Ok(RpmVersion::new(epoch, ver, attr(e, b"rel")?))
}

/// Parse primary.xml into packages belonging to `repo`
pub fn parse_primary(data: &[u8], repo: &str) -> Result<Vec<Package>> {
    let mut reader = reader(data);
    let mut buf = Vec::new();
    let mut packages = Vec::new();
    let mut current: Option<Package> = None;
    let mut section = Section::None;
    let mut field = TextField::None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_err)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = e.local_name();
                match name.as_ref() {
                    b"package" => {
                        let mut pkg = Package::new(String::new(), String::new(), RpmVersion::new(0, "0", None));
                        pkg.repo = repo.to_string();
                        current = Some(pkg);
                    }
                    _ if current.is_none() => {}
                    b"name" if section == Section::None => field = TextField::Name,
                    b"arch" if section == Section::None => field = TextField::Arch,
                    b"checksum" => {
                        if attr(e, b"pkgid")?.is_some_and(|v| v == "YES") {
                            field = TextField::PkgId;
                        }
                    }
                    b"version" => {
                        if let Some(pkg) = current.as_mut() {
                            pkg.evr = parse_version(e)?;
                        }
                    }
                    b"sourcerpm" => field = TextField::SourceRpm,
                    b"file" => field = TextField::File,
                    b"provides" => section = Section::Provides,
                    b"requires" => section = Section::Requires,
                    b"recommends" => section = Section::Recommends,
                    b"conflicts" | b"obsoletes" | b"suggests" | b"supplements" | b"enhances" => {
                        section = Section::Ignored
                    }
                    b"entry" => {
                        if let (Some(pkg), Some((cap, pre))) = (current.as_mut(), parse_entry(e)?) {
                            match section {
                                Section::Provides => pkg.provides.push(cap),
                                Section::Requires if cap.name.starts_with("rpmlib(") => {}
                                Section::Requires if pre => pkg.requires_pre.push(cap),
                                Section::Requires => pkg.requires.push(cap),
                                Section::Recommends => pkg.recommends.push(cap),
                                Section::None | Section::Ignored => {}
                            }
                        }
                    }
                    _ => {}
                }
                if is_empty {
                    match name.as_ref() {
                        b"provides" | b"requires" | b"recommends" | b"conflicts" | b"obsoletes"
                        | b"suggests" | b"supplements" | b"enhances" => section = Section::None,
                        _ => {}
                    }
                    field = TextField::None;
                }
            }
            Event::Text(ref t) => {
                if let Some(pkg) = current.as_mut() {
                    let text = t.unescape().map_err(xml_err)?.trim().to_string();
                    match field {
                        TextField::Name => pkg.name = text,
                        TextField::Arch => pkg.arch = text,
                        TextField::PkgId => pkg.pkgid = text,
                        TextField::SourceRpm if !text.is_empty() => pkg.sourcerpm = Some(text),
                        TextField::File => pkg.files.push(text),
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                match e.local_name().as_ref() {
                    b"package" => {
                        if let Some(pkg) = current.take() {
                            if pkg.name.is_empty() || pkg.arch.is_empty() {
                                return Err(Error::ParseError(
                                    "Package without name or arch in primary metadata".to_string(),
                                ));
                            }
                            packages.push(pkg);
                        }
                    }
                    b"provides" | b"requires" | b"recommends" | b"conflicts" | b"obsoletes"
                    | b"suggests" | b"supplements" | b"enhances" => section = Section::None,
                    _ => {}
                }
                field = TextField::None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(packages)
}

/// Parse filelists.xml
pub fn parse_filelists(data: &[u8]) -> Result<FileListData> {
    let mut reader = reader(data);
    let mut buf = Vec::new();
    let mut out = FileListData::default();
    let mut current: Option<FileListEntry> = None;
    let mut in_file = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"package" => {
                    current = Some(FileListEntry {
                        pkgid: attr(&e, b"pkgid")?.unwrap_or_default(),
                        name: attr(&e, b"name")?.unwrap_or_default(),
                        arch: attr(&e, b"arch")?.unwrap_or_default(),
                        files: Vec::new(),
                    });
                }
                b"file" => in_file = true,
                _ => {}
            },
            Event::Text(t) => {
                if in_file {
                    if let Some(entry) = current.as_mut() {
                        entry.files.push(t.unescape().map_err(xml_err)?.trim().to_string());
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"file" => in_file = false,
                b"package" => {
                    if let Some(entry) = current.take() {
                        out.entries.push(entry);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
