// src/repository/mod.rs

//! Repository loading
//!
//! This module provides:
//! - Transport for local and remote repositories
//! - rpm-md repodata parsing
//! - A checksum-verified on-disk cache of parsed metadata
//! - Release repository configuration and index construction

mod cache;
mod client;
mod metadata;
mod repo;
mod setup;

pub use cache::{CACHE_FORMAT_TAG, CachedFile, RepoCache, calc_cookie, calc_ext_cookie};
pub use client::{Fetch, LocalFetcher, RepositoryClient, join_url};
pub use metadata::{RepoMd, RepoMdEntry, parse_filelists, parse_primary, parse_repomd};
pub use repo::{CachedExtLoader, REPOMD_PATH, Repo, RepoData};
pub use setup::{OVERRIDE_PRIORITY, RepoDescriptor, RepoSetup, load_index, prep_repositories};
