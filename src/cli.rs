// src/cli.rs
//! CLI definitions for depchase
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use depchase::output::OutputFiles;
use depchase::resolver::ResolveOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "depchase")]
#[command(version)]
#[command(about = "Compute dependency closures and self-hosting sets of RPM packages", long_about = None)]
pub struct Cli {
    /// Increase logging (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which release to load and where to cache it
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Operating system ("Fedora", "Rawhide")
    #[arg(long, default_value = "Fedora")]
    pub os: String,

    /// Version of the OS repodata to compare against
    #[arg(long, default_value_t = 25)]
    pub version: u32,

    /// CPU architecture
    #[arg(long, default_value = "x86_64")]
    pub arch: String,

    /// Pre-release milestone; the final release is used when absent
    #[arg(long)]
    pub milestone: Option<String>,

    /// Local repository layered on top as an override
    #[arg(long)]
    pub local_override: Option<PathBuf>,

    /// Do not load the remote override repositories
    #[arg(long)]
    pub no_overrides: bool,

    /// Metadata cache directory (default: $DEPCHASE_CACHE_DIR or the user cache dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Provider selection policy
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Package to select when several could satisfy a requirement (repeatable)
    ///
    /// For example, --hint=glibc-minimal-langpack
    #[arg(long)]
    pub hint: Vec<String>,

    /// Package to skip during processing, with everything only it pulls in (repeatable)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Package whose selection should be traced to the package pulling it in (repeatable)
    #[arg(long)]
    pub whatreqs: Vec<String>,

    /// Follow weak (Recommends) requirements
    #[arg(long, overrides_with = "no_recommends")]
    pub recommends: bool,

    #[arg(long, overrides_with = "recommends")]
    pub no_recommends: bool,

    /// Take the first acceptable provider when no hint decides
    ///
    /// The result may differ between repository snapshots; prefer --hint.
    #[arg(long, overrides_with = "no_pick_first")]
    pub pick_first: bool,

    #[arg(long, overrides_with = "pick_first")]
    pub no_pick_first: bool,
}

impl PolicyArgs {
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            hints: self.hint.clone(),
            filters: self.filter.iter().cloned().collect(),
            whatreqs: self.whatreqs.iter().cloned().collect(),
            pick_first: self.pick_first && !self.no_pick_first,
            follow_recommends: self.recommends && !self.no_recommends,
        }
    }
}

/// Result file locations
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// File for binary package names
    #[arg(long)]
    pub binary_short_file: Option<PathBuf>,

    /// File for binary packages as epoch:name-version-release.arch
    #[arg(long)]
    pub binary_full_file: Option<PathBuf>,

    /// File for source package names
    #[arg(long)]
    pub source_short_file: Option<PathBuf>,

    /// File for source packages as epoch:name-version-release.arch
    #[arg(long)]
    pub source_full_file: Option<PathBuf>,

    /// Also write open ambiguities as JSON to this file
    #[arg(long)]
    pub json_unresolved: Option<PathBuf>,
}

impl OutputArgs {
    /// Requested paths, defaulting to `<prefix>binaries-short.txt` and friends
    pub fn files(&self, prefix: &str) -> OutputFiles {
        let defaults = OutputFiles::with_prefix(prefix);
        OutputFiles {
            binary_short: self.binary_short_file.clone().unwrap_or(defaults.binary_short),
            binary_full: self.binary_full_file.clone().unwrap_or(defaults.binary_full),
            source_short: self.source_short_file.clone().unwrap_or(defaults.source_short),
            source_full: self.source_full_file.clone().unwrap_or(defaults.source_full),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get the runtime dependencies of packages and their sources
    Neededby {
        /// Package names, optionally as name#arch
        #[arg(required = true)]
        pkgnames: Vec<String>,

        #[command(flatten)]
        policy: PolicyArgs,

        #[command(flatten)]
        repo: RepoArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Get the source packages binary packages were built from
    Getsourcerpm {
        /// Package names, optionally as name#arch
        #[arg(required = true)]
        pkgnames: Vec<String>,

        /// Print epoch:name-version-release.arch instead of the name
        #[arg(long)]
        full_name: bool,

        #[command(flatten)]
        repo: RepoArgs,
    },

    /// Get everything needed to rebuild packages from source, recursively
    Neededtoselfhost {
        /// Package names, optionally as name#arch
        #[arg(required = true)]
        pkgnames: Vec<String>,

        #[command(flatten)]
        policy: PolicyArgs,

        #[command(flatten)]
        repo: RepoArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Resolve packages with the install-set solver
    Resolve {
        /// Package names, optionally as name#arch
        #[arg(required = true)]
        pkgnames: Vec<String>,

        /// Iterate to a self-hosting set of binaries and sources
        #[arg(long)]
        selfhost: bool,

        /// Requirement to drop from every package before solving (repeatable)
        ///
        /// Defaults to a list of requirements known to be broken in Fedora
        /// when --selfhost is given.
        #[arg(long = "ignore-requirement")]
        ignore_requirement: Vec<String>,

        /// Package preferred when several could satisfy a requirement (repeatable)
        #[arg(long)]
        hint: Vec<String>,

        /// Follow weak (Recommends) requirements
        #[arg(long)]
        recommends: bool,

        #[command(flatten)]
        repo: RepoArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}
