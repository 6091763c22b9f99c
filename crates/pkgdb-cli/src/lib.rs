//! pkgdb - query the installed-package registry
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Reads `packages.xml` and `packages.list` (by default from `/data/system`),
//! merges them and answers name and uid queries.

pub mod cmd;
pub mod ui;
pub mod view;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pkgdb_core::paths::{
    DEFAULT_PACKAGES_LIST, DEFAULT_PACKAGES_XML, PACKAGES_LIST_ENV, PACKAGES_XML_ENV,
};
use pkgdb_core::{
    CertificatePolicy, DbOptions, NoSelfEntry, OrphanPolicy, PackageDb, SelfEntryProvider,
    SourcePaths, default_provider,
};

/// Version string baked in by build.rs
pub const VERSION: &str = env!("PKGDB_VERSION");

#[derive(Debug, Parser)]
#[command(name = "pkgdb")]
#[command(author, version = VERSION, about = "pkgdb - query installed Android packages")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the manifests live and how to treat imperfect ones.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Markup manifest
    #[arg(long, global = true, env = PACKAGES_XML_ENV, default_value = DEFAULT_PACKAGES_XML)]
    pub packages_xml: PathBuf,

    /// Line manifest
    #[arg(long, global = true, env = PACKAGES_LIST_ENV, default_value = DEFAULT_PACKAGES_LIST)]
    pub packages_list: PathBuf,

    /// What to do with packages.list entries missing from packages.xml
    #[arg(long, global = true, value_enum, default_value_t = Orphans::Admit)]
    pub orphans: Orphans,

    /// What to do with certificates that fail to decode
    #[arg(long, global = true, value_enum, default_value_t = Certificates::Strict)]
    pub certificates: Certificates,

    /// Do not add the synthetic entry for the calling user
    #[arg(long, global = true)]
    pub no_self_entry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Orphans {
    /// Keep them as standalone records
    Admit,
    /// Drop them with a warning
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Certificates {
    /// Fail the whole load
    Strict,
    /// Keep the package without a certificate
    Lenient,
}

impl SourceArgs {
    pub fn paths(&self) -> SourcePaths {
        SourcePaths::new(&self.packages_xml, &self.packages_list)
    }

    pub fn options(&self) -> DbOptions {
        DbOptions {
            orphans: match self.orphans {
                Orphans::Admit => OrphanPolicy::Admit,
                Orphans::Skip => OrphanPolicy::Skip,
            },
            certificates: match self.certificates {
                Certificates::Strict => CertificatePolicy::Strict,
                Certificates::Lenient => CertificatePolicy::Lenient,
            },
        }
    }

    fn provider(&self) -> Box<dyn SelfEntryProvider> {
        if self.no_self_entry {
            Box::new(NoSelfEntry)
        } else {
            default_provider()
        }
    }

    /// Load both manifests.
    pub fn open(&self) -> Result<PackageDb> {
        PackageDb::open_with(self.paths(), self.options(), self.provider())
            .context("Failed to load package database")
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every package, by name
    List,
    /// Show one package in detail
    Name {
        /// Package name (case-sensitive)
        name: String,
    },
    /// Show the package(s) running under a uid
    Uid {
        /// Owner id, decimal or 0x/0o/0b prefixed
        uid: String,
        /// Show every package sharing the uid, not just the first
        #[arg(long, short = 'a')]
        all: bool,
    },
    /// Show manifest paths and snapshot details
    Status,
}
