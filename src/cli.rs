use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::resolve::ConflictStrategy;

#[derive(Parser)]
#[command(name = "manifest-exporter")]
#[command(about = "Exports resolved Maven libraries as an MD5-stamped JSON manifest")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a library set and write its manifest
    Export(ExportArgs),

    /// Check a libraries directory against a manifest
    ///
    /// Entries carry no classifier, so each one is checked against the plain
    /// `<module>-<version>.jar`. Entries exported from a classifier-only
    /// artifact always report an MD5 mismatch.
    Verify {
        /// Manifest written by `export`
        #[arg(long)]
        manifest: PathBuf,

        /// Maven-layout directory holding the libraries
        #[arg(long)]
        libraries: PathBuf,
    },

    /// Download every library a directory is missing
    ///
    /// Downloads the plain `<module>-<version>.jar` for each entry. Entries
    /// exported from a classifier-only artifact fail their MD5 check.
    Fetch {
        #[arg(long)]
        manifest: PathBuf,

        #[arg(long)]
        libraries: PathBuf,

        /// Remote Maven repository base URL, tried in order (repeatable)
        #[arg(long = "repository")]
        repositories: Vec<String>,

        /// Parallel downloads
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
    },
}

#[derive(Args)]
pub struct ExportArgs {
    /// JSON task file; when given, the flags below are ignored
    #[arg(long)]
    pub task: Option<PathBuf>,

    /// Declared dependency coordinate (repeatable)
    #[arg(long = "dependency")]
    pub dependencies: Vec<String>,

    /// Coordinate supplied elsewhere; its transitive modules are left out (repeatable)
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Extra allowed classifier; the unclassified jar is always allowed (repeatable)
    #[arg(long = "classifier")]
    pub classifiers: Vec<String>,

    /// Local Maven-layout repository (repeatable, defaults to ~/.m2/repository)
    #[arg(long = "repository")]
    pub repositories: Vec<PathBuf>,

    /// Output manifest path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Module name of the project's own API artifact
    #[arg(long)]
    pub self_module: Option<String>,

    /// How to handle one module requested at several versions
    #[arg(long, value_enum, default_value = "newest")]
    pub conflicts: ConflictArg,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum ConflictArg {
    Newest,
    Fail,
}

impl From<ConflictArg> for ConflictStrategy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Newest => ConflictStrategy::Newest,
            ConflictArg::Fail => ConflictStrategy::Fail,
        }
    }
}
