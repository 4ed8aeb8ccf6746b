pub mod cli;
pub mod commands;
pub mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::core::error::ExporterResult;

pub use crate::core::config::ExportTask;
pub use crate::core::error::ExporterError;
pub use crate::core::manifest::{DependencyDescriptor, DependencyManifest, ManifestExporter};
pub use crate::core::resolve::{DependencyResolver, LocalRepositoryResolver};

/// Parse the command line, set up logging and run the chosen command.
pub fn run() -> ExporterResult<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for pipelines
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,manifest_exporter=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export(args) => commands::export(args),
        Commands::Verify {
            manifest,
            libraries,
        } => commands::verify(&manifest, &libraries),
        Commands::Fetch {
            manifest,
            libraries,
            repositories,
            concurrency,
        } => commands::fetch(&manifest, &libraries, repositories, concurrency),
    }
}
