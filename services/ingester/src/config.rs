//! Ingester configuration.
//!
//! Command-line flags with environment fallbacks for the two required paths:
//! `CLUSTER_DB` for the store file and `SAT_ARCHIVE` for the archive root.
//! The checked configuration is immutable and handed to every stage.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fdc-ingester")]
#[command(about = "Group satellite fire pixels into clusters and store them")]
pub struct Args {
    /// Path to the cluster store file
    #[arg(short, long, env = "CLUSTER_DB")]
    pub store_file: PathBuf,

    /// Root of the satellite archive directory tree to walk
    #[arg(short, long, env = "SAT_ARCHIVE")]
    pub archive_root: PathBuf,

    /// Path for the KML run summary (defaults to the store path plus ".kml")
    #[arg(short, long)]
    pub kml_file: Option<PathBuf>,

    /// Only process granules newer than the newest already stored for each
    /// satellite and sector
    #[arg(short = 'n', long = "new")]
    pub only_new: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Checked, immutable run configuration.
#[derive(Debug, Clone)]
pub struct IngesterConfig {
    pub store_file: PathBuf,
    pub kml_file: PathBuf,
    pub archive_root: PathBuf,
    pub only_new: bool,
    pub verbose: bool,
}

impl IngesterConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        if !args.archive_root.is_dir() {
            bail!(
                "archive root is not a directory: {}",
                args.archive_root.display()
            );
        }

        if let Some(parent) = args.store_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("store directory does not exist: {}", parent.display());
            }
        }

        let kml_file = args.kml_file.unwrap_or_else(|| {
            let mut name = args.store_file.clone().into_os_string();
            name.push(".kml");
            PathBuf::from(name)
        });

        Ok(IngesterConfig {
            store_file: args.store_file,
            kml_file,
            archive_root: args.archive_root,
            only_new: args.only_new,
            verbose: args.verbose,
        })
    }
}
