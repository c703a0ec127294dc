//! FDC cluster ingester.
//!
//! Walks a NOAA Big Data archive of GOES-16/17 Fire Detection
//! Characteristics granules, groups fire pixels of each granule into
//! spatially connected clusters, and appends the clusters to the cluster
//! store. A later pass connects clusters across time into tracked fires; it
//! only reads the store this program fills.
//!
//! # Usage
//!
//! ```bash
//! CLUSTER_DB=/data/clusters.sqlite SAT_ARCHIVE=/data/goes fdc-ingester --new
//! ```
//!
//! Re-running over the same archive is safe: granules already in the store
//! are skipped, and duplicate cluster rows are ignored by the store's
//! uniqueness index.

mod config;
mod courier;
mod pipeline;
mod stats;
mod walker;

use anyhow::Result;
use clap::Parser;
use config::{Args, IngesterConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Everything in the archive naming convention and the store is UTC.
    std::env::set_var("TZ", "UTC");

    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = IngesterConfig::from_args(args)?;

    info!(
        store = %config.store_file.display(),
        archive = %config.archive_root.display(),
        kml = %config.kml_file.display(),
        only_new = config.only_new,
        "starting ingestion"
    );

    pipeline::run(&config)?;

    info!("ingestion finished");
    Ok(())
}
