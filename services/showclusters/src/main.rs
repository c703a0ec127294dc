//! List stored fire clusters for a region and time range.
//!
//! A read-only viewer over the cluster store: streams the rows the temporal
//! tracking pass would consume and prints one line per cluster.
//!
//! ```bash
//! CLUSTER_DB=/data/clusters.sqlite fdc-showclusters G16 CONUS \
//!     2020-08-25-00 2020-08-26-00 --bbox 44.0,-116.5,49.5,-104.0
//! ```

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use fdc_common::{BoundingBox, Coord, Satellite, Sector};
use fdc_store::ClusterStore;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fdc-showclusters")]
#[command(about = "List stored fire clusters for a region and time range")]
struct Args {
    /// Path to the cluster store file
    #[arg(short, long, env = "CLUSTER_DB")]
    store_file: PathBuf,

    /// Satellite (G16 or G17)
    #[arg(value_parser = parse_satellite)]
    satellite: Satellite,

    /// Sector (FullDisk, CONUS, Meso1, Meso2)
    #[arg(value_parser = parse_sector)]
    sector: Sector,

    /// Start of the time range (UTC) as YYYY-MM-DD-HH
    #[arg(value_parser = parse_datetime)]
    start: DateTime<Utc>,

    /// End of the time range (UTC) as YYYY-MM-DD-HH
    #[arg(value_parser = parse_datetime)]
    end: DateTime<Utc>,

    /// Bounding box as bottom_lat,left_lon,top_lat,right_lon
    #[arg(short, long, value_parser = parse_bbox)]
    #[arg(default_value = "-90.0,-180.0,90.0,180.0")]
    bbox: BoundingBox,
}

fn parse_satellite(s: &str) -> Result<Satellite> {
    Satellite::from_name(s).ok_or_else(|| anyhow!("unknown satellite: {}", s))
}

fn parse_sector(s: &str) -> Result<Sector> {
    Sector::from_name(s).ok_or_else(|| anyhow!("unknown sector: {}", s))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let padded = format!("{}:00:00", s);
    let naive = NaiveDateTime::parse_from_str(&padded, "%Y-%m-%d-%H:%M:%S")?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn parse_bbox(s: &str) -> Result<BoundingBox> {
    let corners: Vec<&str> = s.split(',').collect();
    if corners.len() != 4 {
        bail!("bounding box needs four comma-separated values");
    }

    let min_lat: f64 = corners[0].parse()?;
    let min_lon: f64 = corners[1].parse()?;
    let max_lat: f64 = corners[2].parse()?;
    let max_lon: f64 = corners[3].parse()?;

    if min_lat >= max_lat || min_lon >= max_lon {
        bail!("minimum lat/lon must be less than maximum lat/lon");
    }
    if min_lat < -90.0 || max_lat > 90.0 || min_lon < -180.0 || max_lon > 180.0 {
        bail!("lat/lon out of range");
    }

    Ok(BoundingBox::new(
        Coord::new(min_lat, min_lon),
        Coord::new(max_lat, max_lon),
    ))
}

fn main() -> Result<()> {
    std::env::set_var("TZ", "UTC");
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();

    let store = ClusterStore::connect(&args.store_file)?;
    let mut query = store.prepare_row_query()?;

    println!(
        "{:>10}  {:^19}  {:>10}  {:>11}  {:>6}  {:>10}",
        "rowid", "mid point", "lat", "lon", "pixels", "power MW"
    );

    let mut count = 0usize;
    let mut total_power = 0.0f64;

    for row in query.rows(args.satellite, args.sector, args.start, args.end, args.bbox)? {
        let row = row?;
        println!(
            "{:>10}  {}  {:>10.6}  {:>11.6}  {:>6}  {:>10.1}",
            row.rowid,
            row.mid_point.format("%Y-%m-%d %H:%M:%S"),
            row.centroid.lat,
            row.centroid.lon,
            row.cell_count,
            row.power
        );
        count += 1;
        total_power += row.power;
    }

    println!("\n{} clusters, {:.1} MW total", count, total_power);

    Ok(())
}
