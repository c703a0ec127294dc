//! The four-stage ingestion pipeline.
//!
//! `directory_walker -> path_filter -> loader -> writer`, connected by
//! bounded couriers. Fan-out is one walker, four filters, four loaders, and
//! a single writer so that all store mutation is serialized on one thread.
//! Every stage runs until its upstream courier reports end-of-stream; a
//! failed send (downstream gone) ends the stage gracefully.

use crate::config::IngesterConfig;
use crate::courier::{Courier, CourierReceiver, CourierSender};
use crate::stats::{save_biggest_cluster_kml, ClusterStats, GranuleStats};
use crate::walker;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use fdc_cluster::ClusterList;
use fdc_common::GranuleId;
use fdc_raster::{FdcGranule, GranuleReader};
use fdc_store::ClusterStore;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

const NUM_FILTER_THREADS: usize = 4;
const NUM_LOADER_THREADS: usize = 4;
const CHANNEL_CAPACITY: usize = 8;

/// Fire-mask codes worth keeping: processed and temporally filtered fire
/// pixels of good, saturated, cloud-contaminated, high-, and
/// medium-probability classes.
const KEEP_MASK_CODES: [i16; 10] = [10, 11, 12, 13, 14, 30, 31, 32, 33, 34];

/// Run the whole pipeline to completion.
pub fn run(config: &IngesterConfig) -> Result<()> {
    // Make sure the store exists with its schema before any worker connects.
    ClusterStore::connect(&config.store_file)
        .with_context(|| format!("initializing store {}", config.store_file.display()))?;

    let newest = if config.only_new {
        Some(walker::load_newest_snapshot(&config.store_file)?)
    } else {
        None
    };

    let paths: Courier<PathBuf> = Courier::bounded(CHANNEL_CAPACITY);
    let filtered: Courier<PathBuf> = Courier::bounded(CHANNEL_CAPACITY);
    let lists: Courier<ClusterList> = Courier::bounded(CHANNEL_CAPACITY);

    let walker_handle = walker::spawn(
        config.archive_root.clone(),
        newest,
        paths.register_sender(),
    )?;

    let mut filter_handles = Vec::with_capacity(NUM_FILTER_THREADS);
    for i in 0..NUM_FILTER_THREADS {
        filter_handles.push(spawn_filter(
            i,
            config.store_file.clone(),
            paths.register_receiver(),
            filtered.register_sender(),
        )?);
    }

    let mut loader_handles = Vec::with_capacity(NUM_LOADER_THREADS);
    for i in 0..NUM_LOADER_THREADS {
        loader_handles.push(spawn_loader(
            i,
            filtered.register_receiver(),
            lists.register_sender(),
        )?);
    }

    let writer_handle = spawn_writer(config.clone(), lists.register_receiver())?;

    // All endpoints are registered; the prototypes must go away so stages
    // can observe end-of-stream.
    drop(paths);
    drop(filtered);
    drop(lists);

    join_stage(walker_handle, "walker")?;
    for handle in filter_handles {
        join_stage(handle, "filter")?;
    }
    for handle in loader_handles {
        join_stage(handle, "loader")?;
    }
    join_stage(writer_handle, "writer")?;

    Ok(())
}

fn join_stage(handle: JoinHandle<Result<()>>, stage: &str) -> Result<()> {
    match handle.join() {
        Ok(result) => result.map_err(|err| err.context(format!("{} stage failed", stage))),
        Err(_) => Err(anyhow!("{} thread panicked", stage)),
    }
}

/// Filter stage: drop non-granule paths, Meso sectors, and granules whose
/// signature is already in the store.
fn spawn_filter(
    index: usize,
    store_file: PathBuf,
    from_walker: CourierReceiver<PathBuf>,
    to_loader: CourierSender<PathBuf>,
) -> Result<JoinHandle<Result<()>>> {
    let handle = std::thread::Builder::new()
        .name(format!("fdc-filter-{}", index))
        .spawn(move || {
            let store = ClusterStore::connect(&store_file)?;
            let mut present = store.prepare_presence_query()?;

            from_walker.wait_until_ready_to_receive();
            to_loader.wait_until_ready_to_send();

            while let Some(path) = from_walker.receive() {
                if path.extension().map(|ext| ext != "nc").unwrap_or(true) {
                    continue;
                }

                let Some(id) = parse_granule_path(&path) else {
                    debug!(path = %path.display(), "not an FDC granule, skipped");
                    continue;
                };

                if id.sector.is_meso() {
                    debug!(path = %path.display(), "Meso sector, skipped");
                    continue;
                }

                match present.count(&id) {
                    Ok(0) => {
                        info!(granule = %id, path = %path.display(), "processing");
                        if !to_loader.send(path) {
                            break;
                        }
                    }
                    Ok(_) => debug!(granule = %id, "already in store"),
                    Err(err) => warn!(granule = %id, %err, "presence query failed, skipping"),
                }
            }

            Ok(())
        })?;

    Ok(handle)
}

fn parse_granule_path(path: &Path) -> Option<GranuleId> {
    let file_name = path.file_name()?.to_string_lossy();
    GranuleId::from_file_name(&file_name).ok()
}

/// Loader stage: decode the granule, cluster its fire pixels, and forward
/// the result. Lists flagged with a decode error are logged and dropped.
fn spawn_loader(
    index: usize,
    from_filter: CourierReceiver<PathBuf>,
    to_writer: CourierSender<ClusterList>,
) -> Result<JoinHandle<Result<()>>> {
    let handle = std::thread::Builder::new()
        .name(format!("fdc-loader-{}", index))
        .spawn(move || {
            from_filter.wait_until_ready_to_receive();
            to_writer.wait_until_ready_to_send();

            while let Some(path) = from_filter.receive() {
                let Some(mut list) = load_cluster_list(&path) else {
                    continue;
                };

                if let Some(error) = list.error() {
                    warn!(path = %path.display(), error, "granule dropped");
                    continue;
                }

                list.retain(|cluster| cluster.has_mask_code_in(&KEEP_MASK_CODES));

                if !to_writer.send(list) {
                    break;
                }
            }

            Ok(())
        })?;

    Ok(handle)
}

/// Decode one granule into a cluster list.
///
/// I/O failures before the granule identity is known yield `None`; decode
/// failures after that yield a flagged list carrying the error.
fn load_cluster_list(path: &Path) -> Option<ClusterList> {
    let granule = match FdcGranule::open(path) {
        Ok(granule) => granule,
        Err(err) => {
            warn!(path = %path.display(), %err, "cannot open granule");
            return None;
        }
    };

    let id = *granule.granule_id();
    match granule.fire_pixels() {
        Ok(pixels) => {
            debug!(granule = %id, fire_pixels = pixels.len(), "granule decoded");
            Some(ClusterList::from_pixels(id, pixels))
        }
        Err(err) => Some(ClusterList::from_error(id, err.to_string())),
    }
}

/// Writer stage: the single thread that mutates the store. Inserts each
/// cluster list in its own transaction, folds the run statistics, and emits
/// the summary, KML sidecar, and run marker at shutdown.
fn spawn_writer(
    config: IngesterConfig,
    from_loader: CourierReceiver<ClusterList>,
) -> Result<JoinHandle<Result<()>>> {
    let handle = std::thread::Builder::new()
        .name("fdc-writer".to_string())
        .spawn(move || {
            let mut store = ClusterStore::connect(&config.store_file)?;

            from_loader.wait_until_ready_to_receive();

            let mut cluster_stats: Option<ClusterStats> = None;
            let mut granule_stats: Option<GranuleStats> = None;

            while let Some(list) = from_loader.receive() {
                if let Some(error) = list.error() {
                    warn!(granule = %list.granule_id(), error, "flagged list reached writer, dropped");
                    continue;
                }

                match store.add_cluster_list(&list) {
                    Ok(added) => {
                        debug!(granule = %list.granule_id(), clusters = list.len(), added, "stored");
                    }
                    // The transaction already rolled back; stay alive for the
                    // remaining granules.
                    Err(err) => {
                        warn!(granule = %list.granule_id(), %err, "store insert failed");
                        continue;
                    }
                }

                ClusterStats::update(&mut cluster_stats, &list);
                GranuleStats::update(&mut granule_stats, &list);
            }

            if let (Some(cluster_stats), Some(granule_stats)) = (&cluster_stats, &granule_stats) {
                println!("{}", cluster_stats);
                println!("{}", granule_stats);

                if let Err(err) = save_biggest_cluster_kml(&config.kml_file, cluster_stats) {
                    warn!(path = %config.kml_file.display(), %err, "could not write KML summary");
                } else {
                    info!(path = %config.kml_file.display(), "wrote KML summary");
                }
            } else {
                println!("\nNo new clusters added to the store.");
            }

            store.record_run_marker(Utc::now())?;

            Ok(())
        })?;

    Ok(handle)
}
