//! Archive directory walker with subtree pruning.
//!
//! The NOAA archive lays granules out as `SAT/SECTOR/YEAR/DAY_OF_YEAR/HOUR/`.
//! With `--new`, whole subtrees strictly older than the newest scan already
//! in the store (per satellite and sector) are pruned before descent; a path
//! too shallow to decide always recurses.

use crate::courier::CourierSender;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use fdc_common::{Satellite, Sector};
use fdc_store::ClusterStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, info};

/// Newest stored scan per satellite and sector, captured at pipeline start.
pub type NewestSnapshot = HashMap<(Satellite, Sector), DateTime<Utc>>;

/// Read the newest-scan snapshot used for pruning.
pub fn load_newest_snapshot(store_file: &Path) -> Result<NewestSnapshot> {
    let store = ClusterStore::connect(store_file)
        .with_context(|| format!("opening store {}", store_file.display()))?;

    let mut snapshot = NewestSnapshot::new();
    for satellite in Satellite::ALL {
        for sector in Sector::ALL {
            let newest = store.newest_scan_start(satellite, sector)?;
            debug!(%satellite, %sector, %newest, "newest stored scan");
            snapshot.insert((satellite, sector), newest);
        }
    }

    Ok(snapshot)
}

/// Spawn the walker stage: one thread feeding granule paths downstream.
pub fn spawn(
    archive_root: PathBuf,
    newest: Option<NewestSnapshot>,
    to_filter: CourierSender<PathBuf>,
) -> Result<JoinHandle<Result<()>>> {
    let handle = std::thread::Builder::new()
        .name("fdc-walker".to_string())
        .spawn(move || {
            to_filter.wait_until_ready_to_send();

            let mut sent = 0usize;
            let entries = walkdir::WalkDir::new(&archive_root)
                .into_iter()
                .filter_entry(|entry| {
                    if !entry.file_type().is_dir() {
                        return true;
                    }
                    match &newest {
                        Some(newest) => subtree_may_contain_new(entry.path(), newest),
                        None => true,
                    }
                })
                // Unreadable directories are skipped, not fatal.
                .filter_map(|res| res.ok())
                .filter(|entry| {
                    entry.file_type().is_file()
                        && entry.path().extension().map(|ext| ext == "nc").unwrap_or(false)
                });

            for entry in entries {
                if !to_filter.send(entry.into_path()) {
                    break;
                }
                sent += 1;
            }

            info!(sent, "archive walk finished");
            Ok(())
        })?;

    Ok(handle)
}

/// Decide whether a directory could still hold unprocessed granules.
///
/// Returns true until the path is deep enough to prove the whole subtree is
/// strictly older than the snapshot for its satellite and sector.
fn subtree_may_contain_new(path: &Path, newest: &NewestSnapshot) -> bool {
    let path_str = path.to_string_lossy();

    let satellite = match Satellite::from_path_fragment(&path_str) {
        Some(satellite) => satellite,
        None => return true,
    };
    let sector = match Sector::from_path_fragment(&path_str) {
        Some(sector) => sector,
        None => return true,
    };

    let newest = match newest.get(&(satellite, sector)) {
        Some(newest) => *newest,
        None => return true,
    };

    let mr_year = newest.year();
    let mr_doy = newest.ordinal() as i32;
    let mr_hour = newest.hour() as i32;

    let mut year: Option<i32> = None;
    let mut doy: Option<i32> = None;

    for component in path.iter() {
        let text = component.to_string_lossy();
        let Ok(value) = text.parse::<i32>() else {
            continue;
        };

        if year.is_none() {
            // GOES-R era years only; smaller numbers are not the year level.
            if value > 2016 {
                if value < mr_year {
                    return false;
                }
                if value > mr_year {
                    return true;
                }
                year = Some(value);
            }
        } else if doy.is_none() {
            if (1..=366).contains(&value) {
                if value < mr_doy {
                    return false;
                }
                if value > mr_doy {
                    return true;
                }
                doy = Some(value);
            }
        } else if (0..=23).contains(&value) {
            return value >= mr_hour;
        }
    }

    // Not deep enough to rule the subtree out.
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn snapshot() -> NewestSnapshot {
        // 2020 day-of-year 238 is 25 August; newest stored scan at 15 h.
        let mut snapshot = NewestSnapshot::new();
        snapshot.insert(
            (Satellite::G16, Sector::Conus),
            Utc.with_ymd_and_hms(2020, 8, 25, 15, 2, 0).unwrap(),
        );
        snapshot
    }

    fn may_descend(path: &str) -> bool {
        subtree_may_contain_new(&PathBuf::from(path), &snapshot())
    }

    #[test]
    fn test_prunes_past_years_days_and_hours() {
        assert!(!may_descend("archive/G16/ABI-L2-FDCC/2019"));
        assert!(!may_descend("archive/G16/ABI-L2-FDCC/2020/237"));
        assert!(!may_descend("archive/G16/ABI-L2-FDCC/2020/238/14"));
    }

    #[test]
    fn test_keeps_current_and_future_subtrees() {
        assert!(may_descend("archive/G16/ABI-L2-FDCC/2020/238/15"));
        assert!(may_descend("archive/G16/ABI-L2-FDCC/2020/238/16"));
        assert!(may_descend("archive/G16/ABI-L2-FDCC/2020/239"));
        assert!(may_descend("archive/G16/ABI-L2-FDCC/2021"));
    }

    #[test]
    fn test_shallow_paths_always_recurse() {
        assert!(may_descend("archive"));
        assert!(may_descend("archive/G16"));
        assert!(may_descend("archive/G16/ABI-L2-FDCC"));
        assert!(may_descend("archive/G16/ABI-L2-FDCC/2020"));
        assert!(may_descend("archive/G16/ABI-L2-FDCC/2020/238"));
    }

    #[test]
    fn test_unknown_satellite_or_sector_recurses() {
        // No snapshot entry for this pair means nothing can be pruned.
        assert!(may_descend("archive/G17/ABI-L2-FDCF/2019/001"));
    }
}
