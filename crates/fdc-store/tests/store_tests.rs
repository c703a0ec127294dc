//! Integration tests for the cluster store against a scratch SQLite file.

use chrono::{TimeZone, Utc};
use fdc_cluster::ClusterList;
use fdc_common::{BoundingBox, Coord, GranuleId, SatPixel, Satellite, Sector};
use fdc_store::ClusterStore;

fn pixel(lat: f64, lon: f64, power: f64) -> SatPixel {
    let side = 0.02;
    SatPixel {
        ul: Coord::new(lat + side, lon),
        ur: Coord::new(lat + side, lon + side),
        lr: Coord::new(lat, lon + side),
        ll: Coord::new(lat, lon),
        power,
        temperature: 400.0,
        area: 0.5,
        mask: 10,
    }
}

fn granule(doy_hour: (u32, u32)) -> GranuleId {
    let (doy, hour) = doy_hour;
    let day = Utc.with_ymd_and_hms(2020, 1, 1, hour, 1, 12).unwrap()
        + chrono::Duration::days(doy as i64 - 1);

    GranuleId {
        satellite: Satellite::G16,
        sector: Sector::Conus,
        scan_start: day,
        scan_end: day + chrono::Duration::seconds(157),
    }
}

fn sample_list(doy_hour: (u32, u32), lats: &[f64]) -> ClusterList {
    let pixels = lats.iter().map(|&lat| pixel(lat, -120.0, 25.0)).collect();
    ClusterList::from_pixels(granule(doy_hour), pixels)
}

#[test]
fn test_connect_creates_schema_idempotently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clusters.sqlite");

    let store = ClusterStore::connect(&path).unwrap();
    drop(store);

    // Reconnecting against an existing file must not fail.
    ClusterStore::connect(&path).unwrap();
}

#[test]
fn test_add_cluster_list_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ClusterStore::connect(dir.path().join("clusters.sqlite")).unwrap();

    let list = sample_list((238, 15), &[40.0, 44.0, 48.0]);
    assert_eq!(list.len(), 3);

    let added = store.add_cluster_list(&list).unwrap();
    assert_eq!(added, 3);

    // Replaying the same granule adds nothing.
    let added = store.add_cluster_list(&list).unwrap();
    assert_eq!(added, 0);
}

#[test]
fn test_presence_query() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ClusterStore::connect(dir.path().join("clusters.sqlite")).unwrap();

    let list = sample_list((238, 15), &[40.0]);
    store.add_cluster_list(&list).unwrap();

    let mut present = store.prepare_presence_query().unwrap();
    assert!(present.count(&granule((238, 15))).unwrap() > 0);
    assert_eq!(present.count(&granule((238, 16))).unwrap(), 0);
    assert_eq!(present.count(&granule((239, 15))).unwrap(), 0);
}

#[test]
fn test_newest_scan_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ClusterStore::connect(dir.path().join("clusters.sqlite")).unwrap();

    // Empty store reports the epoch.
    let newest = store
        .newest_scan_start(Satellite::G16, Sector::Conus)
        .unwrap();
    assert_eq!(newest.timestamp(), 0);

    store
        .add_cluster_list(&sample_list((100, 6), &[40.0]))
        .unwrap();
    store
        .add_cluster_list(&sample_list((238, 15), &[41.0]))
        .unwrap();
    store
        .add_cluster_list(&sample_list((150, 3), &[42.0]))
        .unwrap();

    let newest = store
        .newest_scan_start(Satellite::G16, Sector::Conus)
        .unwrap();
    assert_eq!(newest, granule((238, 15)).mid_point());

    // Another sector is unaffected.
    let other = store
        .newest_scan_start(Satellite::G16, Sector::FullDisk)
        .unwrap();
    assert_eq!(other.timestamp(), 0);
}

#[test]
fn test_query_rows_filters_by_time_and_bbox() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ClusterStore::connect(dir.path().join("clusters.sqlite")).unwrap();

    store
        .add_cluster_list(&sample_list((100, 6), &[40.0, 55.0]))
        .unwrap();
    store
        .add_cluster_list(&sample_list((200, 6), &[40.5]))
        .unwrap();

    let mut query = store.prepare_row_query().unwrap();

    // A box around latitude 40 over the first half of the year.
    let bbox = BoundingBox::new(Coord::new(35.0, -125.0), Coord::new(45.0, -115.0));
    let rows: Vec<_> = query
        .rows(
            Satellite::G16,
            Sector::Conus,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap(),
            bbox,
        )
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    // Only the doy-100 cluster at latitude 40 matches; latitude 55 is out of
    // the box and doy 200 is out of the window.
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.satellite, Satellite::G16);
    assert_eq!(row.sector, Sector::Conus);
    assert_eq!(row.cell_count, 1);
    assert!((row.power - 25.0).abs() < 1.0e-9);
    assert!(row.centroid.is_close(Coord::new(40.01, -119.99), 1.0e-6));

    // The perimeter blob round-trips through the codec.
    assert_eq!(row.perimeter.len(), 1);
    assert!((row.perimeter.total_power() - 25.0).abs() < 1.0e-9);
}

#[test]
fn test_run_marker() {
    let dir = tempfile::tempdir().unwrap();
    let store = ClusterStore::connect(dir.path().join("clusters.sqlite")).unwrap();

    let at = Utc.with_ymd_and_hms(2020, 8, 25, 16, 0, 0).unwrap();
    store.record_run_marker(at).unwrap();
    // Re-recording overwrites without error.
    store.record_run_marker(at + chrono::Duration::hours(1)).unwrap();
}
