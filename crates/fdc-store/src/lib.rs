//! Embedded relational store for fire clusters and fire tracks.
//!
//! A single self-contained SQLite file holds every cluster the pipeline has
//! ingested, plus the `fires` and `associations` tables that the temporal
//! tracking pass populates. All writes from this crate are idempotent: the
//! uniqueness index on `(satellite, sector, mid_point_time, lat, lon)` lets
//! re-runs replay an archive without duplicating rows.

use chrono::{DateTime, TimeZone, Utc};
use fdc_cluster::ClusterList;
use fdc_common::{BoundingBox, Coord, FdcError, GranuleId, PixelList, Satellite, Sector};
use rusqlite::{params, Connection, OptionalExtension, Statement};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for cluster store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored perimeter blob failed to decode.
    #[error("Perimeter codec error: {0}")]
    Codec(#[from] FdcError),

    /// A stored row carries a satellite or sector name this build does not know.
    #[error("Unknown {kind} name in store: {name}")]
    UnknownName { kind: &'static str, name: String },
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS clusters (
    satellite      TEXT    NOT NULL,
    sector         TEXT    NOT NULL,
    mid_point_time INTEGER NOT NULL,
    lat            REAL    NOT NULL,
    lon            REAL    NOT NULL,
    power          REAL    NOT NULL,
    cell_count     INTEGER NOT NULL,
    perimeter      BLOB    NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS no_duplicate_clusters
    ON clusters (satellite, sector, mid_point_time, lat, lon);

CREATE TABLE IF NOT EXISTS fires (
    id            TEXT    PRIMARY KEY,
    satellite     TEXT    NOT NULL,
    last_observed INTEGER NOT NULL,
    origin_lat    REAL    NOT NULL,
    origin_lon    REAL    NOT NULL,
    perimeter     BLOB    NOT NULL
);

CREATE TABLE IF NOT EXISTS associations (
    cluster_row_id INTEGER NOT NULL,
    fire_id        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS meta (
    item_name  TEXT PRIMARY KEY,
    item_value TEXT NOT NULL
);
"#;

const SCHEMA_VERSION: i64 = 1;

const ADD_CLUSTER_SQL: &str = "INSERT OR IGNORE INTO clusters \
     (satellite, sector, mid_point_time, lat, lon, power, cell_count, perimeter) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Connection to the cluster store.
///
/// Each pipeline worker owns its own `ClusterStore`; the connection is not
/// shared across threads.
pub struct ClusterStore {
    conn: Connection,
}

impl ClusterStore {
    /// Open (creating if needed) the store and ensure the schema exists.
    pub fn connect<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Concurrent readers while the writer holds its transaction.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_secs(30))?;

        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (item_name, item_value) VALUES ('schema version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;

        Ok(ClusterStore { conn })
    }

    /// Prepare the "is this granule already ingested" query.
    pub fn prepare_presence_query(&self) -> StoreResult<PresenceQuery<'_>> {
        let stmt = self.conn.prepare(
            "SELECT COUNT(*) FROM clusters \
             WHERE satellite = ?1 AND sector = ?2 AND mid_point_time = ?3",
        )?;
        Ok(PresenceQuery(stmt))
    }

    /// The newest scan mid-point stored for a satellite/sector pair, or the
    /// Unix epoch when the store holds nothing for it.
    pub fn newest_scan_start(
        &self,
        satellite: Satellite,
        sector: Sector,
    ) -> StoreResult<DateTime<Utc>> {
        let newest: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(mid_point_time) FROM clusters \
                 WHERE satellite = ?1 AND sector = ?2",
                params![satellite.as_str(), sector.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        Ok(timestamp_to_utc(newest.unwrap_or(0)))
    }

    /// Insert every cluster of one granule in a single transaction.
    ///
    /// Duplicate rows are silently ignored, so replaying a granule is a
    /// no-op. Returns the number of rows actually added.
    pub fn add_cluster_list(&mut self, list: &ClusterList) -> StoreResult<usize> {
        let satellite = list.satellite().as_str();
        let sector = list.sector().as_str();
        let mid_point = list.granule_id().mid_point().timestamp();

        let tx = self.conn.transaction()?;
        let mut added = 0usize;
        {
            let mut stmt = tx.prepare_cached(ADD_CLUSTER_SQL)?;
            for cluster in list.clusters() {
                let centroid = cluster.centroid();
                let perimeter = cluster.pixels().serialize();

                added += stmt.execute(params![
                    satellite,
                    sector,
                    mid_point,
                    centroid.lat,
                    centroid.lon,
                    cluster.total_power(),
                    cluster.pixel_count() as i64,
                    perimeter,
                ])?;
            }
        }
        tx.commit()?;

        debug!(
            satellite,
            sector,
            mid_point,
            clusters = list.len(),
            added,
            "stored cluster list"
        );

        Ok(added)
    }

    /// Prepare the streaming row query used by the temporal consumer.
    pub fn prepare_row_query(&self) -> StoreResult<ClusterRowQuery<'_>> {
        let stmt = self.conn.prepare(
            "SELECT rowid, satellite, sector, mid_point_time, lat, lon, power, cell_count, perimeter \
             FROM clusters \
             WHERE satellite = ?1 AND sector = ?2 \
               AND mid_point_time >= ?3 AND mid_point_time <= ?4 \
               AND lat > ?5 AND lat < ?6 AND lon > ?7 AND lon < ?8 \
             ORDER BY mid_point_time",
        )?;
        Ok(ClusterRowQuery(stmt))
    }

    /// Record when an ingestion run last completed.
    pub fn record_run_marker(&self, completed: DateTime<Utc>) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (item_name, item_value) \
             VALUES ('last ingest completed', ?1)",
            params![completed.timestamp().to_string()],
        )?;
        Ok(())
    }
}

/// Prepared granule-presence query; owned by one filter worker.
pub struct PresenceQuery<'a>(Statement<'a>);

impl PresenceQuery<'_> {
    /// Count of stored rows matching the granule signature. Greater than
    /// zero means the granule was already ingested.
    pub fn count(&mut self, id: &GranuleId) -> StoreResult<usize> {
        let count: i64 = self.0.query_row(
            params![
                id.satellite.as_str(),
                id.sector.as_str(),
                id.mid_point().timestamp(),
            ],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// One stored cluster row.
#[derive(Debug, Clone)]
pub struct ClusterRow {
    pub rowid: i64,
    pub satellite: Satellite,
    pub sector: Sector,
    pub mid_point: DateTime<Utc>,
    pub centroid: Coord,
    pub power: f64,
    pub cell_count: u32,
    pub perimeter: PixelList,
}

/// Prepared streaming read over stored clusters.
pub struct ClusterRowQuery<'a>(Statement<'a>);

impl ClusterRowQuery<'_> {
    /// Stream the rows for one satellite/sector over a closed time range,
    /// restricted to centroids strictly inside `bbox`.
    pub fn rows(
        &mut self,
        satellite: Satellite,
        sector: Sector,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        bbox: BoundingBox,
    ) -> StoreResult<impl Iterator<Item = StoreResult<ClusterRow>> + '_> {
        let rows = self.0.query_map(
            params![
                satellite.as_str(),
                sector.as_str(),
                start.timestamp(),
                end.timestamp(),
                bbox.ll.lat,
                bbox.ur.lat,
                bbox.ll.lon,
                bbox.ur.lon,
            ],
            |row| {
                Ok(RawRow {
                    rowid: row.get(0)?,
                    satellite: row.get(1)?,
                    sector: row.get(2)?,
                    mid_point_time: row.get(3)?,
                    lat: row.get(4)?,
                    lon: row.get(5)?,
                    power: row.get(6)?,
                    cell_count: row.get(7)?,
                    perimeter: row.get(8)?,
                })
            },
        )?;

        Ok(rows.map(|raw| raw.map_err(StoreError::from).and_then(RawRow::into_row)))
    }
}

struct RawRow {
    rowid: i64,
    satellite: String,
    sector: String,
    mid_point_time: i64,
    lat: f64,
    lon: f64,
    power: f64,
    cell_count: i64,
    perimeter: Vec<u8>,
}

impl RawRow {
    fn into_row(self) -> StoreResult<ClusterRow> {
        let satellite =
            Satellite::from_name(&self.satellite).ok_or_else(|| StoreError::UnknownName {
                kind: "satellite",
                name: self.satellite.clone(),
            })?;
        let sector = Sector::from_name(&self.sector).ok_or_else(|| StoreError::UnknownName {
            kind: "sector",
            name: self.sector.clone(),
        })?;

        Ok(ClusterRow {
            rowid: self.rowid,
            satellite,
            sector,
            mid_point: timestamp_to_utc(self.mid_point_time),
            centroid: Coord::new(self.lat, self.lon),
            power: self.power,
            cell_count: self.cell_count as u32,
            perimeter: PixelList::deserialize(&self.perimeter)?,
        })
    }
}

fn timestamp_to_utc(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
