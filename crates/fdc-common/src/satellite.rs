//! Satellite, scan sector, and granule identity.
//!
//! The NOAA Big Data archive encodes everything this pipeline needs to know
//! about a granule in its file name, e.g.
//! `OR_ABI-L2-FDCC-M6_G16_s20202381501123_e20202381503496_c20202381504039.nc`.
//! The file name is authoritative; nothing is discovered from raster headers.

use crate::error::{FdcError, FdcResult};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A GOES-R series satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Satellite {
    G16,
    G17,
}

impl Satellite {
    pub const ALL: [Satellite; 2] = [Satellite::G16, Satellite::G17];

    pub fn as_str(&self) -> &'static str {
        match self {
            Satellite::G16 => "G16",
            Satellite::G17 => "G17",
        }
    }

    /// Find a satellite token anywhere in a path or file name.
    pub fn from_path_fragment(s: &str) -> Option<Satellite> {
        Satellite::ALL
            .into_iter()
            .find(|sat| s.contains(sat.as_str()))
    }

    /// Parse the exact name produced by [`as_str`](Self::as_str).
    pub fn from_name(s: &str) -> Option<Satellite> {
        Satellite::ALL.into_iter().find(|sat| sat.as_str() == s)
    }
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ABI scan sector carrying fire-detection data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    FullDisk,
    Conus,
    Meso1,
    Meso2,
}

impl Sector {
    pub const ALL: [Sector; 4] = [Sector::FullDisk, Sector::Conus, Sector::Meso1, Sector::Meso2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::FullDisk => "FullDisk",
            Sector::Conus => "CONUS",
            Sector::Meso1 => "Meso1",
            Sector::Meso2 => "Meso2",
        }
    }

    /// The product token used in archive paths and file names.
    pub fn product_token(&self) -> &'static str {
        match self {
            Sector::FullDisk => "ABI-L2-FDCF",
            Sector::Conus => "ABI-L2-FDCC",
            Sector::Meso1 => "ABI-L2-FDCM1",
            Sector::Meso2 => "ABI-L2-FDCM2",
        }
    }

    /// Find a sector token anywhere in a path or file name.
    ///
    /// The Meso tokens are checked before the single-letter suffixes so that
    /// `FDCM1`/`FDCM2` are not shadowed.
    pub fn from_path_fragment(s: &str) -> Option<Sector> {
        if s.contains("ABI-L2-FDCM1") {
            Some(Sector::Meso1)
        } else if s.contains("ABI-L2-FDCM2") {
            Some(Sector::Meso2)
        } else if s.contains("ABI-L2-FDCF") {
            Some(Sector::FullDisk)
        } else if s.contains("ABI-L2-FDCC") {
            Some(Sector::Conus)
        } else {
            None
        }
    }

    /// Parse the exact name produced by [`as_str`](Self::as_str).
    pub fn from_name(s: &str) -> Option<Sector> {
        Sector::ALL.into_iter().find(|sector| sector.as_str() == s)
    }

    pub fn is_meso(&self) -> bool {
        matches!(self, Sector::Meso1 | Sector::Meso2)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one granule: where it came from and when it was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranuleId {
    pub satellite: Satellite,
    pub sector: Sector,
    pub scan_start: DateTime<Utc>,
    pub scan_end: DateTime<Utc>,
}

impl GranuleId {
    /// Parse a granule identity from an archive file name.
    ///
    /// Expects the satellite token, the sector product token, and the
    /// `s<YYYYDOYhhmmssf>` / `e<YYYYDOYhhmmssf>` scan time tokens (UTC).
    pub fn from_file_name(file_name: &str) -> FdcResult<GranuleId> {
        let satellite = Satellite::from_path_fragment(file_name)
            .ok_or_else(|| FdcError::InvalidFileName(file_name.to_string()))?;
        let sector = Sector::from_path_fragment(file_name)
            .ok_or_else(|| FdcError::InvalidFileName(file_name.to_string()))?;

        let scan_start = parse_scan_time(file_name, "_s")?;
        let scan_end = parse_scan_time(file_name, "_e")?;

        Ok(GranuleId {
            satellite,
            sector,
            scan_start,
            scan_end,
        })
    }

    /// The midpoint of the scan interval, used as the granule's timestamp in
    /// the cluster store.
    pub fn mid_point(&self) -> DateTime<Utc> {
        let start = self.scan_start.timestamp();
        let end = self.scan_end.timestamp();
        Utc.timestamp_opt((start + end) / 2, 0)
            .single()
            .unwrap_or(self.scan_start)
    }
}

impl fmt::Display for GranuleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} - {}",
            self.satellite,
            self.sector,
            self.scan_start.format("%Y-%m-%d %H:%M:%S"),
            self.scan_end.format("%H:%M:%S")
        )
    }
}

/// Parse a `_s`/`_e` time token: year, day of year, hour, minute, second,
/// and a tenth-of-second digit that is ignored.
fn parse_scan_time(file_name: &str, marker: &str) -> FdcResult<DateTime<Utc>> {
    let at = file_name
        .find(marker)
        .ok_or_else(|| FdcError::InvalidFileName(file_name.to_string()))?;

    let digits = file_name
        .get(at + marker.len()..at + marker.len() + 13)
        .ok_or_else(|| FdcError::InvalidFileName(file_name.to_string()))?;

    let naive = NaiveDateTime::parse_from_str(digits, "%Y%j%H%M%S")
        .map_err(|_| FdcError::InvalidFileName(file_name.to_string()))?;

    Ok(Utc.from_utc_datetime(&naive))
}
