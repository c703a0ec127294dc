//! NetCDF reader for GOES-R ABI Fire Detection Characteristics granules.
//!
//! Opens a granule from the NOAA Big Data archive, reads the fire power,
//! temperature, area, and mask bands, and reconstructs the geographic
//! quadrilateral footprint of every fire-carrying cell from the
//! geostationary fixed grid.

pub mod error;
pub mod granule;
pub mod projection;

pub use error::{RasterError, RasterResult};
pub use granule::{load_fire_pixels, FdcGranule, GranuleReader};
pub use projection::GeosProjection;
