//! Common types and utilities shared across the FDC cluster pipeline.

pub mod error;
pub mod geo;
pub mod kml;
pub mod pixel;
pub mod satellite;

pub use error::{FdcError, FdcResult};
pub use geo::{great_circle_distance, BoundingBox, Coord, Line, LineIntersection};
pub use kml::KmlFile;
pub use pixel::{PixelList, SatPixel, PIXEL_LIST_HEADER_LEN, PIXEL_RECORD_LEN};
pub use satellite::{GranuleId, Satellite, Sector};
