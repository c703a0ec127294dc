//! Fire-detection granule reader.
//!
//! A granule is one NetCDF-4 file from the NOAA Big Data archive holding the
//! FDC (Fire Detection Characteristics) product for one sector and scan. The
//! reader materializes every fire-carrying cell as a geo-referenced
//! quadrilateral [`SatPixel`].
//!
//! Identity (satellite, sector, scan times) comes from the file name alone;
//! the raster is only opened for the data bands and projection metadata.

use crate::error::{RasterError, RasterResult};
use crate::projection::GeosProjection;
use fdc_common::{Coord, GranuleId, SatPixel};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Capability needed by the cluster loader: identity plus fire pixels.
///
/// Keeps the loader independent of the raster container; additional granule
/// formats implement this trait.
pub trait GranuleReader {
    /// The granule identity parsed from the archive naming convention.
    fn granule_id(&self) -> &GranuleId;

    /// Decode the fire pixels: every cell with finite positive fire power,
    /// as a ground-footprint quadrilateral with its fire attributes.
    fn fire_pixels(&self) -> RasterResult<Vec<SatPixel>>;
}

/// A GOES ABI FDC granule on disk.
#[derive(Debug)]
pub struct FdcGranule {
    path: PathBuf,
    id: GranuleId,
}

impl FdcGranule {
    /// Validate the path and parse the granule identity.
    ///
    /// Rejects non-`.nc` files and Meso-sector granules; the raster itself is
    /// not opened until [`fire_pixels`](GranuleReader::fire_pixels).
    pub fn open<P: AsRef<Path>>(path: P) -> RasterResult<Self> {
        let path = path.as_ref();

        if path.extension().map(|ext| ext != "nc").unwrap_or(true) {
            return Err(RasterError::UnsupportedFile(format!(
                "not a NetCDF granule: {}",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .ok_or_else(|| {
                RasterError::UnsupportedFile(format!("no file name: {}", path.display()))
            })?;

        let id = GranuleId::from_file_name(&file_name)?;

        if id.sector.is_meso() {
            return Err(RasterError::UnsupportedFile(format!(
                "Meso sector granules are skipped: {}",
                path.display()
            )));
        }

        Ok(FdcGranule {
            path: path.to_path_buf(),
            id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GranuleReader for FdcGranule {
    fn granule_id(&self) -> &GranuleId {
        &self.id
    }

    fn fire_pixels(&self) -> RasterResult<Vec<SatPixel>> {
        let file = netcdf::open(&self.path)?;

        let nx = dimension_len(&file, "x")?;
        let ny = dimension_len(&file, "y")?;

        let power = scaled_field(&file, "Power", nx * ny)?;
        let temperature = scaled_field(&file, "Temp", nx * ny)?;
        let area = scaled_field(&file, "Area", nx * ny)?;
        let mask = mask_field(&file, nx * ny)?;

        let (x_angles, x_step) = axis_angles(&file, "x", nx)?;
        let (y_angles, y_step) = axis_angles(&file, "y", ny)?;

        let projection = read_projection(&file);

        let hx = x_step.abs() / 2.0;
        let hy = y_step.abs() / 2.0;

        let mut pixels = Vec::new();
        let mut off_disc = 0usize;

        for j in 0..ny {
            for i in 0..nx {
                let at = j * nx + i;
                let p = power[at];
                if !p.is_finite() || p <= 0.0 {
                    continue;
                }

                let west = x_angles[i] - hx;
                let east = x_angles[i] + hx;
                let south = y_angles[j] - hy;
                let north = y_angles[j] + hy;

                let corners = [
                    projection.to_geographic(west, north),
                    projection.to_geographic(east, north),
                    projection.to_geographic(east, south),
                    projection.to_geographic(west, south),
                ];

                let [ul, ur, lr, ll] = match corners {
                    [Some(ul), Some(ur), Some(lr), Some(ll)] => [ul, ur, lr, ll],
                    _ => {
                        off_disc += 1;
                        continue;
                    }
                };

                let coord = |(lon, lat): (f64, f64)| Coord::new(lat, lon);

                pixels.push(SatPixel {
                    ul: coord(ul),
                    ur: coord(ur),
                    lr: coord(lr),
                    ll: coord(ll),
                    power: p,
                    temperature: temperature[at],
                    area: area[at],
                    mask: mask[at],
                });
            }
        }

        if off_disc > 0 {
            debug!(
                granule = %self.id,
                off_disc,
                "dropped fire pixels past the Earth limb"
            );
        }

        Ok(pixels)
    }
}

/// Open a granule and decode its fire pixels in one call.
pub fn load_fire_pixels<P: AsRef<Path>>(path: P) -> RasterResult<(GranuleId, Vec<SatPixel>)> {
    let granule = FdcGranule::open(path)?;
    let pixels = granule.fire_pixels()?;
    Ok((*granule.granule_id(), pixels))
}

fn dimension_len(file: &netcdf::File, name: &str) -> RasterResult<usize> {
    Ok(file
        .dimension(name)
        .ok_or_else(|| RasterError::MissingData(format!("{} dimension", name)))?
        .len())
}

/// Read a packed data band, applying scale/offset and mapping fill to NaN.
fn scaled_field(file: &netcdf::File, name: &str, expected: usize) -> RasterResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| RasterError::MissingData(format!("{} variable", name)))?;

    let raw: Vec<f64> = var.get_values(..)?;
    if raw.len() != expected {
        return Err(RasterError::InvalidFormat(format!(
            "{} holds {} values, grid needs {}",
            name,
            raw.len(),
            expected
        )));
    }

    let scale = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
    let fill = get_f64_attr(&var, "_FillValue");

    Ok(raw
        .into_iter()
        .map(|v| match fill {
            Some(fill) if v == fill => f64::NAN,
            _ => v * scale + offset,
        })
        .collect())
}

/// Read the fire mask codes; missing mask entries become -1.
fn mask_field(file: &netcdf::File, expected: usize) -> RasterResult<Vec<i16>> {
    let var = file
        .variable("Mask")
        .ok_or_else(|| RasterError::MissingData("Mask variable".to_string()))?;

    let raw: Vec<i16> = var.get_values(..)?;
    if raw.len() != expected {
        return Err(RasterError::InvalidFormat(format!(
            "Mask holds {} values, grid needs {}",
            raw.len(),
            expected
        )));
    }

    Ok(raw)
}

/// Read one fixed-grid axis: per-cell scan angles in radians plus the cell
/// pitch taken from the packing scale.
fn axis_angles(file: &netcdf::File, name: &str, expected: usize) -> RasterResult<(Vec<f64>, f64)> {
    let var = file
        .variable(name)
        .ok_or_else(|| RasterError::MissingData(format!("{} variable", name)))?;

    let raw: Vec<f64> = var.get_values(..)?;
    if raw.len() != expected {
        return Err(RasterError::InvalidFormat(format!(
            "{} axis holds {} values, grid needs {}",
            name,
            raw.len(),
            expected
        )));
    }

    let scale = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);

    let angles = raw.into_iter().map(|v| v * scale + offset).collect();

    Ok((angles, scale))
}

/// Projection parameters from the `goes_imager_projection` variable, with the
/// GOES-16 constants as fallbacks for absent attributes.
fn read_projection(file: &netcdf::File) -> GeosProjection {
    let defaults = GeosProjection::default();

    match file.variable("goes_imager_projection") {
        Some(var) => GeosProjection {
            perspective_point_height: get_f64_attr(&var, "perspective_point_height")
                .unwrap_or(defaults.perspective_point_height),
            semi_major_axis: get_f64_attr(&var, "semi_major_axis")
                .unwrap_or(defaults.semi_major_axis),
            semi_minor_axis: get_f64_attr(&var, "semi_minor_axis")
                .unwrap_or(defaults.semi_minor_axis),
            longitude_origin: get_f64_attr(&var, "longitude_of_projection_origin")
                .unwrap_or(defaults.longitude_origin),
        },
        None => defaults,
    }
}

/// Check for an attribute without triggering HDF5 error spam.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdc_common::{Satellite, Sector};

    #[test]
    fn test_open_rejects_wrong_extension() {
        let err = FdcGranule::open("archive/G16/notes.txt").unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedFile(_)));

        let err = FdcGranule::open("archive/G16/no_extension").unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedFile(_)));
    }

    #[test]
    fn test_open_rejects_meso_sectors() {
        let err = FdcGranule::open(
            "OR_ABI-L2-FDCM1-M6_G16_s20202381501123_e20202381503496_c20202381504039.nc",
        )
        .unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedFile(_)));
    }

    #[test]
    fn test_open_rejects_unparsable_names() {
        let err = FdcGranule::open("mystery_granule.nc").unwrap_err();
        assert!(matches!(err, RasterError::BadName(_)));
    }

    #[test]
    fn test_open_parses_identity_without_touching_the_raster() {
        let granule = FdcGranule::open(
            "G16/ABI-L2-FDCC/2020/238/15/OR_ABI-L2-FDCC-M6_G16_s20202381501123_e20202381503496_c20202381504039.nc",
        )
        .unwrap();

        let id = granule.granule_id();
        assert_eq!(id.satellite, Satellite::G16);
        assert_eq!(id.sector, Sector::Conus);
    }
}
