//! GOES ABI geostationary projection.
//!
//! Converts between geostationary scan angles (radians from the satellite
//! nadir) and geographic coordinates. The fixed grid of an ABI granule stores
//! per-cell scan angles; evaluating the cell edges through the inverse
//! projection yields the quadrilateral ground footprint of each cell.
//!
//! Formulas follow the GOES-R Product Definition and Users' Guide (PUG)
//! Volume 4, Section 4.2.8.

/// Geostationary projection parameters read from a granule.
#[derive(Debug, Clone)]
pub struct GeosProjection {
    /// Satellite height above the ellipsoid surface (meters).
    pub perspective_point_height: f64,
    /// Semi-major axis of the Earth ellipsoid (meters).
    pub semi_major_axis: f64,
    /// Semi-minor axis of the Earth ellipsoid (meters).
    pub semi_minor_axis: f64,
    /// Longitude of the satellite nadir point (degrees).
    pub longitude_origin: f64,
}

impl Default for GeosProjection {
    fn default() -> Self {
        // GOES-16 (GOES-East) values.
        Self {
            perspective_point_height: 35786023.0,
            semi_major_axis: 6378137.0,
            semi_minor_axis: 6356752.31414,
            longitude_origin: -75.0,
        }
    }
}

impl GeosProjection {
    /// Convert scan angles (radians) to geographic coordinates.
    ///
    /// Returns `(lon, lat)` in degrees, or `None` when the scan angle points
    /// past the limb of the Earth into space.
    pub fn to_geographic(&self, x_rad: f64, y_rad: f64) -> Option<(f64, f64)> {
        let h = self.perspective_point_height;
        let req = self.semi_major_axis;
        let rpol = self.semi_minor_axis;
        let lambda_0 = self.longitude_origin.to_radians();
        let h_total = h + req;

        let sin_x = x_rad.sin();
        let cos_x = x_rad.cos();
        let sin_y = y_rad.sin();
        let cos_y = y_rad.cos();

        // Quadratic coefficients for the distance to the Earth surface.
        let a =
            sin_x.powi(2) + cos_x.powi(2) * (cos_y.powi(2) + (req / rpol).powi(2) * sin_y.powi(2));
        let b = -2.0 * h_total * cos_x * cos_y;
        let c = h_total.powi(2) - req.powi(2);

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let rs = (-b - discriminant.sqrt()) / (2.0 * a);

        // Satellite-centered, Earth-fixed coordinates. sy is negated to match
        // the forward transform where x = atan2(-sy, sx).
        let sx = rs * cos_x * cos_y;
        let sy = -rs * sin_x;
        let sz = rs * cos_x * sin_y;

        let lat = ((req / rpol).powi(2) * sz / (h_total - sx).hypot(sy)).atan();
        let lon = lambda_0 - sy.atan2(h_total - sx);

        Some((lon.to_degrees(), lat.to_degrees()))
    }

    /// Convert geographic coordinates (degrees) to scan angles (radians).
    ///
    /// Returns `None` when the point is on the far side of the Earth from the
    /// satellite.
    pub fn from_geographic(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let h = self.perspective_point_height;
        let req = self.semi_major_axis;
        let rpol = self.semi_minor_axis;
        let lambda_0 = self.longitude_origin.to_radians();
        let h_total = h + req;

        let lat_rad = lat.to_radians();
        let lon_rad = lon.to_radians();

        // Geocentric latitude on the oblate ellipsoid.
        let phi_c = ((rpol / req).powi(2) * lat_rad.tan()).atan();

        let e2 = 1.0 - (rpol / req).powi(2);
        let rc = rpol / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

        let sx = h_total - rc * phi_c.cos() * (lon_rad - lambda_0).cos();
        let sy = -rc * phi_c.cos() * (lon_rad - lambda_0).sin();
        let sz = rc * phi_c.sin();

        if sx <= 0.0 {
            return None;
        }

        let s_xy = sx.hypot(sy);
        let y_rad = sz.atan2(s_xy);
        let x_rad = (-sy).atan2(sx);

        Some((x_rad, y_rad))
    }
}
