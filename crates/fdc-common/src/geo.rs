//! Geometry kernel: coordinates, line segments, bounding boxes, and
//! great-circle distance.
//!
//! All coordinates are WGS-84 decimal degrees. The segment-intersection and
//! containment predicates here operate in plain lat/lon degree space; that is
//! adequate because satellite pixel footprints are a couple of kilometers
//! across and nowhere near the antimeridian in the GOES-East/West domains.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0090;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Approximate equality: squared Euclidean distance in degree space
    /// within `eps` squared.
    pub fn is_close(&self, other: Coord, eps: f64) -> bool {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon <= eps * eps
    }
}

/// Centroid of a triangle given by three vertices.
pub fn triangle_centroid(v1: Coord, v2: Coord, v3: Coord) -> Coord {
    Coord {
        lat: (v1.lat + v2.lat + v3.lat) / 3.0,
        lon: (v1.lon + v2.lon + v3.lon) / 3.0,
    }
}

/// Great-circle distance between two points in kilometers (haversine).
pub fn great_circle_distance(a: Coord, b: Coord) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat2 = (lat2 - lat1) / 2.0;
    let dlon2 = (b.lon - a.lon).to_radians() / 2.0;

    let h = dlat2.sin().powi(2) + dlon2.sin().powi(2) * lat1.cos() * lat2.cos();

    2.0 * h.sqrt().asin() * EARTH_RADIUS_KM
}

/// A line segment between two coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub start: Coord,
    pub end: Coord,
}

/// Where two segments meet, if their carrier lines are not parallel.
#[derive(Debug, Clone, Copy)]
pub struct LineIntersection {
    /// Intersection point of the carrier lines.
    pub point: Coord,
    /// True when the point lies within the lat/lon range of both segments
    /// (closed ranges).
    pub within_both: bool,
    /// True when the point coincides (within eps) with an endpoint of *each*
    /// segment.
    pub endpoints_only: bool,
}

impl Line {
    pub fn new(start: Coord, end: Coord) -> Self {
        Self { start, end }
    }

    /// Intersect two segments using their slopes in lon/lat space.
    ///
    /// Returns `None` when the slopes are equal or both infinite (parallel or
    /// colinear segments). Colinear overlap counts as non-intersection here;
    /// overlap detection compensates by also checking vertex containment.
    pub fn intersection(&self, other: Line, eps: f64) -> Option<LineIntersection> {
        let m1 = (self.end.lat - self.start.lat) / (self.end.lon - self.start.lon);
        let m2 = (other.end.lat - other.start.lat) / (other.end.lon - other.start.lon);

        if m1 == m2 || (m1.is_infinite() && m2.is_infinite()) {
            return None;
        }

        let x1 = self.start.lon;
        let y1 = self.start.lat;
        let x2 = other.start.lon;
        let y2 = other.start.lat;

        let (x0, y0) = if m1.is_infinite() {
            // self is vertical
            let x0 = self.start.lon;
            (x0, m2 * (x0 - x2) + y2)
        } else if m2.is_infinite() {
            // other is vertical
            let x0 = other.start.lon;
            (x0, m1 * (x0 - x1) + y1)
        } else {
            let x0 = (y2 - y1 + m1 * x1 - m2 * x2) / (m1 - m2);
            (x0, m1 * (x0 - x1) + y1)
        };

        let point = Coord { lat: y0, lon: x0 };

        let within_both = Self::in_range(self, point) && Self::in_range(&other, point);

        let endpoints_only = within_both
            && (point.is_close(self.start, eps) || point.is_close(self.end, eps))
            && (point.is_close(other.start, eps) || point.is_close(other.end, eps));

        Some(LineIntersection {
            point,
            within_both,
            endpoints_only,
        })
    }

    /// True when the segments cross somewhere other than a shared endpoint.
    pub fn crosses(&self, other: Line, eps: f64) -> bool {
        match self.intersection(other, eps) {
            Some(res) => res.within_both && !res.endpoints_only,
            None => false,
        }
    }

    fn in_range(line: &Line, p: Coord) -> bool {
        p.lat <= line.start.lat.max(line.end.lat)
            && p.lat >= line.start.lat.min(line.end.lat)
            && p.lon <= line.start.lon.max(line.end.lon)
            && p.lon >= line.start.lon.min(line.end.lon)
    }
}

/// An axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Lower-left (southwest) corner.
    pub ll: Coord,
    /// Upper-right (northeast) corner.
    pub ur: Coord,
}

impl BoundingBox {
    pub fn new(ll: Coord, ur: Coord) -> Self {
        Self { ll, ur }
    }

    /// Strict containment: points on the boundary are outside.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.lon > self.ll.lon
            && coord.lon < self.ur.lon
            && coord.lat > self.ll.lat
            && coord.lat < self.ur.lat
    }

    /// Overlap test with an `eps` tolerance on every edge.
    pub fn overlaps(&self, other: &BoundingBox, eps: f64) -> bool {
        self.ll.lon - eps <= other.ur.lon
            && self.ur.lon + eps >= other.ll.lon
            && self.ll.lat - eps <= other.ur.lat
            && self.ur.lat + eps >= other.ll.lat
    }

    /// Smallest box covering both inputs.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            ll: Coord {
                lat: self.ll.lat.min(other.ll.lat),
                lon: self.ll.lon.min(other.ll.lon),
            },
            ur: Coord {
                lat: self.ur.lat.max(other.ur.lat),
                lon: self.ur.lon.max(other.ur.lon),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_is_close() {
        let a = Coord::new(45.0, -120.0);
        let b = Coord::new(45.0000005, -120.0000005);

        assert!(a.is_close(b, 1.0e-6));
        assert!(!a.is_close(b, 1.0e-7));
    }

    #[test]
    fn test_great_circle_distance_zero() {
        let p = Coord::new(37.1, -112.4);
        assert!(great_circle_distance(p, p).abs() < 1.0e-9);
    }

    #[test]
    fn test_great_circle_quarter_circumference() {
        // Equator to a point 90 degrees of longitude away.
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 90.0);
        let quarter = std::f64::consts::PI * EARTH_RADIUS_KM / 2.0;

        assert!((great_circle_distance(a, b) - quarter).abs() < 1.0);
        assert!((great_circle_distance(a, b) - 10_007.543).abs() < 1.0);
    }

    #[test]
    fn test_great_circle_antipodal() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;

        assert!((great_circle_distance(a, b) - half).abs() < 1.0);
    }

    #[test]
    fn test_lines_cross_at_midpoint() {
        let l1 = Line::new(Coord::new(0.0, 0.0), Coord::new(1.0, 1.0));
        let l2 = Line::new(Coord::new(1.0, 0.0), Coord::new(0.0, 1.0));

        let res = l1.intersection(l2, 1.0e-9).unwrap();
        assert!(res.within_both);
        assert!(!res.endpoints_only);
        assert!(res.point.is_close(Coord::new(0.5, 0.5), 1.0e-9));
        assert!(l1.crosses(l2, 1.0e-9));
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let l1 = Line::new(Coord::new(0.0, 0.0), Coord::new(1.0, 1.0));
        let l2 = Line::new(Coord::new(1.0, 0.0), Coord::new(2.0, 1.0));

        assert!(l1.intersection(l2, 1.0e-9).is_none());
    }

    #[test]
    fn test_vertical_lines_do_not_intersect() {
        let l1 = Line::new(Coord::new(0.0, 2.0), Coord::new(1.0, 2.0));
        let l2 = Line::new(Coord::new(0.0, 3.0), Coord::new(1.0, 3.0));

        assert!(l1.intersection(l2, 1.0e-9).is_none());
    }

    #[test]
    fn test_vertical_and_sloped_cross() {
        let vertical = Line::new(Coord::new(-1.0, 0.5), Coord::new(1.0, 0.5));
        let sloped = Line::new(Coord::new(0.0, 0.0), Coord::new(0.0, 1.0));

        let res = vertical.intersection(sloped, 1.0e-9).unwrap();
        assert!(res.within_both);
        assert!(res.point.is_close(Coord::new(0.0, 0.5), 1.0e-9));
    }

    #[test]
    fn test_shared_endpoint_is_endpoints_only() {
        let l1 = Line::new(Coord::new(0.0, 0.0), Coord::new(1.0, 1.0));
        let l2 = Line::new(Coord::new(1.0, 1.0), Coord::new(0.0, 2.0));

        let res = l1.intersection(l2, 1.0e-9).unwrap();
        assert!(res.within_both);
        assert!(res.endpoints_only);
        assert!(!l1.crosses(l2, 1.0e-9));
    }

    #[test]
    fn test_intersection_outside_segments() {
        let l1 = Line::new(Coord::new(0.0, 0.0), Coord::new(1.0, 1.0));
        let l2 = Line::new(Coord::new(5.0, 0.0), Coord::new(4.0, 1.0));

        let res = l1.intersection(l2, 1.0e-9).unwrap();
        assert!(!res.within_both);
        assert!(!l1.crosses(l2, 1.0e-9));
    }

    #[test]
    fn test_bbox_strict_containment() {
        let bbox = BoundingBox::new(Coord::new(44.0, -120.0), Coord::new(45.0, -119.0));

        assert!(bbox.contains(Coord::new(44.5, -119.5)));
        // Boundary points are outside of an open box.
        assert!(!bbox.contains(Coord::new(44.0, -119.5)));
        assert!(!bbox.contains(Coord::new(44.5, -120.0)));
        assert!(!bbox.contains(Coord::new(46.0, -119.5)));
    }

    #[test]
    fn test_bbox_overlap() {
        let a = BoundingBox::new(Coord::new(0.0, 0.0), Coord::new(10.0, 10.0));
        let b = BoundingBox::new(Coord::new(5.0, 5.0), Coord::new(15.0, 15.0));
        let c = BoundingBox::new(Coord::new(20.0, 20.0), Coord::new(30.0, 30.0));

        assert!(a.overlaps(&b, 0.0));
        assert!(b.overlaps(&a, 0.0));
        assert!(!a.overlaps(&c, 0.0));

        // Boxes touching at an edge overlap once eps is applied.
        let d = BoundingBox::new(Coord::new(0.0, 10.0), Coord::new(10.0, 20.0));
        assert!(a.overlaps(&d, 1.0e-6));
    }
}
