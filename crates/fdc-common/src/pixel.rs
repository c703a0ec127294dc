//! Satellite pixel footprints and the pixel-list perimeter codec.
//!
//! A fire-detection pixel is the convex quadrilateral a raster cell covers on
//! the ground, viewed from a geostationary satellite. Clusters persist their
//! member pixels as a compact little-endian blob (see [`PixelList::serialize`]),
//! which is the `perimeter` column format in the cluster store.

use crate::error::{FdcError, FdcResult};
use crate::geo::{triangle_centroid, BoundingBox, Coord, Line};
use crate::kml::KmlFile;
use std::io::Write;

/// Serialized size of one pixel record in bytes.
///
/// Layout: 8 x f64 corner values as (lon, lat) pairs in ul, ur, lr, ll order,
/// then power, temperature, and area as f64, the fire-mask code as i16, and
/// six reserved zero bytes.
pub const PIXEL_RECORD_LEN: usize = 96;

/// Serialized size of the pixel-count header in bytes.
pub const PIXEL_LIST_HEADER_LEN: usize = 8;

/// The quadrilateral footprint of one raster cell plus its fire attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatPixel {
    /// Upper-left (northwest) corner.
    pub ul: Coord,
    /// Upper-right (northeast) corner.
    pub ur: Coord,
    /// Lower-right (southeast) corner.
    pub lr: Coord,
    /// Lower-left (southwest) corner.
    pub ll: Coord,
    /// Fire radiative power in megawatts.
    pub power: f64,
    /// Fire brightness temperature in Kelvin.
    pub temperature: f64,
    /// Fire area in square kilometers.
    pub area: f64,
    /// Fire-mask code from the detection algorithm.
    pub mask: i16,
}

impl SatPixel {
    /// Corners in winding order: ul, ur, lr, ll.
    pub fn corners(&self) -> [Coord; 4] {
        [self.ul, self.ur, self.lr, self.ll]
    }

    fn edges(&self) -> [Line; 4] {
        [
            Line::new(self.ul, self.ur),
            Line::new(self.ur, self.lr),
            Line::new(self.lr, self.ll),
            Line::new(self.ll, self.ul),
        ]
    }

    /// Centroid of the quadrilateral.
    ///
    /// Found as the intersection of the two lines connecting the centroids of
    /// the two triangulations, one per diagonal. Exact for any convex
    /// quadrilateral. Inputs come off the satellite grid and are never
    /// degenerate; a zero-area quad falls back to the vertex mean.
    pub fn centroid(&self) -> Coord {
        let t1 = triangle_centroid(self.ul, self.ll, self.lr);
        let t2 = triangle_centroid(self.ul, self.ur, self.lr);
        let diag1 = Line::new(t1, t2);

        let t3 = triangle_centroid(self.ul, self.ll, self.ur);
        let t4 = triangle_centroid(self.lr, self.ur, self.ll);
        let diag2 = Line::new(t3, t4);

        match diag1.intersection(diag2, 1.0e-30) {
            Some(res) => res.point,
            None => Coord {
                lat: (self.ul.lat + self.ur.lat + self.lr.lat + self.ll.lat) / 4.0,
                lon: (self.ul.lon + self.ur.lon + self.lr.lon + self.ll.lon) / 4.0,
            },
        }
    }

    /// Axis-aligned bounding box of the four corners.
    pub fn bounding_box(&self) -> BoundingBox {
        let min_lat = self.ll.lat.min(self.lr.lat).min(self.ul.lat).min(self.ur.lat);
        let max_lat = self.ll.lat.max(self.lr.lat).max(self.ul.lat).max(self.ur.lat);
        let min_lon = self.ll.lon.min(self.lr.lon).min(self.ul.lon).min(self.ur.lon);
        let max_lon = self.ll.lon.max(self.lr.lon).max(self.ul.lon).max(self.ur.lon);

        BoundingBox::new(
            Coord::new(min_lat, min_lon),
            Coord::new(max_lat, max_lon),
        )
    }

    /// True when the two footprints are the same pixel geographically.
    ///
    /// Compares only the corners, not power or the other fire attributes.
    pub fn approx_equal(&self, other: &SatPixel, eps: f64) -> bool {
        self.ul.is_close(other.ul, eps)
            && self.ur.is_close(other.ur, eps)
            && self.lr.is_close(other.lr, eps)
            && self.ll.is_close(other.ll, eps)
    }

    /// True when `coord` is interior to the pixel (boundary points are out).
    ///
    /// After a bounding-box fast reject, a segment is shot from the query
    /// point to each corner; any crossing with an edge that is not merely an
    /// endpoint touch proves the point is outside. Only valid for convex
    /// quadrilaterals.
    pub fn contains_coord(&self, coord: Coord, eps: f64) -> bool {
        if !self.bounding_box().contains(coord) {
            return false;
        }

        let probes = [
            Line::new(coord, self.ul),
            Line::new(coord, self.ur),
            Line::new(coord, self.lr),
            Line::new(coord, self.ll),
        ];

        for edge in self.edges() {
            for probe in probes {
                if edge.crosses(probe, eps) {
                    return false;
                }
            }
        }

        true
    }

    /// True when the footprints overlap.
    ///
    /// Overlap holds when the pixels are approximately equal, when any edge of
    /// one strictly crosses an edge of the other, or when a vertex of one is
    /// strictly inside the other. The vertex check covers the rare case of one
    /// pixel wholly contained in the other.
    pub fn overlaps(&self, other: &SatPixel, eps: f64) -> bool {
        if self.approx_equal(other, eps) {
            return true;
        }

        if !self.bounding_box().overlaps(&other.bounding_box(), eps) {
            return false;
        }

        for s_edge in self.edges() {
            for o_edge in other.edges() {
                if s_edge.crosses(o_edge, eps) {
                    return true;
                }
            }
        }

        for corner in self.corners() {
            if other.contains_coord(corner, eps) {
                return true;
            }
        }

        for corner in other.corners() {
            if self.contains_coord(corner, eps) {
                return true;
            }
        }

        false
    }

    /// True when the footprints share an edge but not interior area.
    ///
    /// Adjacency requires two corners of one pixel to coincide (within `eps`)
    /// with two consecutive corners of the other, forming the shared edge,
    /// while neither pixel reaches into the interior of its neighbor.
    pub fn is_adjacent_to(&self, other: &SatPixel, eps: f64) -> bool {
        if self.approx_equal(other, eps) {
            return false;
        }

        if !self.bounding_box().overlaps(&other.bounding_box(), eps) {
            return false;
        }

        let self_corners = self.corners();
        let other_corners = other.corners();

        let mut self_matched = [false; 4];
        let mut other_matched = [false; 4];
        let mut pairs = [(0usize, 0usize); 2];
        let mut num_matched = 0;

        for (i, sc) in self_corners.iter().enumerate() {
            for (j, oc) in other_corners.iter().enumerate() {
                if sc.is_close(*oc, eps) {
                    self_matched[i] = true;
                    other_matched[j] = true;
                    if num_matched < 2 {
                        pairs[num_matched] = (i, j);
                    }
                    num_matched += 1;
                }
            }
        }

        if num_matched != 2 {
            return false;
        }

        // The matched corners must be consecutive in winding order on both
        // pixels, otherwise they do not form an edge.
        if !consecutive(&self_matched) || !consecutive(&other_matched) {
            return false;
        }

        // Neighbors traverse the shared edge in opposite directions: the
        // matching order must be reversed, so the index deltas around the
        // two windings cancel mod 4.
        let (i1, j1) = pairs[0];
        let (i2, j2) = pairs[1];
        let delta_self = (i2 + 4 - i1) % 4;
        let delta_other = (j2 + 4 - j1) % 4;
        if (delta_self + delta_other) % 4 != 0 {
            return false;
        }

        // No unmatched corner may sit inside the other pixel.
        for i in 0..4 {
            if !self_matched[i] && other.contains_coord(self_corners[i], eps) {
                return false;
            }
            if !other_matched[i] && self.contains_coord(other_corners[i], eps) {
                return false;
            }
        }

        // Neither centroid may be interior to the other.
        if other.contains_coord(self.centroid(), eps) || self.contains_coord(other.centroid(), eps)
        {
            return false;
        }

        true
    }

    fn write_record(&self, out: &mut Vec<u8>) {
        for corner in self.corners() {
            out.extend_from_slice(&corner.lon.to_le_bytes());
            out.extend_from_slice(&corner.lat.to_le_bytes());
        }
        out.extend_from_slice(&self.power.to_le_bytes());
        out.extend_from_slice(&self.temperature.to_le_bytes());
        out.extend_from_slice(&self.area.to_le_bytes());
        out.extend_from_slice(&self.mask.to_le_bytes());
        out.extend_from_slice(&[0u8; 6]);
    }

    fn read_record(buf: &[u8]) -> SatPixel {
        debug_assert!(buf.len() >= PIXEL_RECORD_LEN);

        let coord = |at: usize| Coord {
            lon: read_f64(buf, at),
            lat: read_f64(buf, at + 8),
        };

        SatPixel {
            ul: coord(0),
            ur: coord(16),
            lr: coord(32),
            ll: coord(48),
            power: read_f64(buf, 64),
            temperature: read_f64(buf, 72),
            area: read_f64(buf, 80),
            mask: read_i16(buf, 88),
        }
    }
}

/// True when exactly the marked entries are cyclically consecutive.
fn consecutive(matched: &[bool; 4]) -> bool {
    for i in 0..4 {
        if matched[i] && matched[(i + 1) % 4] {
            return true;
        }
    }
    false
}

fn read_f64(buf: &[u8], at: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    f64::from_le_bytes(bytes)
}

fn read_i16(buf: &[u8], at: usize) -> i16 {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&buf[at..at + 2]);
    i16::from_le_bytes(bytes)
}

/// An ordered, owning sequence of satellite pixels.
///
/// One pixel list holds the member pixels of a single cluster and doubles as
/// the cluster's perimeter description in the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelList(Vec<SatPixel>);

impl PixelList {
    pub fn new() -> Self {
        PixelList(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PixelList(Vec::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, pixel: SatPixel) {
        self.0.push(pixel);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn get(&self, index: usize) -> Option<&SatPixel> {
        self.0.get(index)
    }

    pub fn pixels(&self) -> &[SatPixel] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SatPixel> {
        self.0.iter()
    }

    /// Sum of member pixel power in megawatts, skipping non-finite values.
    pub fn total_power(&self) -> f64 {
        self.0
            .iter()
            .map(|p| p.power)
            .filter(|p| p.is_finite())
            .sum()
    }

    /// Power-weighted centroid of the member pixel centroids.
    ///
    /// Falls back to the unweighted mean when the total power is zero.
    pub fn centroid(&self) -> Coord {
        let mut lat = 0.0;
        let mut lon = 0.0;
        let mut weight_sum = 0.0;

        for pixel in &self.0 {
            let c = pixel.centroid();
            let w = if pixel.power.is_finite() { pixel.power } else { 0.0 };
            lat += c.lat * w;
            lon += c.lon * w;
            weight_sum += w;
        }

        if weight_sum > 0.0 {
            return Coord::new(lat / weight_sum, lon / weight_sum);
        }

        let mut lat = 0.0;
        let mut lon = 0.0;
        for pixel in &self.0 {
            let c = pixel.centroid();
            lat += c.lat;
            lon += c.lon;
        }
        let n = self.0.len().max(1) as f64;

        Coord::new(lat / n, lon / n)
    }

    /// Bounding box covering every member pixel.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::new(
            Coord::new(f64::INFINITY, f64::INFINITY),
            Coord::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        );

        for pixel in &self.0 {
            bbox = bbox.union(&pixel.bounding_box());
        }

        bbox
    }

    /// Exact number of bytes [`serialize`](Self::serialize) will produce.
    pub fn serialized_size(&self) -> usize {
        PIXEL_LIST_HEADER_LEN + PIXEL_RECORD_LEN * self.0.len()
    }

    /// Encode the list into the perimeter blob format.
    ///
    /// Little-endian and packed: a u64 pixel count followed by one
    /// [`PIXEL_RECORD_LEN`]-byte record per pixel.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());

        out.extend_from_slice(&(self.0.len() as u64).to_le_bytes());
        for pixel in &self.0 {
            pixel.write_record(&mut out);
        }

        out
    }

    /// Decode a perimeter blob produced by [`serialize`](Self::serialize).
    ///
    /// The buffer must be exactly the advertised size: undersized buffers and
    /// trailing garbage are both rejected.
    pub fn deserialize(buf: &[u8]) -> FdcResult<PixelList> {
        if buf.len() < PIXEL_LIST_HEADER_LEN {
            return Err(FdcError::BlobTooShort {
                have: buf.len(),
                need: PIXEL_LIST_HEADER_LEN,
            });
        }

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&buf[..PIXEL_LIST_HEADER_LEN]);
        let count = u64::from_le_bytes(count_bytes) as usize;

        let need = PIXEL_LIST_HEADER_LEN + PIXEL_RECORD_LEN * count;
        if buf.len() < need {
            return Err(FdcError::BlobTooShort {
                have: buf.len(),
                need,
            });
        }
        if buf.len() > need {
            return Err(FdcError::BlobTrailingBytes {
                extra: buf.len() - need,
            });
        }

        let mut pixels = Vec::with_capacity(count);
        for i in 0..count {
            let at = PIXEL_LIST_HEADER_LEN + i * PIXEL_RECORD_LEN;
            pixels.push(SatPixel::read_record(&buf[at..at + PIXEL_RECORD_LEN]));
        }

        Ok(PixelList(pixels))
    }

    /// Write every member pixel as a KML placemark with its footprint polygon.
    pub fn kml_write<W: Write>(&self, kml: &mut KmlFile<W>) -> FdcResult<()> {
        for pixel in &self.0 {
            let description = format!(
                "Power: {:.0} MW<br/>Temperature: {:.0} K<br/>Area: {:.2} km^2<br/>Mask: {}",
                pixel.power, pixel.temperature, pixel.area, pixel.mask
            );

            kml.start_placemark(None, Some(&description), Some("#fire"))?;
            kml.start_polygon()?;
            for corner in pixel.corners() {
                kml.ring_vertex(corner.lat, corner.lon)?;
            }
            // Repeat the first corner to close the ring.
            kml.ring_vertex(pixel.ul.lat, pixel.ul.lon)?;
            kml.finish_polygon()?;
            kml.finish_placemark()?;
        }

        Ok(())
    }
}

impl FromIterator<SatPixel> for PixelList {
    fn from_iter<I: IntoIterator<Item = SatPixel>>(iter: I) -> Self {
        PixelList(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PixelList {
    type Item = &'a SatPixel;
    type IntoIter = std::slice::Iter<'a, SatPixel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lat: f64, lon: f64, side: f64) -> SatPixel {
        SatPixel {
            ul: Coord::new(lat + side, lon),
            ur: Coord::new(lat + side, lon + side),
            lr: Coord::new(lat, lon + side),
            ll: Coord::new(lat, lon),
            power: 0.0,
            temperature: 0.0,
            area: 0.0,
            mask: 0,
        }
    }

    const EPS: f64 = 1.0e-6;

    #[test]
    fn test_centroid_of_square() {
        let pxl = square(44.0, -120.0, 1.0);
        assert!(pxl.centroid().is_close(Coord::new(44.5, -119.5), 1.0e-12));
    }

    #[test]
    fn test_centroid_of_skewed_quad() {
        let pxl = SatPixel {
            ul: Coord::new(3.0, 2.0),
            ur: Coord::new(5.0, 4.0),
            lr: Coord::new(2.0, 2.0),
            ll: Coord::new(0.0, 0.0),
            ..square(0.0, 0.0, 1.0)
        };

        // The centroid of any convex quadrilateral is interior to it.
        assert!(pxl.contains_coord(pxl.centroid(), EPS));
    }

    #[test]
    fn test_contains_coord() {
        let pxl = square(44.0, -120.0, 1.0);

        assert!(pxl.contains_coord(Coord::new(44.5, -119.5), EPS));

        // Outside on every side and diagonal.
        assert!(!pxl.contains_coord(Coord::new(45.5, -119.5), EPS));
        assert!(!pxl.contains_coord(Coord::new(43.5, -119.5), EPS));
        assert!(!pxl.contains_coord(Coord::new(44.5, -120.5), EPS));
        assert!(!pxl.contains_coord(Coord::new(44.5, -118.5), EPS));
        assert!(!pxl.contains_coord(Coord::new(45.5, -120.5), EPS));

        // Boundary points are not interior.
        assert!(!pxl.contains_coord(Coord::new(45.0, -119.5), EPS));
        assert!(!pxl.contains_coord(Coord::new(44.0, -119.5), EPS));
        assert!(!pxl.contains_coord(Coord::new(44.5, -120.0), EPS));
        assert!(!pxl.contains_coord(Coord::new(44.5, -119.0), EPS));
    }

    #[test]
    fn test_overlap_reflexive_and_symmetric() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.0, 0.5, 1.0);

        assert!(a.overlaps(&a, EPS));
        assert!(a.approx_equal(&a, 0.0));
        assert!(a.overlaps(&b, EPS));
        assert!(b.overlaps(&a, EPS));
    }

    #[test]
    fn test_half_overlapping_squares() {
        // Corners (0,0),(0,1),(1,1),(1,0) and (0.5,0),(0.5,1),(1.5,1),(1.5,0)
        // in (lon, lat) terms: the second square is shifted half a side east.
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.0, 0.5, 1.0);

        assert!(a.overlaps(&b, EPS));
        assert!(!a.is_adjacent_to(&b, EPS));
    }

    #[test]
    fn test_edge_sharing_squares_are_adjacent() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.0, 1.0, 1.0);

        assert!(!a.overlaps(&b, EPS));
        assert!(a.is_adjacent_to(&b, EPS));
        assert!(b.is_adjacent_to(&a, EPS));
    }

    #[test]
    fn test_disjoint_bounding_boxes_never_overlap() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(10.0, 10.0, 1.0);

        assert!(!a.overlaps(&b, EPS));
        assert!(!a.is_adjacent_to(&b, EPS));
    }

    #[test]
    fn test_not_adjacent_to_self() {
        let a = square(0.0, 0.0, 1.0);
        assert!(!a.is_adjacent_to(&a, EPS));
    }

    #[test]
    fn test_same_order_corner_match_is_not_adjacent() {
        // B sits where A's northern neighbor would, but its corners match
        // A's in the same cyclic order instead of reversed (ur and ll are
        // swapped relative to a correctly wound neighbor).
        let a = SatPixel {
            ul: Coord::new(0.0, 0.0),
            ur: Coord::new(0.0, 1.0),
            lr: Coord::new(1.0, 1.0),
            ll: Coord::new(1.0, 0.0),
            ..square(0.0, 0.0, 1.0)
        };
        let b = SatPixel {
            ul: Coord::new(1.0, 1.0),
            ur: Coord::new(1.0, 0.0),
            lr: Coord::new(2.0, 0.0),
            ll: Coord::new(2.0, 1.0),
            ..square(0.0, 0.0, 1.0)
        };

        assert!(!a.is_adjacent_to(&b, EPS));
        assert!(!b.is_adjacent_to(&a, EPS));
    }

    #[test]
    fn test_corner_touch_is_not_adjacent() {
        // Diagonal neighbors share one corner, not an edge.
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 1.0, 1.0);

        assert!(!a.is_adjacent_to(&b, EPS));
    }

    #[test]
    fn test_grid_neighbors_adjacency() {
        // A 3x3 grid of unit squares around the center pixel.
        let center = square(44.0, -120.0, 1.0);
        let north = square(45.0, -120.0, 1.0);
        let south = square(43.0, -120.0, 1.0);
        let east = square(44.0, -119.0, 1.0);
        let west = square(44.0, -121.0, 1.0);

        for n in [&north, &south, &east, &west] {
            assert!(center.is_adjacent_to(n, EPS));
            assert!(n.is_adjacent_to(&center, EPS));
        }

        // Non-neighbors two cells apart share nothing.
        let far_east = square(44.0, -118.0, 1.0);
        assert!(!center.is_adjacent_to(&far_east, EPS));
        assert!(!center.overlaps(&far_east, EPS));
    }

    #[test]
    fn test_contained_pixel_overlaps() {
        let outer = square(0.0, 0.0, 3.0);
        let inner = square(1.0, 1.0, 1.0);

        assert!(outer.overlaps(&inner, EPS));
        assert!(inner.overlaps(&outer, EPS));
    }

    #[test]
    fn test_pixel_list_basics() {
        let mut list = PixelList::new();
        assert!(list.is_empty());

        list.push(square(0.0, 0.0, 1.0));
        list.push(square(0.0, 1.0, 1.0));
        assert_eq!(list.len(), 2);
        assert!(list.get(1).is_some());
        assert!(list.get(2).is_none());

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_power_weighted_centroid() {
        let mut a = square(0.0, 0.0, 1.0);
        a.power = 1.0;
        let mut b = square(0.0, 2.0, 1.0);
        b.power = 3.0;

        let list: PixelList = [a, b].into_iter().collect();
        let c = list.centroid();

        // Weighted toward b: (0.5*1 + 2.5*3) / 4 = 2.0 in lon.
        assert!((c.lon - 2.0).abs() < 1.0e-12);
        assert!((c.lat - 0.5).abs() < 1.0e-12);
    }

    #[test]
    fn test_zero_power_centroid_is_unweighted() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.0, 2.0, 1.0);

        let list: PixelList = [a, b].into_iter().collect();
        let c = list.centroid();

        assert!((c.lon - 1.5).abs() < 1.0e-12);
        assert!((c.lat - 0.5).abs() < 1.0e-12);
    }

    #[test]
    fn test_codec_round_trip() {
        let mut a = square(44.0, -120.0, 0.02);
        a.power = 123.5;
        a.temperature = 410.25;
        a.area = 0.75;
        a.mask = 13;

        let mut b = square(44.02, -120.0, 0.02);
        b.power = 88.0;
        b.temperature = 395.0;
        b.area = 0.5;
        b.mask = 10;

        let list: PixelList = [a, b].into_iter().collect();

        let blob = list.serialize();
        assert_eq!(blob.len(), list.serialized_size());
        assert_eq!(blob.len(), PIXEL_LIST_HEADER_LEN + 2 * PIXEL_RECORD_LEN);

        let restored = PixelList::deserialize(&blob).unwrap();
        assert_eq!(restored, list);
    }

    #[test]
    fn test_codec_empty_list() {
        let list = PixelList::new();
        let blob = list.serialize();
        assert_eq!(blob.len(), PIXEL_LIST_HEADER_LEN);

        let restored = PixelList::deserialize(&blob).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_codec_rejects_undersized_buffer() {
        let list: PixelList = [square(0.0, 0.0, 1.0)].into_iter().collect();
        let blob = list.serialize();

        let err = PixelList::deserialize(&blob[..blob.len() - 1]).unwrap_err();
        assert!(matches!(err, FdcError::BlobTooShort { .. }));

        let err = PixelList::deserialize(&blob[..4]).unwrap_err();
        assert!(matches!(err, FdcError::BlobTooShort { .. }));
    }

    #[test]
    fn test_codec_rejects_trailing_garbage() {
        let list: PixelList = [square(0.0, 0.0, 1.0)].into_iter().collect();
        let mut blob = list.serialize();
        blob.push(0xFF);

        let err = PixelList::deserialize(&blob).unwrap_err();
        assert!(matches!(err, FdcError::BlobTrailingBytes { extra: 1 }));
    }
}
