//! Connected-components grouping of fire pixels into clusters.
//!
//! Every pixel of one granule with positive fire power becomes a node; two
//! nodes connect when their footprints overlap or share an edge. The
//! equivalence classes under that relation are the clusters. Grouping is a
//! union-find over all unordered pixel pairs; the pairwise predicates
//! fast-reject on bounding boxes. A granule typically carries at most a few
//! hundred fire pixels, so the quadratic sweep is fine.

mod union_find;

use chrono::{DateTime, Utc};
use fdc_common::{BoundingBox, Coord, GranuleId, PixelList, SatPixel, Satellite, Sector};
use union_find::UnionFind;

/// Corner closeness scale, in degrees, used when comparing pixel footprints.
///
/// Roughly one meter on the ground. Corners of neighboring cells on the ABI
/// fixed grid agree far more tightly than this; unrelated corners are a full
/// cell apart (two kilometers or more).
pub const CLUSTER_EPS: f64 = 1.0e-5;

/// A connected group of fire pixels with cached aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pixels: PixelList,
    total_power: f64,
    centroid: Coord,
    bounding_box: BoundingBox,
}

impl Cluster {
    /// Build a cluster from its member pixels, computing the aggregates.
    pub fn from_pixels(pixels: PixelList) -> Self {
        let total_power = pixels.total_power();
        let centroid = pixels.centroid();
        let bounding_box = pixels.bounding_box();

        Cluster {
            pixels,
            total_power,
            centroid,
            bounding_box,
        }
    }

    pub fn pixels(&self) -> &PixelList {
        &self.pixels
    }

    /// Sum of member pixel power in megawatts.
    pub fn total_power(&self) -> f64 {
        self.total_power
    }

    /// Power-weighted centroid of the member pixels.
    pub fn centroid(&self) -> Coord {
        self.centroid
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// True when any member pixel carries one of the given mask codes.
    pub fn has_mask_code_in(&self, codes: &[i16]) -> bool {
        self.pixels.iter().any(|p| codes.contains(&p.mask))
    }
}

/// The clusters found in one granule, tagged with the granule identity.
#[derive(Debug, Clone)]
pub struct ClusterList {
    satellite: Satellite,
    sector: Sector,
    scan_start: DateTime<Utc>,
    scan_end: DateTime<Utc>,
    clusters: Vec<Cluster>,
    error: Option<String>,
}

impl ClusterList {
    /// Group the fire pixels of one granule into clusters.
    ///
    /// Pixels with non-positive or non-finite power are discarded before
    /// grouping. Two pixels join the same cluster when they overlap or are
    /// adjacent at [`CLUSTER_EPS`]; connectivity is transitive.
    pub fn from_pixels(id: GranuleId, pixels: Vec<SatPixel>) -> Self {
        Self::from_pixels_with_eps(id, pixels, CLUSTER_EPS)
    }

    /// As [`from_pixels`](Self::from_pixels) with a caller-supplied epsilon.
    pub fn from_pixels_with_eps(id: GranuleId, pixels: Vec<SatPixel>, eps: f64) -> Self {
        let fire: Vec<SatPixel> = pixels
            .into_iter()
            .filter(|p| p.power.is_finite() && p.power > 0.0)
            .collect();

        let mut sets = UnionFind::new(fire.len());
        for i in 0..fire.len() {
            for j in (i + 1)..fire.len() {
                if fire[i].overlaps(&fire[j], eps) || fire[i].is_adjacent_to(&fire[j], eps) {
                    sets.union(i, j);
                }
            }
        }

        // Materialize the equivalence classes in first-member order.
        let mut class_of_root: Vec<(usize, usize)> = Vec::new();
        let mut members: Vec<PixelList> = Vec::new();
        for (i, pixel) in fire.iter().enumerate() {
            let root = sets.find(i);
            let class = match class_of_root.iter().find(|(r, _)| *r == root) {
                Some((_, class)) => *class,
                None => {
                    class_of_root.push((root, members.len()));
                    members.push(PixelList::new());
                    members.len() - 1
                }
            };
            members[class].push(*pixel);
        }

        let clusters = members.into_iter().map(Cluster::from_pixels).collect();

        ClusterList {
            satellite: id.satellite,
            sector: id.sector,
            scan_start: id.scan_start,
            scan_end: id.scan_end,
            clusters,
            error: None,
        }
    }

    /// An empty list flagged with a decode error; downstream stages drop it
    /// without touching the store.
    pub fn from_error(id: GranuleId, message: impl Into<String>) -> Self {
        ClusterList {
            satellite: id.satellite,
            sector: id.sector,
            scan_start: id.scan_start,
            scan_end: id.scan_end,
            clusters: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn satellite(&self) -> Satellite {
        self.satellite
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }

    pub fn scan_start(&self) -> DateTime<Utc> {
        self.scan_start
    }

    pub fn scan_end(&self) -> DateTime<Utc> {
        self.scan_end
    }

    /// The granule identity this list was produced from.
    pub fn granule_id(&self) -> GranuleId {
        GranuleId {
            satellite: self.satellite,
            sector: self.sector,
            scan_start: self.scan_start,
            scan_end: self.scan_end,
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sum of total power over all clusters, megawatts.
    pub fn total_power(&self) -> f64 {
        self.clusters.iter().map(Cluster::total_power).sum()
    }

    /// Keep only the clusters satisfying `keep`.
    pub fn retain<F: FnMut(&Cluster) -> bool>(&mut self, keep: F) {
        self.clusters.retain(keep);
    }
}
