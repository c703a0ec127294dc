//! Run statistics folded by the writer stage.
//!
//! Two value-typed accumulators: one over individual clusters (the single
//! most powerful cluster seen, plus weak-cluster counts) and one over whole
//! granules (min/max cluster count and total power, with their granule
//! tags). Both print as the run summary when the writer shuts down.

use fdc_cluster::{Cluster, ClusterList};
use fdc_common::{FdcResult, GranuleId, KmlFile};
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// One extreme cluster together with the granule it came from.
#[derive(Debug, Clone)]
pub struct TaggedCluster {
    pub cluster: Cluster,
    pub granule: GranuleId,
}

/// Statistics over every individual cluster the writer stored.
#[derive(Debug, Clone)]
pub struct ClusterStats {
    biggest: TaggedCluster,
    num_clusters: u32,
    num_power_lt_1mw: u32,
    num_power_lt_10mw: u32,
}

impl ClusterStats {
    /// Fold one granule's clusters into the accumulator.
    pub fn update(stats: &mut Option<Self>, list: &ClusterList) {
        let granule = list.granule_id();

        for cluster in list.clusters() {
            let stats = stats.get_or_insert_with(|| ClusterStats {
                biggest: TaggedCluster {
                    cluster: cluster.clone(),
                    granule,
                },
                num_clusters: 0,
                num_power_lt_1mw: 0,
                num_power_lt_10mw: 0,
            });

            if cluster.total_power() > stats.biggest.cluster.total_power() {
                stats.biggest = TaggedCluster {
                    cluster: cluster.clone(),
                    granule,
                };
            }

            let power = cluster.total_power();
            if power < 1.0 {
                stats.num_power_lt_1mw += 1;
            }
            if power < 10.0 {
                stats.num_power_lt_10mw += 1;
            }
            stats.num_clusters += 1;
        }
    }

    pub fn biggest(&self) -> &TaggedCluster {
        &self.biggest
    }
}

fn pct(num: u32, denom: u32) -> u32 {
    if denom == 0 {
        return 0;
    }
    ((num as f64 / denom as f64) * 100.0).round() as u32
}

impl Display for ClusterStats {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let centroid = self.biggest.cluster.centroid();

        writeln!(f, "\nIndividual Cluster Stats\n")?;
        writeln!(f, " Most Powerful:")?;
        writeln!(f, "     satellite: {}", self.biggest.granule.satellite)?;
        writeln!(f, "        sector: {}", self.biggest.granule.sector)?;
        writeln!(f, "         start: {}", self.biggest.granule.scan_start)?;
        writeln!(f, "           end: {}", self.biggest.granule.scan_end)?;
        writeln!(f, "           Lat: {:10.6}", centroid.lat)?;
        writeln!(f, "           Lon: {:11.6}", centroid.lon)?;
        writeln!(f, "         Count: {:3}", self.biggest.cluster.pixel_count())?;
        writeln!(
            f,
            "         Power: {:5.0} MW\n",
            self.biggest.cluster.total_power()
        )?;
        writeln!(f, "        Counts:")?;
        writeln!(f, "         Total: {:10}", self.num_clusters)?;
        writeln!(f, "  Power < 1 MW: {:10}", self.num_power_lt_1mw)?;
        writeln!(
            f,
            "    Pct < 1 MW: {:10}%",
            pct(self.num_power_lt_1mw, self.num_clusters)
        )?;
        writeln!(f, " Power < 10 MW: {:10}", self.num_power_lt_10mw)?;
        writeln!(
            f,
            "   Pct < 10 MW: {:10}%",
            pct(self.num_power_lt_10mw, self.num_clusters)
        )
    }
}

/// Snapshot of one granule used for the min/max tags.
#[derive(Debug, Clone, Copy)]
pub struct GranuleStat {
    pub granule: GranuleId,
    pub num_clusters: usize,
    pub total_power: f64,
}

impl From<&ClusterList> for GranuleStat {
    fn from(list: &ClusterList) -> Self {
        GranuleStat {
            granule: list.granule_id(),
            num_clusters: list.len(),
            total_power: list.total_power(),
        }
    }
}

impl Display for GranuleStat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "       satellite: {}", self.granule.satellite)?;
        writeln!(f, "          sector: {}", self.granule.sector)?;
        writeln!(f, "           start: {}", self.granule.scan_start)?;
        writeln!(f, "             end: {}", self.granule.scan_end)?;
        writeln!(f, "  Total Clusters: {}", self.num_clusters)?;
        writeln!(f, "     Total Power: {:.0} MW\n", self.total_power)
    }
}

/// Per-granule extremes over the whole run.
#[derive(Debug, Clone)]
pub struct GranuleStats {
    min_clusters: GranuleStat,
    max_clusters: GranuleStat,
    min_power: GranuleStat,
    max_power: GranuleStat,
}

impl GranuleStats {
    /// Fold one granule into the accumulator.
    pub fn update(stats: &mut Option<Self>, list: &ClusterList) {
        let snapshot = GranuleStat::from(list);

        match stats {
            None => {
                *stats = Some(GranuleStats {
                    min_clusters: snapshot,
                    max_clusters: snapshot,
                    min_power: snapshot,
                    max_power: snapshot,
                });
            }
            Some(stats) => {
                if snapshot.num_clusters > stats.max_clusters.num_clusters {
                    stats.max_clusters = snapshot;
                }
                if snapshot.num_clusters < stats.min_clusters.num_clusters {
                    stats.min_clusters = snapshot;
                }
                if snapshot.total_power > stats.max_power.total_power {
                    stats.max_power = snapshot;
                }
                if snapshot.total_power < stats.min_power.total_power {
                    stats.min_power = snapshot;
                }
            }
        }
    }
}

impl Display for GranuleStats {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "\nMax Granule Power:\n{}", self.max_power)?;
        writeln!(f, "Min Granule Power:\n{}", self.min_power)?;
        writeln!(f, "Max Granule Cluster Count:\n{}", self.max_clusters)?;
        writeln!(f, "Min Granule Cluster Count:\n{}", self.min_clusters)
    }
}

/// Write the KML sidecar describing the biggest cluster of this run.
pub fn save_biggest_cluster_kml<P: AsRef<Path>>(path: P, stats: &ClusterStats) -> FdcResult<()> {
    let biggest = stats.biggest();
    let centroid = biggest.cluster.centroid();

    let mut kml = KmlFile::create(path)?;

    kml.start_style(Some("fire"))?;
    kml.poly_style("880000FF", true, false)?;
    kml.icon_style("http://maps.google.com/mapfiles/kml/shapes/firedept.png", 1.3)?;
    kml.finish_style()?;

    kml.start_folder(Some("BiggestFire"), true)?;
    kml.timespan(biggest.granule.scan_start, biggest.granule.scan_end)?;

    let description = format!(
        "Satellite: {}<br/>Sector: {}<br/>Power: {:.0} MW<br/>Pixels: {}",
        biggest.granule.satellite,
        biggest.granule.sector,
        biggest.cluster.total_power(),
        biggest.cluster.pixel_count()
    );
    kml.start_placemark(Some("Biggest Fire"), Some(&description), Some("#fire"))?;
    kml.point(centroid.lat, centroid.lon)?;
    kml.finish_placemark()?;

    biggest.cluster.pixels().kml_write(&mut kml)?;

    kml.finish_folder()?;
    kml.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};
    use fdc_common::{Coord, SatPixel, Satellite, Sector};

    fn granule(hour: u32) -> GranuleId {
        GranuleId {
            satellite: Satellite::G16,
            sector: Sector::Conus,
            scan_start: Utc.with_ymd_and_hms(2020, 8, 25, hour, 1, 12).unwrap(),
            scan_end: Utc.with_ymd_and_hms(2020, 8, 25, hour, 3, 49).unwrap(),
        }
    }

    fn list(hour: u32, powers: &[f64]) -> ClusterList {
        let pixels = powers
            .iter()
            .enumerate()
            .map(|(i, &power)| {
                let lat = 30.0 + 5.0 * i as f64;
                SatPixel {
                    ul: Coord::new(lat + 0.02, -120.0),
                    ur: Coord::new(lat + 0.02, -119.98),
                    lr: Coord::new(lat, -119.98),
                    ll: Coord::new(lat, -120.0),
                    power,
                    temperature: 400.0,
                    area: 0.5,
                    mask: 10,
                }
            })
            .collect();
        ClusterList::from_pixels(granule(hour), pixels)
    }

    #[test]
    fn test_cluster_stats_tracks_biggest_and_counts() {
        let mut stats = None;
        ClusterStats::update(&mut stats, &list(15, &[0.5, 5.0, 250.0]));
        ClusterStats::update(&mut stats, &list(16, &[40.0]));

        let stats = stats.unwrap();
        assert_eq!(stats.num_clusters, 4);
        assert_eq!(stats.num_power_lt_1mw, 1);
        assert_eq!(stats.num_power_lt_10mw, 2);
        assert!((stats.biggest().cluster.total_power() - 250.0).abs() < 1.0e-9);
        assert_eq!(stats.biggest().granule.scan_start.hour(), 15);
    }

    #[test]
    fn test_granule_stats_extremes() {
        let mut stats = None;
        GranuleStats::update(&mut stats, &list(15, &[1.0, 2.0]));
        GranuleStats::update(&mut stats, &list(16, &[100.0]));
        GranuleStats::update(&mut stats, &list(17, &[0.25, 0.5, 0.25]));

        let stats = stats.unwrap();
        assert_eq!(stats.max_clusters.num_clusters, 3);
        assert_eq!(stats.min_clusters.num_clusters, 1);
        assert!((stats.max_power.total_power - 100.0).abs() < 1.0e-9);
        assert!((stats.min_power.total_power - 1.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_summaries_render() {
        let mut cluster_stats = None;
        let mut granule_stats = None;
        let sample = list(15, &[3.0, 42.0]);
        ClusterStats::update(&mut cluster_stats, &sample);
        GranuleStats::update(&mut granule_stats, &sample);

        let text = format!("{}", cluster_stats.unwrap());
        assert!(text.contains("Most Powerful:"));
        assert!(text.contains("Total:"));

        let text = format!("{}", granule_stats.unwrap());
        assert!(text.contains("Max Granule Power:"));
    }

    #[test]
    fn test_kml_sidecar_written() {
        let mut stats = None;
        ClusterStats::update(&mut stats, &list(15, &[42.0]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusters.sqlite.kml");
        save_biggest_cluster_kml(&path, &stats.unwrap()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("BiggestFire"));
        assert!(text.contains("<outerBoundaryIs>"));
    }
}
