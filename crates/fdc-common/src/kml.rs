//! Minimal KML emitter for run summaries.
//!
//! Writes only the element subset the pipeline needs: a document with
//! styles, folders, placemarks, points, timespans, and footprint polygons
//! (`Polygon`/`outerBoundaryIs`/`LinearRing`/`coordinates`, altitude 0).

use crate::error::FdcResult;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// An open KML document being written.
pub struct KmlFile<W: Write> {
    out: W,
}

impl KmlFile<BufWriter<File>> {
    /// Create the file at `path` and write the document preamble.
    pub fn create<P: AsRef<Path>>(path: P) -> FdcResult<Self> {
        let out = BufWriter::new(File::create(path)?);
        KmlFile::start_document(out)
    }
}

impl<W: Write> KmlFile<W> {
    /// Begin a document on an arbitrary writer.
    pub fn start_document(mut out: W) -> FdcResult<Self> {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
        writeln!(out, "<Document>")?;
        Ok(KmlFile { out })
    }

    /// Close the document and flush the writer.
    pub fn finish(mut self) -> FdcResult<()> {
        writeln!(self.out, "</Document>")?;
        writeln!(self.out, "</kml>")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn start_style(&mut self, id: Option<&str>) -> FdcResult<()> {
        match id {
            Some(id) => writeln!(self.out, r#"<Style id="{}">"#, id)?,
            None => writeln!(self.out, "<Style>")?,
        }
        Ok(())
    }

    pub fn finish_style(&mut self) -> FdcResult<()> {
        writeln!(self.out, "</Style>")?;
        Ok(())
    }

    /// A polygon style with an aabbggrr color, fill, and outline flags.
    pub fn poly_style(&mut self, color: &str, fill: bool, outline: bool) -> FdcResult<()> {
        writeln!(self.out, "<PolyStyle>")?;
        writeln!(self.out, "<color>{}</color>", color)?;
        writeln!(self.out, "<fill>{}</fill>", fill as u8)?;
        writeln!(self.out, "<outline>{}</outline>", outline as u8)?;
        writeln!(self.out, "</PolyStyle>")?;
        Ok(())
    }

    pub fn icon_style(&mut self, href: &str, scale: f64) -> FdcResult<()> {
        writeln!(self.out, "<IconStyle>")?;
        writeln!(self.out, "<scale>{}</scale>", scale)?;
        writeln!(self.out, "<Icon><href>{}</href></Icon>", href)?;
        writeln!(self.out, "</IconStyle>")?;
        Ok(())
    }

    pub fn start_folder(&mut self, name: Option<&str>, open: bool) -> FdcResult<()> {
        writeln!(self.out, "<Folder>")?;
        if let Some(name) = name {
            writeln!(self.out, "<name>{}</name>", name)?;
        }
        writeln!(self.out, "<open>{}</open>", open as u8)?;
        Ok(())
    }

    pub fn finish_folder(&mut self) -> FdcResult<()> {
        writeln!(self.out, "</Folder>")?;
        Ok(())
    }

    pub fn start_placemark(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        style_url: Option<&str>,
    ) -> FdcResult<()> {
        writeln!(self.out, "<Placemark>")?;
        if let Some(name) = name {
            writeln!(self.out, "<name>{}</name>", name)?;
        }
        if let Some(description) = description {
            writeln!(self.out, "<description><![CDATA[{}]]></description>", description)?;
        }
        if let Some(style_url) = style_url {
            writeln!(self.out, "<styleUrl>{}</styleUrl>", style_url)?;
        }
        Ok(())
    }

    pub fn finish_placemark(&mut self) -> FdcResult<()> {
        writeln!(self.out, "</Placemark>")?;
        Ok(())
    }

    pub fn point(&mut self, lat: f64, lon: f64) -> FdcResult<()> {
        writeln!(self.out, "<Point>")?;
        writeln!(self.out, "<coordinates>{},{},0</coordinates>", lon, lat)?;
        writeln!(self.out, "</Point>")?;
        Ok(())
    }

    pub fn timespan(&mut self, begin: DateTime<Utc>, end: DateTime<Utc>) -> FdcResult<()> {
        writeln!(self.out, "<TimeSpan>")?;
        writeln!(self.out, "<begin>{}</begin>", begin.format("%Y-%m-%dT%H:%M:%SZ"))?;
        writeln!(self.out, "<end>{}</end>", end.format("%Y-%m-%dT%H:%M:%SZ"))?;
        writeln!(self.out, "</TimeSpan>")?;
        Ok(())
    }

    /// Open a ground-clamped polygon and its outer ring.
    pub fn start_polygon(&mut self) -> FdcResult<()> {
        writeln!(self.out, "<Polygon>")?;
        writeln!(self.out, "<altitudeMode>clampToGround</altitudeMode>")?;
        writeln!(self.out, "<outerBoundaryIs>")?;
        writeln!(self.out, "<LinearRing>")?;
        writeln!(self.out, "<coordinates>")?;
        Ok(())
    }

    /// One ring vertex; callers repeat the first vertex to close the ring.
    pub fn ring_vertex(&mut self, lat: f64, lon: f64) -> FdcResult<()> {
        writeln!(self.out, "{},{},0", lon, lat)?;
        Ok(())
    }

    pub fn finish_polygon(&mut self) -> FdcResult<()> {
        writeln!(self.out, "</coordinates>")?;
        writeln!(self.out, "</LinearRing>")?;
        writeln!(self.out, "</outerBoundaryIs>")?;
        writeln!(self.out, "</Polygon>")?;
        Ok(())
    }
}
