use std::fmt;

use ahash::AHashMap;
use anyhow::{anyhow, Context, Result};
use geo::Coord;
use proj4rs::{proj::Proj as Proj4, transform::transform};
use serde::{Deserialize, Serialize};

/// Numeric thresholds used by integration, cropping and insetting.
///
/// The defaults are empirically tuned for map coordinates in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Slop added to edge bounding boxes before candidate pairing.
    pub bbox_slop:           f64,
    /// Edges whose bounding box is smaller than this in both axes are indexed as short.
    pub short_edge_cutoff:   f64,
    /// Squared distance under which a point counts as lying on a segment.
    pub colinear_sq_dist:    f64,
    /// Cosine above which two consecutive edges are treated as continuing straight.
    pub inset_colinear_dot:  f64,
    /// Cosine below which a right turn is mitred instead of intersected.
    pub inset_pinch_dot:     f64,
    /// Upper bound on ring cleanup passes before insetting.
    pub max_cleanup_passes:  usize,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            bbox_slop:          1e-5,
            short_edge_cutoff:  0.005,
            colinear_sq_dist:   7.7e-12,
            inset_colinear_dot: 0.999961923064,
            inset_pinch_dot:    -0.5,
            max_cleanup_passes: 64,
        }
    }
}

/// A UTM zone; `south` selects the southern false northing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UtmZone {
    pub zone:  u8,
    pub south: bool,
}

impl UtmZone {
    /// The zone containing a lon/lat position.
    pub fn containing(lon: f64, lat: f64) -> Self {
        let zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;
        Self { zone, south: lat < 0.0 }
    }

    fn proj4(&self) -> String {
        let south = if self.south { " +south" } else { "" };
        format!("+proj=utm +zone={}{south} +datum=WGS84 +units=m +no_defs +type=crs", self.zone)
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.zone, if self.south { 'S' } else { 'N' })
    }
}

const GEOGRAPHIC: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Per-session state passed explicitly to the map algorithms: tolerances
/// plus a cache of projections, built on first use.
pub struct MapContext {
    pub tolerances: Tolerances,
    /// Coordinates are lon/lat degrees and inset widths are meters.
    pub geographic: bool,
    lonlat:         Option<Proj4>,
    utm:            AHashMap<UtmZone, Proj4>,
}

impl Default for MapContext {
    fn default() -> Self { Self::new(Tolerances::default()) }
}

impl fmt::Debug for MapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut zones: Vec<String> = self.utm.keys().map(UtmZone::to_string).collect();
        zones.sort();
        f.debug_struct("MapContext")
            .field("tolerances", &self.tolerances)
            .field("geographic", &self.geographic)
            .field("cached_zones", &zones)
            .finish()
    }
}

impl MapContext {
    /// A context for planar coordinates.
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances, geographic: false, lonlat: None, utm: AHashMap::new() }
    }

    /// A context for lon/lat coordinates with metric distances.
    pub fn geographic(tolerances: Tolerances) -> Self {
        Self { geographic: true, ..Self::new(tolerances) }
    }

    /// Number of UTM projections built so far.
    #[inline] pub fn cached_zones(&self) -> usize { self.utm.len() }

    /// Build (or fetch) the lon/lat and UTM projections for `zone`.
    fn projections(&mut self, zone: UtmZone) -> Result<(&Proj4, &Proj4)> {
        if self.lonlat.is_none() {
            let proj = Proj4::from_proj_string(GEOGRAPHIC)
                .with_context(|| anyhow!("failed to build source PROJ.4: {GEOGRAPHIC}"))?;
            self.lonlat = Some(proj);
        }
        if !self.utm.contains_key(&zone) {
            let proj_string = zone.proj4();
            let proj = Proj4::from_proj_string(&proj_string)
                .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?;
            self.utm.insert(zone, proj);
        }

        let lonlat = self.lonlat.as_ref().context("lon/lat projection missing")?;
        let utm = self.utm.get(&zone).context("UTM projection missing")?;
        Ok((lonlat, utm))
    }

    /// Project lon/lat points to meters in the UTM zone of the first point.
    pub fn to_utm(&mut self, points: &[Coord<f64>]) -> Result<(UtmZone, Vec<Coord<f64>>)> {
        let first = points.first().context("no points to project")?;
        let zone = UtmZone::containing(first.x, first.y);
        let (from, to) = self.projections(zone)?;

        // Radians in, meters out.
        let mut projected = Vec::with_capacity(points.len());
        for p in points {
            let mut point = (p.x.to_radians(), p.y.to_radians(), 0.0);
            transform(from, to, &mut point)
                .map_err(|e| anyhow!("CRS transform to UTM {zone} failed: {e:?}"))?;
            projected.push(Coord { x: point.0, y: point.1 });
        }
        Ok((zone, projected))
    }

    /// Inverse of [`MapContext::to_utm`].
    pub fn from_utm(&mut self, zone: UtmZone, points: &[Coord<f64>]) -> Result<Vec<Coord<f64>>> {
        let (lonlat, utm) = self.projections(zone)?;
        let mut out = Vec::with_capacity(points.len());
        for p in points {
            let mut point = (p.x, p.y, 0.0);
            transform(utm, lonlat, &mut point)
                .map_err(|e| anyhow!("CRS transform from UTM {zone} failed: {e:?}"))?;
            out.push(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() });
        }
        Ok(out)
    }
}
