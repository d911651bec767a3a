//! Cutting a map along a closed ring.
//!
//! The ring is inserted into the map, a blank template holding only the
//! ring is built, and the two trade their insides through subgraph
//! exchange.  The map keeps the outside with a blank face in the hole; the
//! template walks away with the inside.  Exchanging again puts everything
//! back.

use anyhow::{Context, Result};
use geo::Coord;
use geograph::geom::signed_area;
use geograph::{exchange_subgraph, HalfEdgeId};
use log::debug;

use crate::config::MapContext;
use crate::map::{insert_ring_integrated, Arrangement};

/// The inside of a cropped region, detached from its map.
#[derive(Debug)]
pub struct Crop {
    /// Everything that was inside the ring.
    pub inside: Arrangement,
    /// The ring in the map, running counter-clockwise around the blank face.
    bounds_map:    Vec<HalfEdgeId>,
    /// The same ring in `inside`, running counter-clockwise around the content.
    bounds_inside: Vec<HalfEdgeId>,
}

impl Crop {
    /// The ring's half-edges in the detached inside, in ring order.
    #[inline] pub fn boundary(&self) -> &[HalfEdgeId] { &self.bounds_inside }

    /// The ring's half-edges in the map, in ring order.
    #[inline] pub fn map_boundary(&self) -> &[HalfEdgeId] { &self.bounds_map }
}

/// Cut `map` along `ring` and lift the inside out.  The ring may wind
/// either way and may cross existing edges.
pub fn crop(map: &mut Arrangement, ring: &[Coord<f64>], ctx: &MapContext) -> Result<Crop> {
    let mut ring = ring.to_vec();
    if signed_area(&ring) < 0.0 { ring.reverse(); }

    let bounds_map = insert_ring_integrated(map, &ring, &ctx.tolerances)
        .context("failed to insert crop ring")?;

    // The template follows the ring exactly as it was cut into the map.
    let points: Vec<Coord<f64>> = bounds_map.iter().map(|&h| map.source_point(h)).collect();
    let mut inside = Arrangement::new();
    let bounds_inside = inside.insert_ring(&points).context("failed to build crop template")?;

    let ex = exchange_subgraph(map, &mut inside, &bounds_map, &bounds_inside);
    debug!(
        "cropped {} faces along a {}-edge ring",
        ex.faces_in_b.len(), bounds_map.len(),
    );

    Ok(Crop { inside, bounds_map: ex.bounds_in_a, bounds_inside: ex.bounds_in_b })
}

/// Put a cropped region back into the map it came from.  The ring stays
/// inserted in the map.
pub fn uncrop(map: &mut Arrangement, crop: Crop) {
    let Crop { mut inside, bounds_map, bounds_inside } = crop;
    exchange_subgraph(map, &mut inside, &bounds_map, &bounds_inside);
}

/// Crop `map` to an axis-aligned box.  With `keep_outside` the map keeps
/// the outside and the inside is returned; otherwise the map is replaced by
/// the inside and the outside is returned.
pub fn crop_to_box(
    map:          &mut Arrangement,
    west:         f64,
    south:        f64,
    east:         f64,
    north:        f64,
    keep_outside: bool,
    ctx:          &MapContext,
) -> Result<Arrangement> {
    let ring = [
        Coord { x: west, y: south },
        Coord { x: east, y: south },
        Coord { x: east, y: north },
        Coord { x: west, y: north },
    ];
    let mut cut = crop(map, &ring, ctx)?;
    if !keep_outside {
        std::mem::swap(map, &mut cut.inside);
    }
    Ok(cut.inside)
}
