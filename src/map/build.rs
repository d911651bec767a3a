use std::collections::BTreeSet;

use geo::{Coord, Rect};
use geograph::geom::signed_area;
use geograph::{FaceId, HalfEdgeId, UNBOUNDED};
use log::{debug, warn};

use crate::config::Tolerances;
use crate::error::MapError;
use crate::integrate::integrate_ring;
use crate::map::{Arrangement, EdgeData, FaceData};

/// Insert a closed ring into `map`, pre-splitting it against the existing
/// content first.  Returns the ring's half-edges in order, each running in
/// the ring's direction.
pub fn insert_ring_integrated(
    map:  &mut Arrangement,
    ring: &[Coord<f64>],
    tol:  &Tolerances,
) -> Result<Vec<HalfEdgeId>, MapError> {
    let points = integrate_ring(map, ring, tol)?;
    Ok(map.insert_ring(&points)?)
}

/// Burn a polygon into `map`.
///
/// The first ring is the outer boundary, the rest are holes; either winding
/// is accepted.  Every face enclosed by the polygon gets `face`, and every
/// boundary edge gets `edge` on its dominant side.  Returns the enclosed
/// faces.
pub fn add_polygon(
    map:   &mut Arrangement,
    rings: &[Vec<Coord<f64>>],
    face:  &FaceData,
    edge:  &EdgeData,
    tol:   &Tolerances,
) -> Result<BTreeSet<FaceId>, MapError> {
    let mut boundary: Vec<HalfEdgeId> = Vec::new();
    for (i, ring) in rings.iter().enumerate() {
        // Orient so the polygon's inside is on the left: outer ring
        // counter-clockwise, holes clockwise.
        let mut ring = ring.clone();
        let ccw = signed_area(&ring) > 0.0;
        if ccw != (i == 0) { ring.reverse(); }
        boundary.extend(insert_ring_integrated(map, &ring, tol)?);
    }

    for &h in &boundary {
        *map.edge_data_mut(h) = edge.clone();
    }

    let mut faces = map.faces_of_edges(boundary.iter().copied());
    if faces.remove(&UNBOUNDED) {
        warn!("polygon boundary leaks into the unbounded face; marking enclosed faces only");
    }
    for &f in &faces {
        *map.face_data_mut(f) = face.clone();
    }
    debug!("polygon with {} rings covers {} faces", rings.len(), faces.len());
    Ok(faces)
}

/// Bounding box of the outer boundaries of `faces`.
pub fn calc_bounding_box<I>(map: &Arrangement, faces: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = FaceId>,
{
    faces.into_iter()
        .filter_map(|f| map.outer_ccb(f))
        .flat_map(|h| map.cycle_points(h))
        .map(|p| Rect::new(p, p))
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}
