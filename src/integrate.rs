//! Topology integration of two independently built arrangements.
//!
//! Before content from one arrangement is inserted into another, every
//! point where the two must meet is made a vertex in both, at bit-identical
//! coordinates.  Near-colinear contacts are resolved first (an endpoint of
//! one edge lying on the other), and only then true crossings, since a
//! crossing test between almost colinear segments produces points that are
//! close to, but not at, an existing endpoint.

use ahash::AHashMap;
use geo::{Coord, Line};
use log::debug;

use geograph::geom::{expand_rect, near_colinear, segment_bbox, segment_intersection, squared_distance};
use geograph::{Dcel, DcelError, HalfEdgeId};

use crate::config::Tolerances;
use crate::geom::{SegmentBox, SortedBoxes};

/// Counts from one integration pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrateStats {
    /// Edge pairs whose padded boxes overlapped.
    pub candidates: usize,
    /// Splits applied to the first arrangement.
    pub splits_a:   usize,
    /// Splits applied to the second arrangement.
    pub splits_b:   usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slope { Horizontal, Vertical, Oblique }

fn slope(seg: Line<f64>) -> Slope {
    if seg.start.y == seg.end.y { Slope::Horizontal }
    else if seg.start.x == seg.end.x { Slope::Vertical }
    else { Slope::Oblique }
}

/// Split points scheduled per half-edge.
type Schedule = AHashMap<HalfEdgeId, Vec<Coord<f64>>>;

/// Pre-split `a` and `b` against each other so that inserting the edges of
/// one into the other cannot create a crossing without a shared vertex.
pub fn topology_integrate<E1, F1, E2, F2>(
    a:   &mut Dcel<E1, F1>,
    b:   &mut Dcel<E2, F2>,
    tol: &Tolerances,
) -> IntegrateStats
where
    E1: Clone + Default,
    F1: Clone + Default,
    E2: Clone + Default,
    F2: Clone + Default,
{
    let index = SortedBoxes::new(
        b.dominant_half_edges()
            .map(|h| SegmentBox::new(h, segment_bbox(b.source_point(h), b.target_point(h)))),
        tol.short_edge_cutoff,
    );

    let mut stats = IntegrateStats::default();
    let mut split_a: Schedule = AHashMap::new();
    let mut split_b: Schedule = AHashMap::new();

    for ea in a.dominant_half_edges() {
        let sa = a.segment(ea);
        let query = expand_rect(&segment_bbox(sa.start, sa.end), tol.bbox_slop);
        for eb in index.query(&query) {
            stats.candidates += 1;
            let sb = b.segment(eb);

            if slope(sa) == slope(sb) {
                let mut touched = false;
                for p in [sb.start, sb.end] {
                    if near_colinear(sa, p, tol.colinear_sq_dist) {
                        split_a.entry(ea).or_default().push(p);
                        touched = true;
                    }
                }
                for p in [sa.start, sa.end] {
                    if near_colinear(sb, p, tol.colinear_sq_dist) {
                        split_b.entry(eb).or_default().push(p);
                        touched = true;
                    }
                }
                if touched { continue; }
            }

            let Some(hit) = segment_intersection(sa, sb) else { continue };
            // Snap onto an endpoint the crossing is indistinguishable from.
            let hit = [sa.start, sa.end, sb.start, sb.end].into_iter()
                .find(|&p| squared_distance(p, hit) < tol.colinear_sq_dist)
                .unwrap_or(hit);
            if hit != sa.start && hit != sa.end { split_a.entry(ea).or_default().push(hit); }
            if hit != sb.start && hit != sb.end { split_b.entry(eb).or_default().push(hit); }
        }
    }

    stats.splits_a = apply_splits(a, split_a);
    stats.splits_b = apply_splits(b, split_b);
    debug!(
        "topology integration: {} edges indexed, {} candidate pairs, {} + {} splits",
        index.len(), stats.candidates, stats.splits_a, stats.splits_b,
    );
    stats
}

/// Apply scheduled splits edge by edge, nearest to the source first, so each
/// split lands on the piece that still runs past it.
fn apply_splits<E: Clone + Default, F: Clone + Default>(map: &mut Dcel<E, F>, schedule: Schedule) -> usize {
    let mut edges: Vec<(HalfEdgeId, Vec<Coord<f64>>)> = schedule.into_iter().collect();
    edges.sort_by_key(|(h, _)| *h);

    let mut count = 0;
    for (e, mut points) in edges {
        let origin = map.source_point(e);
        points.sort_by(|p, q| squared_distance(origin, *p).total_cmp(&squared_distance(origin, *q)));
        points.dedup();

        let mut cur = e;
        for p in points {
            if p == map.source_point(cur) || p == map.target_point(cur) { continue; }
            if map.locate_vertex(p).is_some() { continue; }
            map.split_edge(cur, p);
            cur = map.next(cur);
            count += 1;
        }
    }
    count
}

/// Integrate a closed ring with `map` and return the ring's points with
/// every split point added, in ring order.  Consecutive points can then be
/// inserted into `map` safely.
pub fn integrate_ring<E, F>(
    map:  &mut Dcel<E, F>,
    ring: &[Coord<f64>],
    tol:  &Tolerances,
) -> Result<Vec<Coord<f64>>, DcelError>
where
    E: Clone + Default,
    F: Clone + Default,
{
    let mut scratch: Dcel<(), ()> = Dcel::new();
    let edges = scratch.insert_ring(ring)?;
    let ends: Vec<Coord<f64>> = edges.iter().map(|&h| scratch.target_point(h)).collect();

    topology_integrate(map, &mut scratch, tol);

    let mut points = Vec::with_capacity(edges.len());
    for (&h, &end) in edges.iter().zip(&ends) {
        let mut cur = h;
        loop {
            points.push(scratch.source_point(cur));
            if scratch.target_point(cur) == end { break; }
            cur = scratch.next(cur);
        }
    }
    Ok(points)
}
