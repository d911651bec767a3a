//! Inward offsetting of face boundaries.
//!
//! [`inset_ring`] offsets a closed ring to its left by a per-edge distance,
//! cutting it apart where it pinches.
//! [`inset_face`] runs it over every boundary cycle of a face, inserts the
//! resulting rings and hands the band between old and new boundary the
//! donor's classification.

use std::collections::BTreeSet;

use ahash::AHashMap;
use geo::{Coord, Line, Rect};
use geograph::geom::{cross, dot, expand_rect, near_colinear, segment_bbox, segments_cross, signed_area};
use geograph::{FaceId, HalfEdgeId, UNBOUNDED};
use log::{debug, warn};
use rstar::{RTree, RTreeObject, AABB};

use crate::config::{MapContext, Tolerances};
use crate::error::{InsetError, MapError};
use crate::geom::{intersect_lines, left_normal, midpoint, normalize, SegmentBox};
use crate::map::{Arrangement, FaceData};

/// Offset distance for [`inset_face`].
#[derive(Clone, Copy, Debug)]
pub enum InsetWidth<'a> {
    /// The same distance along every boundary edge.
    Uniform(f64),
    /// A distance per boundary half-edge of the face.
    PerEdge(&'a AHashMap<HalfEdgeId, f64>),
}

impl InsetWidth<'_> {
    fn of(&self, h: HalfEdgeId) -> Result<f64, MapError> {
        match self {
            Self::Uniform(d) => Ok(*d),
            Self::PerEdge(widths) => widths.get(&h).copied().ok_or(MapError::MissingWidth(h)),
        }
    }
}

/// What [`inset_face`] did to the face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsetOutcome {
    /// New rings were inserted.  `band` holds the faces between the old and
    /// new boundary (now carrying the donor data), `core` the faces inside.
    Inset { band: BTreeSet<FaceId>, core: BTreeSet<FaceId> },
    /// The inset degenerated; the whole face took the donor data.
    Collapsed,
}

/// Inset every boundary cycle of `face` and mark the band with `donor`.
///
/// With a geographic context the distances are meters and the rings are
/// offset in the UTM zone of the face's first vertex.
pub fn inset_face(
    map:   &mut Arrangement,
    face:  FaceId,
    width: &InsetWidth<'_>,
    donor: &FaceData,
    ctx:   &mut MapContext,
) -> anyhow::Result<InsetOutcome> {
    let outer = map.outer_ccb(face).ok_or(MapError::UnboundedFace(face))?;

    let mut cycles: Vec<Vec<HalfEdgeId>> = vec![map.ccb(outer).collect()];
    cycles.extend(map.holes(face).iter().map(|&h| map.ccb(h).collect::<Vec<_>>()));

    let mut rings = Vec::with_capacity(cycles.len());
    for cycle in &cycles {
        let points: Vec<Coord<f64>> = cycle.iter().map(|&h| map.source_point(h)).collect();
        let widths = cycle.iter().map(|&h| width.of(h)).collect::<Result<Vec<_>, _>>()?;
        rings.push((points, widths));
    }

    let inset = match offset_rings(&rings, ctx)? {
        Ok(inset) => inset,
        Err(e) => return Ok(collapse(map, face, donor, &e)),
    };

    let boundary: Vec<Line<f64>> = cycles.iter().flatten().map(|&h| map.segment(h)).collect();
    if rings_cross(&inset, &boundary) {
        return Ok(collapse(map, face, donor, &InsetError::SelfIntersecting));
    }

    let mut new_edges = Vec::new();
    for ring in &inset {
        new_edges.extend(map.insert_ring(ring)?);
    }

    let band: BTreeSet<FaceId> = cycles.iter().flatten().map(|&h| map.face(h)).collect();
    for &f in &band {
        *map.face_data_mut(f) = donor.clone();
    }
    let core: BTreeSet<FaceId> = new_edges.iter()
        .map(|&h| map.face(h))
        .filter(|f| !band.contains(f) && *f != UNBOUNDED)
        .collect();

    debug!("inset {face}: {} rings, {} band faces, {} core faces", inset.len(), band.len(), core.len());
    Ok(InsetOutcome::Inset { band, core })
}

fn collapse(map: &mut Arrangement, face: FaceId, donor: &FaceData, err: &InsetError) -> InsetOutcome {
    warn!("inset of {face} collapsed ({err}); reclassifying the whole face");
    *map.face_data_mut(face) = donor.clone();
    InsetOutcome::Collapsed
}

/// Offset each ring, projecting to UTM and back for geographic maps.  The
/// outer error is a projection failure, the inner one a degenerate inset.
fn offset_rings(
    rings: &[(Vec<Coord<f64>>, Vec<f64>)],
    ctx:   &mut MapContext,
) -> anyhow::Result<Result<Vec<Vec<Coord<f64>>>, InsetError>> {
    let tol = ctx.tolerances.clone();
    if !ctx.geographic {
        let mut out = Vec::with_capacity(rings.len());
        for (points, widths) in rings {
            match inset_ring(points, widths, &tol) {
                Ok(pieces) => out.extend(pieces),
                Err(e) => return Ok(Err(e)),
            }
        }
        return Ok(Ok(out));
    }

    // One zone for the whole face so the rings stay consistent.
    let all: Vec<Coord<f64>> = rings.iter().flat_map(|(p, _)| p.iter().copied()).collect();
    let (zone, projected) = ctx.to_utm(&all)?;

    let mut out = Vec::with_capacity(rings.len());
    let mut start = 0;
    for (points, widths) in rings {
        let local = &projected[start..start + points.len()];
        start += points.len();
        let pieces = match inset_ring(local, widths, &tol) {
            Ok(pieces) => pieces,
            Err(e) => return Ok(Err(e)),
        };
        for ring in &pieces {
            out.push(ctx.from_utm(zone, ring)?);
        }
    }
    Ok(Ok(out))
}

/// True if any new ring crosses another new ring or the old boundary.
fn rings_cross(rings: &[Vec<Coord<f64>>], boundary: &[Line<f64>]) -> bool {
    let new: Vec<Line<f64>> = rings.iter().flat_map(|r| ring_segments(r)).collect();
    let tree = segment_tree(&new);

    let against_boundary = boundary.iter().any(|b| {
        let env = envelope(&segment_bbox(b.start, b.end));
        tree.locate_in_envelope_intersecting(&env).any(|c| segments_cross(*b, new[c.idx()]))
    });
    if against_boundary { return true; }

    // Rings against each other; crossings within one ring were rejected already.
    let mut owner = Vec::with_capacity(new.len());
    for (r, ring) in rings.iter().enumerate() {
        owner.extend(std::iter::repeat_n(r, ring.len()));
    }
    tree.iter().any(|a| {
        tree.locate_in_envelope_intersecting(&a.envelope())
            .any(|b| owner[a.idx()] < owner[b.idx()] && segments_cross(new[a.idx()], new[b.idx()]))
    })
}

/// Offset a closed ring to its left.  `widths[i]` is the distance for the
/// edge from `points[i]` to the next point.
///
/// The ring is cleaned first: zero-length edges go, colinear runs of equal
/// width merge, and edges swallowed by their neighbours' offsets are cut
/// out.  Where two facing sides are closer than their combined widths the
/// ring is cut across that neck and each part is inset on its own, so one
/// input ring may come back as several.  Only when no part survives is the
/// pinch reported as [`InsetError::Pinched`].
///
/// Every offset edge runs the same way as its source edge; an edge turned
/// around means the offset went past the ring's inradius and the inset
/// collapses.  The result keeps the winding of the input (zero-area trees
/// come back clockwise).
pub fn inset_ring(
    points: &[Coord<f64>],
    widths: &[f64],
    tol:    &Tolerances,
) -> Result<Vec<Vec<Coord<f64>>>, InsetError> {
    if widths.len() != points.len() {
        return Err(InsetError::WidthCount { expected: points.len(), got: widths.len() });
    }
    let mut pts = points.to_vec();
    let mut ws = widths.to_vec();

    for _ in 0..tol.max_cleanup_passes {
        if pts.len() < 3 || !cleanup_pass(&mut pts, &mut ws, tol) { break; }
    }
    // Antenna trees are two points; anything else this short is degenerate.
    if pts.len() < 2 || (pts.len() < 3 && pts[0] == pts[1]) {
        return Err(InsetError::TooFewPoints(pts.len()));
    }
    if let Some((i, j)) = find_pinch(&pts, &ws, tol) {
        return inset_pinched(&pts, &ws, i, j, tol);
    }

    let n = pts.len();
    let mut out = Vec::with_capacity(n + 2);
    // Index in `out` of the first point emitted for each vertex.
    let mut first = Vec::with_capacity(n);
    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let cur = pts[i];
        let next = pts[(i + 1) % n];
        let u_in = normalize(cur - prev).ok_or(InsetError::Collapsed)?;
        let u_out = normalize(next - cur).ok_or(InsetError::Collapsed)?;
        first.push(out.len());
        offset_vertex(cur, u_in, u_out, ws[(i + n - 1) % n], ws[i], tol, &mut out);
    }

    if out.len() < 3 { return Err(InsetError::Collapsed); }
    let turned = (0..n).any(|i| {
        let j = (i + 1) % n;
        let last = (if j == 0 { out.len() } else { first[j] }) - 1;
        dot(out[first[j]] - out[last], pts[j] - pts[i]) <= 0.0
    });
    if turned { return Err(InsetError::Collapsed); }

    let before = signed_area(&pts);
    let after = signed_area(&out);
    let kept = if before > 0.0 { after > 0.0 } else { after < 0.0 };
    if !kept { return Err(InsetError::Collapsed); }
    if self_crossing(&out) { return Err(InsetError::SelfIntersecting); }
    Ok(vec![out])
}

/// Cut the ring across the neck between sides `i` and `j` and inset both
/// parts.  A part that turned inside out or fails its own inset is dropped.
fn inset_pinched(
    pts: &[Coord<f64>],
    ws:  &[f64],
    i:   usize,
    j:   usize,
    tol: &Tolerances,
) -> Result<Vec<Vec<Coord<f64>>>, InsetError> {
    let winding = signed_area(pts);
    let mut pieces = Vec::new();
    for (part, part_ws) in split_at_neck(pts, ws, i, j) {
        if part.len() < 3 || signed_area(&part) * winding <= 0.0 { continue; }
        match inset_ring(&part, &part_ws, tol) {
            Ok(rings) => pieces.extend(rings),
            Err(e) => debug!("dropping part of pinched ring ({e})"),
        }
    }
    if pieces.is_empty() { return Err(InsetError::Pinched(i, j)); }
    debug!("ring pinched between sides {i} and {j}; {} parts survive", pieces.len());
    Ok(pieces)
}

/// Split the ring between sides `i < j`: one part runs from the end of `i`
/// to the start of `j`, the other from the end of `j` round to the start of
/// `i`.  Each closes across the neck with the wider of the two widths.
fn split_at_neck(
    pts: &[Coord<f64>],
    ws:  &[f64],
    i:   usize,
    j:   usize,
) -> [(Vec<Coord<f64>>, Vec<f64>); 2] {
    let n = pts.len();
    let neck = ws[i].max(ws[j]);
    let part = |from: usize, to: usize| {
        let (mut p, mut w) = (Vec::new(), Vec::new());
        let mut k = from;
        loop {
            p.push(pts[k]);
            if k == to {
                w.push(neck);
                break;
            }
            w.push(ws[k]);
            k = (k + 1) % n;
        }
        (p, w)
    };
    [part((i + 1) % n, j), part((j + 1) % n, i)]
}

/// Emit the offset point(s) for the vertex `p` between an incoming edge
/// with direction `u_in` and an outgoing edge with direction `u_out`.
fn offset_vertex(
    p:     Coord<f64>,
    u_in:  Coord<f64>,
    u_out: Coord<f64>,
    d_in:  f64,
    d_out: f64,
    tol:   &Tolerances,
    out:   &mut Vec<Coord<f64>>,
) {
    let (n_in, n_out) = (left_normal(u_in), left_normal(u_out));
    let (cos, sin) = (dot(u_in, u_out), cross(u_in, u_out));

    if sin == 0.0 && cos < 0.0 {
        // Antenna tip: cap it with two points past the tip.
        out.push(p + u_in * d_in + n_in * d_in);
        out.push(p + u_in * d_out + n_out * d_out);
    } else if cos > tol.inset_colinear_dot {
        out.push(midpoint(p + n_in * d_in, p + n_out * d_out));
    } else if cos < tol.inset_pinch_dot && sin < 0.0 {
        // Sharp reflex turn: the offset lines meet far away, so mitre.
        out.push(p + n_in * d_in + u_in * d_in);
        out.push(p + n_out * d_out - u_out * d_out);
    } else {
        let a = p + n_in * d_in;
        let b = p + n_out * d_out;
        out.push(intersect_lines(a, u_in, b, u_out).unwrap_or_else(|| midpoint(a, b)));
    }
}

/// Apply one cleanup step.  Returns false when the ring is already clean.
fn cleanup_pass(pts: &mut Vec<Coord<f64>>, ws: &mut Vec<f64>, tol: &Tolerances) -> bool {
    let n = pts.len();

    if let Some(i) = (0..n).find(|&i| pts[i] == pts[(i + 1) % n]) {
        pts.remove(i);
        ws.remove(i);
        return true;
    }

    let colinear = (0..n).find(|&k| {
        let (prev, next) = ((k + n - 1) % n, (k + 1) % n);
        ws[prev] == ws[k] && near_colinear(Line::new(pts[prev], pts[next]), pts[k], tol.colinear_sq_dist)
    });
    if let Some(k) = colinear {
        pts.remove(k);
        ws.remove(k);
        return true;
    }

    if n > 3 {
        if let Some(i) = (0..n).find(|&i| consumed_edge(pts, ws, i)) {
            remove_consumed(pts, ws, i);
            return true;
        }
    }
    false
}

/// Unit direction of edge `i`.
fn direction(pts: &[Coord<f64>], i: usize) -> Option<Coord<f64>> {
    let n = pts.len();
    normalize(pts[(i + 1) % n] - pts[i % n])
}

/// Edge `i` turns convex at both ends and its offset shrinks to nothing,
/// while its neighbours' lines meet ahead of it.
fn consumed_edge(pts: &[Coord<f64>], ws: &[f64], i: usize) -> bool {
    let n = pts.len();
    let (Some(u_prev), Some(u), Some(u_next)) =
        (direction(pts, i + n - 1), direction(pts, i), direction(pts, i + 1))
    else {
        return false;
    };

    let (s1, s2) = (cross(u_prev, u), cross(u, u_next));
    if s1 <= 0.0 || s2 <= 0.0 || cross(u_prev, u_next) <= 0.0 { return false; }

    // tan(theta/2) = sin / (1 + cos) for unit vectors.
    let shrink = s1 / (1.0 + dot(u_prev, u)) + s2 / (1.0 + dot(u, u_next));
    let len = dot(pts[(i + 1) % n] - pts[i], u);
    len - ws[i] * shrink < 0.0
}

/// Replace edge `i` by the meeting point of its neighbours' lines.
fn remove_consumed(pts: &mut Vec<Coord<f64>>, ws: &mut Vec<f64>, mut i: usize) {
    let n = pts.len();
    if i == n - 1 {
        pts.rotate_left(1);
        ws.rotate_left(1);
        i -= 1;
    }
    let (Some(u_prev), Some(u_next)) = (direction(pts, i + n - 1), direction(pts, i + 1)) else { return };
    let Some(x) = intersect_lines(pts[i], u_prev, pts[i + 1], u_next) else { return };
    pts[i] = x;
    pts.remove(i + 1);
    ws.remove(i);
}

/// Two facing, non-adjacent sides closer than their combined widths.
fn find_pinch(pts: &[Coord<f64>], ws: &[f64], tol: &Tolerances) -> Option<(usize, usize)> {
    let n = pts.len();
    let segs = ring_segments(pts);
    let tree = segment_tree(&segs);
    let reach = ws.iter().copied().fold(0.0, f64::max);

    for (i, a) in segs.iter().enumerate() {
        let search = expand_rect(&segment_bbox(a.start, a.end), ws[i] + reach);
        for cand in tree.locate_in_envelope_intersecting(&envelope(&search)) {
            let j = cand.idx();
            if j <= i || j == (i + 1) % n || i == (j + 1) % n { continue; }
            let b = &segs[j];
            if [a.start, a.end].iter().any(|p| *p == b.start || *p == b.end) { continue; }
            if !facing(a, b, tol) { continue; }

            let gap = ws[i] + ws[j];
            if overhangs(a, b, gap) || overhangs(b, a, gap) {
                return Some((i, j));
            }
        }
    }
    None
}

/// The sides run against each other and each lies on the other's left.
fn facing(a: &Line<f64>, b: &Line<f64>, tol: &Tolerances) -> bool {
    let (Some(ua), Some(ub)) = (normalize(a.delta()), normalize(b.delta())) else { return false };
    let mid = |l: &Line<f64>| (l.start + l.end) * 0.5;
    dot(ua, ub) < tol.inset_pinch_dot
        && cross(ua, mid(b) - a.start) > 0.0
        && cross(ub, mid(a) - b.start) > 0.0
}

/// An endpoint of `b` sits over the span of `a`, on its left, closer than `gap`.
fn overhangs(a: &Line<f64>, b: &Line<f64>, gap: f64) -> bool {
    let Some(u) = normalize(a.delta()) else { return false };
    let len = dot(a.delta(), u);
    [b.start, b.end].into_iter().any(|p| {
        let (along, across) = (dot(p - a.start, u), cross(u, p - a.start));
        (0.0..=len).contains(&along) && across > 0.0 && across < gap
    })
}

fn self_crossing(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    let segs = ring_segments(ring);
    let tree = segment_tree(&segs);
    tree.iter().any(|a| {
        let i = a.idx();
        tree.locate_in_envelope_intersecting(&a.envelope()).any(|b| {
            let j = b.idx();
            j > i && j != (i + 1) % n && i != (j + 1) % n && segments_cross(segs[i], segs[j])
        })
    })
}

fn ring_segments(ring: &[Coord<f64>]) -> Vec<Line<f64>> {
    let n = ring.len();
    (0..n).map(|i| Line::new(ring[i], ring[(i + 1) % n])).collect()
}

fn segment_tree(segs: &[Line<f64>]) -> RTree<SegmentBox<usize>> {
    RTree::bulk_load(
        segs.iter().enumerate()
            .map(|(i, s)| SegmentBox::new(i, segment_bbox(s.start, s.end)))
            .collect()
    )
}

#[inline]
fn envelope(r: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(r.min().into(), r.max().into())
}
