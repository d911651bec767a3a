use geo::{Coord, Rect};
use log::trace;

use crate::dcel::{Dcel, FaceId, HalfEdgeId, Slot, VertexId, UNBOUNDED};
use crate::error::DcelError;
use crate::geom;

/// One structural change made while inserting.  Callers fold these into
/// their own bookkeeping instead of being called back mid-mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// A new edge; the id runs along the inserted segment.
    EdgeCreated(HalfEdgeId),
    /// `edge` now stops at a new vertex and `piece` continues to its old target.
    EdgeSplit { edge: HalfEdgeId, piece: HalfEdgeId },
    /// Closing a cycle carved `face` out of `parent`.
    FaceCreated { parent: FaceId, face: FaceId },
}

/// Result of [`Dcel::insert_edge`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Insertion {
    /// Half-edges covering the segment, in order from its first point to its
    /// last.  Each is dominant if it was created by this insertion.
    pub edges:   Vec<HalfEdgeId>,
    pub changes: Vec<Change>,
}

impl Insertion {
    /// The half-edge leaving the first point.
    pub fn first(&self) -> Option<HalfEdgeId> { self.edges.first().copied() }

    /// Faces created by this insertion.
    pub fn new_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.changes.iter().filter_map(|c| match c {
            Change::FaceCreated { face, .. } => Some(*face),
            _ => None,
        })
    }
}

impl<E: Clone + Default, F: Clone + Default> Dcel<E, F> {
    /// Insert the segment `p -> q`.
    ///
    /// Existing vertices are reused; an endpoint landing inside an existing
    /// edge splits it; existing vertices on the segment split the new edge
    /// into pieces; pieces that already exist are returned as they are.
    ///
    /// The segment must not cross any edge except at a vertex.  That is a
    /// contract on the caller (see topology integration) and is only checked
    /// in debug builds.  A segment that finds no gap to enter at one of its
    /// vertices is reported as [`DcelError::NoWedge`]; pieces inserted before
    /// that stay in place.
    pub fn insert_edge(&mut self, p: Coord<f64>, q: Coord<f64>) -> Result<Insertion, DcelError> {
        if p == q {
            return Err(DcelError::DegenerateSegment { x: p.x, y: p.y });
        }

        let mut out = Insertion::default();
        self.split_under(p, &mut out);
        self.split_under(q, &mut out);

        let mut from = p;
        for to in self.vertices_between(p, q).into_iter().chain(std::iter::once(q)) {
            let h = self.insert_piece(from, to, &mut out)?;
            out.edges.push(h);
            from = to;
        }
        Ok(out)
    }

    /// Insert a closed ring, returning its half-edges in ring order.
    ///
    /// Repeated consecutive points (and a repeated closing point) are ignored.
    pub fn insert_ring(&mut self, points: &[Coord<f64>]) -> Result<Vec<HalfEdgeId>, DcelError> {
        let mut ring: Vec<Coord<f64>> = Vec::with_capacity(points.len());
        for &p in points {
            if ring.last() != Some(&p) { ring.push(p); }
        }
        while ring.len() > 1 && ring.first() == ring.last() { ring.pop(); }
        if ring.len() < 3 {
            return Err(DcelError::DegenerateRing(ring.len()));
        }

        let mut edges = Vec::with_capacity(ring.len());
        for (i, &p) in ring.iter().enumerate() {
            let q = ring[(i + 1) % ring.len()];
            edges.extend(self.insert_edge(p, q)?.edges);
        }
        Ok(edges)
    }

    /// The innermost face containing `p`, which must not lie on an edge.
    pub fn locate_face(&self, p: Coord<f64>) -> FaceId {
        let mut best = (UNBOUNDED, f64::INFINITY);
        for f in self.bounded_faces() {
            let Some(outer) = self.outer_ccb(f) else { continue };
            let ring = self.cycle_points(outer);
            if !geom::point_in_ring(p, &ring) { continue; }
            let area = geom::signed_area(&ring).abs();
            if area < best.1 { best = (f, area); }
        }
        best.0
    }

    /// The half-edge from `a` to `b`, if the two vertices are adjacent.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<HalfEdgeId> {
        self.vertex_star(a).find(|&h| self.target(h) == b)
    }

    /// An existing edge that `p -> q` would cross without a shared vertex.
    pub fn first_crossing(&self, p: Coord<f64>, q: Coord<f64>) -> Option<HalfEdgeId> {
        let seg = geo::Line::new(p, q);
        self.edges_near(geom::segment_bbox(p, q)).find(|&h| geom::segments_cross(seg, self.segment(h)))
    }

    // -----------------------------------------------------------------------
    // Pieces
    // -----------------------------------------------------------------------

    /// Existing vertices strictly inside `p -> q`, ordered from `p`.
    fn vertices_between(&self, p: Coord<f64>, q: Coord<f64>) -> Vec<Coord<f64>> {
        let mut stops: Vec<(f64, Coord<f64>)> = self.edges_near(geom::segment_bbox(p, q))
            .flat_map(|h| [self.source_point(h), self.target_point(h)])
            .filter(|&s| geom::on_open_segment(p, q, s))
            .map(|s| (geom::squared_distance(p, s), s))
            .collect();
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        stops.dedup_by(|a, b| a.1 == b.1);
        stops.into_iter().map(|(_, s)| s).collect()
    }

    /// If `p` is not a vertex but lies inside an edge, split that edge there.
    fn split_under(&mut self, p: Coord<f64>, out: &mut Insertion) {
        if self.locate_vertex(p).is_some() { return; }
        let host = self.edges_near(Rect::new(p, p))
            .find(|&h| geom::on_open_segment(self.source_point(h), self.target_point(h), p));
        if let Some(edge) = host {
            self.split_edge(edge, p);
            let piece = self.next(edge);
            out.changes.push(Change::EdgeSplit { edge, piece });
        }
    }

    /// Insert a segment whose interior touches no vertex.
    fn insert_piece(&mut self, p: Coord<f64>, q: Coord<f64>, out: &mut Insertion) -> Result<HalfEdgeId, DcelError> {
        debug_assert!(
            self.locate_vertex(p).zip(self.locate_vertex(q)).is_some_and(|(a, b)| self.find_edge(a, b).is_some())
                || self.first_crossing(p, q).is_none(),
            "segment {p:?} -> {q:?} crosses {:?}; integrate topology first",
            self.first_crossing(p, q),
        );

        let (h, carved) = match (self.locate_vertex(p), self.locate_vertex(q)) {
            (Some(a), Some(b)) => {
                if let Some(h) = self.find_edge(a, b) { return Ok(h); }
                self.connect_vertices(a, b)?
            }
            (Some(a), None) => (self.extend_from(a, q)?, None),
            (None, Some(b)) => {
                let back = self.extend_from(b, p)?;
                let h = self.twin(back);
                self.swap_dominance(h);
                (h, None)
            }
            (None, None) => (self.insert_isolated(p, q), None),
        };
        self.index_edge(h);

        trace!("inserted {h}: {p:?} -> {q:?}");
        out.changes.push(Change::EdgeCreated(h));
        if let Some((parent, face)) = carved {
            out.changes.push(Change::FaceCreated { parent, face });
        }
        Ok(h)
    }

    /// A new component floating inside whichever face contains it.
    fn insert_isolated(&mut self, p: Coord<f64>, q: Coord<f64>) -> HalfEdgeId {
        let f = self.locate_face(p);
        let a = self.alloc_vertex(p);
        let b = self.alloc_vertex(q);
        let (h, t) = self.alloc_pair(a, b, f, f);
        self.set_next(h, t);
        self.set_next(t, h);
        self.vx_mut(a).half_edge = h;
        self.vx_mut(b).half_edge = t;
        self.fc_mut(f).holes.push(h);
        h
    }

    /// A new edge from vertex `a` out to a fresh vertex at `q`.
    fn extend_from(&mut self, a: VertexId, q: Coord<f64>) -> Result<HalfEdgeId, DcelError> {
        let inc = self.incoming_toward(a, q)?;
        let f = self.face(inc);
        let b = self.alloc_vertex(q);
        let (h, t) = self.alloc_pair(a, b, f, f);
        let out = self.next(inc);
        self.set_next(inc, h);
        self.set_next(h, t);
        self.set_next(t, out);
        self.vx_mut(b).half_edge = t;
        Ok(h)
    }

    /// A new edge between two existing vertices.  If both sit on the same
    /// cycle it is split in two and a face is carved out; otherwise two
    /// cycles of the face merge into one.
    fn connect_vertices(
        &mut self,
        a: VertexId,
        b: VertexId,
    ) -> Result<(HalfEdgeId, Option<(FaceId, FaceId)>), DcelError> {
        let in_a = self.incoming_toward(a, self.point(b))?;
        let in_b = self.incoming_toward(b, self.point(a))?;
        let f = self.face(in_a);
        assert_eq!(f, self.face(in_b), "edge {a} -> {b} would cross an existing edge");

        let same_cycle = self.ccb(in_a).any(|h| h == in_b);
        let slot_a = self.cycle_slot(f, in_a);
        let slot_b = if same_cycle { slot_a } else { self.cycle_slot(f, in_b) };

        let (h, t) = self.alloc_pair(a, b, f, f);
        let (out_a, out_b) = (self.next(in_a), self.next(in_b));
        self.set_next(in_a, h);
        self.set_next(h, out_b);
        self.set_next(in_b, t);
        self.set_next(t, out_a);

        if !same_cycle {
            // The edge bridges two components: drop one hole record.
            let drop = match (slot_a, slot_b) {
                (Slot::Outer, Slot::Hole(j)) => j,
                (Slot::Hole(i), Slot::Outer) => i,
                (Slot::Hole(_), Slot::Hole(j)) => j,
                (Slot::Outer, Slot::Outer) => unreachable!("a face has one outer cycle"),
            };
            self.fc_mut(f).holes.remove(drop);
            return Ok((h, None));
        }

        let data = self.face_data(f).clone();
        let g = match slot_a {
            Slot::Outer => {
                // Both halves enclose area; the half through `h` becomes the new face.
                self.fc_mut(f).outer = Some(t);
                let g = self.alloc_face(h, data);
                self.assign_cycle(h, g);
                self.move_enclosed_holes(f, g, h, None);
                g
            }
            Slot::Hole(i) => {
                // The counter-clockwise half encloses the new face.
                let (inner, rest) = if self.cycle_area(h) >= self.cycle_area(t) { (h, t) } else { (t, h) };
                self.fc_mut(f).holes[i] = rest;
                let g = self.alloc_face(inner, data);
                self.assign_cycle(inner, g);
                self.move_enclosed_holes(f, g, inner, Some(rest));
                g
            }
        };
        Ok((h, Some((f, g))))
    }

    /// Move every hole of `from` lying inside the cycle of `ring` over to `to`.
    pub(crate) fn move_enclosed_holes(
        &mut self,
        from: FaceId,
        to:   FaceId,
        ring: HalfEdgeId,
        skip: Option<HalfEdgeId>,
    ) {
        let polygon = self.cycle_points(ring);
        let holes = std::mem::take(&mut self.fc_mut(from).holes);
        for r in holes {
            let inside = Some(r) != skip && geom::point_in_ring(self.source_point(r), &polygon);
            if inside {
                self.assign_cycle(r, to);
                self.fc_mut(to).holes.push(r);
            } else {
                self.fc_mut(from).holes.push(r);
            }
        }
    }

    /// The incoming half-edge at `v` whose face contains the direction
    /// towards `toward`; a new edge in that direction is spliced in after it.
    pub(crate) fn incoming_toward(&self, v: VertexId, toward: Coord<f64>) -> Result<HalfEdgeId, DcelError> {
        let c = self.point(v);
        self.vertex_star(v)
            .map(|out| self.twin(out))
            .find(|&inc| geom::in_ccw_wedge(c, self.target_point(self.next(inc)), self.source_point(inc), toward))
            .ok_or(DcelError::NoWedge { vertex: v, x: toward.x, y: toward.y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    #[test]
    fn direction_along_an_edge_has_no_wedge() {
        let mut map: Dcel<(), ()> = Dcel::new();
        map.insert_edge(c(0.0, 0.0), c(2.0, 0.0)).unwrap();
        map.insert_edge(c(0.0, 0.0), c(0.0, 2.0)).unwrap();
        let v = map.locate_vertex(c(0.0, 0.0)).unwrap();

        assert!(map.incoming_toward(v, c(1.0, 1.0)).is_ok());
        assert!(map.incoming_toward(v, c(-1.0, -1.0)).is_ok());
        assert_eq!(
            map.incoming_toward(v, c(5.0, 0.0)),
            Err(DcelError::NoWedge { vertex: v, x: 5.0, y: 0.0 }),
        );
    }
}
