use ahash::AHashSet;
use geo::Rect;
use rstar::{RTree, RTreeObject, AABB};

use crate::dcel::{Dcel, HalfEdgeId, PointKey, UNBOUNDED};
use crate::error::DcelError;
use crate::geom;

/// An edge's bounding box in an R-tree, tagged with its dominant half-edge.
#[derive(Debug, Clone)]
struct EdgeBox {
    idx:  HalfEdgeId,
    bbox: Rect<f64>,
}

impl RTreeObject for EdgeBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

impl<E, F> Dcel<E, F> {
    /// Check every structural invariant, reporting the first violation.
    ///
    /// Planarity is checked separately by [`Dcel::crossing_edges`], which is
    /// more expensive.
    pub fn validate(&self) -> Result<(), DcelError> {
        let live = |h: HalfEdgeId| self.half_edges.get(h.0).and_then(Option::as_ref);

        for h in self.half_edge_ids() {
            let rec = self.he(h);
            let twin = live(rec.twin).ok_or(DcelError::BrokenTwin(h))?;
            if rec.twin == h || twin.twin != h { return Err(DcelError::BrokenTwin(h)); }
            if rec.dominant == twin.dominant { return Err(DcelError::Dominance(h)); }

            let next = live(rec.next).ok_or(DcelError::BrokenNext(h))?;
            if next.prev != h || next.origin != twin.origin { return Err(DcelError::BrokenNext(h)); }
            if next.face != rec.face { return Err(DcelError::FaceMismatch(h)); }
            if !self.contains_vertex(rec.origin) || !self.contains_face(rec.face) {
                return Err(DcelError::FaceMismatch(h));
            }
        }

        for v in self.vertex_ids() {
            let rep = self.vx(v).half_edge;
            if live(rep).is_none_or(|r| r.origin != v) { return Err(DcelError::VertexRep(v)); }
            if self.locator.get(&PointKey::from(self.point(v))) != Some(&v) {
                return Err(DcelError::Locator(v));
            }
        }
        if let Some(&v) = self.locator.values().find(|&&v| !self.contains_vertex(v)) {
            return Err(DcelError::Locator(v));
        }
        if !self.index_in_sync() { return Err(DcelError::EdgeIndex); }

        let mut seen: AHashSet<HalfEdgeId> = AHashSet::new();
        for f in self.face_ids() {
            let rec = self.fc(f);
            if (f == UNBOUNDED) != rec.outer.is_none() { return Err(DcelError::FaceCycles(f)); }
            for &rep in rec.outer.iter().chain(rec.holes.iter()) {
                if live(rep).is_none() { return Err(DcelError::FaceCycles(f)); }
                for h in self.ccb(rep) {
                    if self.face(h) != f || !seen.insert(h) { return Err(DcelError::FaceCycles(f)); }
                }
            }
            if let Some(outer) = rec.outer {
                if self.cycle_area(outer) <= 0.0 { return Err(DcelError::FaceCycles(f)); }
            }
        }
        if let Some(h) = self.half_edge_ids().find(|h| !seen.contains(h)) {
            return Err(DcelError::Orphan(h));
        }
        Ok(())
    }

    /// Every pair of edges that cross without sharing a vertex, as pairs of
    /// dominant half-edges.
    pub fn crossing_edges(&self) -> Vec<(HalfEdgeId, HalfEdgeId)> {
        let rtree = RTree::bulk_load(
            self.dominant_half_edges()
                .map(|h| EdgeBox { idx: h, bbox: geom::segment_bbox(self.source_point(h), self.target_point(h)) })
                .collect()
        );

        let mut out = Vec::new();
        for a in rtree.iter() {
            for b in rtree.locate_in_envelope_intersecting(&a.envelope()) {
                if b.idx <= a.idx { continue; }
                if geom::segments_cross(self.segment(a.idx), self.segment(b.idx)) {
                    out.push((a.idx, b.idx));
                }
            }
        }
        out.sort();
        out
    }

    /// [`Dcel::validate`] plus planarity.
    pub fn validate_planar(&self) -> Result<(), DcelError> {
        self.validate()?;
        match self.crossing_edges().first() {
            Some(&(a, b)) => Err(DcelError::Crossing(a, b)),
            None => Ok(()),
        }
    }
}
