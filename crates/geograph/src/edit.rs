use geo::Coord;
use smallvec::SmallVec;

use crate::dcel::{Dcel, FaceId, HalfEdgeId, Slot, VertexId, UNBOUNDED};
use crate::geom;

/// Result of [`Dcel::remove_edge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal {
    /// The face now covering both former sides of the edge.
    pub face:             FaceId,
    /// The face that was absorbed, if the two sides were different faces.
    pub removed_face:     Option<FaceId>,
    /// Vertices destroyed because the edge was their last one.
    pub removed_vertices: SmallVec<[VertexId; 2]>,
}

impl<E: Clone + Default, F: Clone + Default> Dcel<E, F> {
    /// Split `e` at the interior point `p`.
    ///
    /// `e` keeps its id and now ends at `p`; the returned half-edge is `e`
    /// and `next(e)` is the new second piece.  The twin side is split the
    /// same way.  Both pieces carry a copy of the edge payload, on the same
    /// side as before.
    pub fn split_edge(&mut self, e: HalfEdgeId, p: Coord<f64>) -> HalfEdgeId {
        debug_assert!(self.locate_vertex(p).is_none(), "split point {p:?} is already a vertex");
        debug_assert!(p != self.source_point(e) && p != self.target_point(e));

        let t = self.twin(e);
        let (fe, ft) = (self.face(e), self.face(t));
        let (en, tn) = (self.next(e), self.next(t));
        let e_dominant = self.is_dominant(e);
        self.unindex_edge(e);

        let m = self.alloc_vertex(p);
        // e2: m -> old target (pairs with t), t1: m -> origin of e (pairs with e).
        let (e2, t1) = self.alloc_pair(m, m, fe, ft);
        self.he_mut(e2).twin = t;
        self.he_mut(t).twin = e2;
        self.he_mut(t1).twin = e;
        self.he_mut(e).twin = t1;

        self.set_next(e2, en);
        self.set_next(e, e2);
        self.set_next(t1, tn);
        self.set_next(t, t1);
        self.vx_mut(m).half_edge = e2;

        if e_dominant {
            let data = self.he(e).data.clone();
            self.he_mut(e2).data = data;
            self.he_mut(e2).dominant = true;
            self.he_mut(t1).dominant = false;
        } else {
            let data = self.he(t).data.clone();
            self.he_mut(t1).data = data;
            self.he_mut(t1).dominant = true;
            self.he_mut(e2).dominant = false;
        }
        self.index_edge(e);
        self.index_edge(e2);
        e
    }

    /// Delete the undirected edge of `e`.
    ///
    /// If its two sides belong to different faces they merge; the face of `e`
    /// survives unless the other side is the unbounded face.  Payloads are
    /// not touched.  Vertices left without edges are destroyed.
    pub fn remove_edge(&mut self, e: HalfEdgeId) -> Removal {
        let t = self.twin(e);
        let (fe, ft) = (self.face(e), self.face(t));
        let (u, w) = (self.origin(e), self.origin(t));
        let (pe, ne, pt, nt) = (self.prev(e), self.next(e), self.prev(t), self.next(t));
        self.unindex_edge(e);

        let mut removal = Removal { face: fe, removed_face: None, removed_vertices: SmallVec::new() };

        if fe != ft {
            let (keep, gone, keep_side) = if ft == UNBOUNDED { (ft, fe, t) } else { (fe, ft, e) };
            let slot_keep = self.cycle_slot(keep, keep_side);
            let slot_gone = self.cycle_slot(gone, self.twin(keep_side));

            self.set_next(pe, nt);
            self.set_next(pt, ne);
            self.fix_vertex_rep(u, e, nt);
            self.fix_vertex_rep(w, t, ne);
            self.free_pair(e);

            let merged = ne;
            let absorbed = self.faces[gone.0].take()
                .unwrap_or_else(|| panic!("{gone} removed twice"));
            self.assign_cycle(merged, keep);

            let mut other_holes: SmallVec<[HalfEdgeId; 2]> = SmallVec::new();
            for (j, &r) in absorbed.holes.iter().enumerate() {
                if slot_gone == Slot::Hole(j) { continue; }
                self.assign_cycle(r, keep);
                other_holes.push(r);
            }
            let absorbed_outer = match (slot_gone, absorbed.outer) {
                (Slot::Hole(_), Some(o)) => {
                    self.assign_cycle(o, keep);
                    Some(o)
                }
                _ => None,
            };

            let rec = self.fc_mut(keep);
            match slot_keep {
                Slot::Outer if slot_gone == Slot::Outer => rec.outer = Some(merged),
                Slot::Outer => {
                    // `keep` sat inside a hole of `gone`: it inherits the outer boundary.
                    rec.outer = absorbed_outer;
                    rec.holes.push(merged);
                }
                Slot::Hole(i) => {
                    debug_assert!(absorbed_outer.is_none(), "{gone} nested inside its own neighbour");
                    rec.holes[i] = merged;
                }
            }
            rec.holes.extend(other_holes);

            removal.face = keep;
            removal.removed_face = Some(gone);
        } else if ne == t && nt == e {
            // A lone edge floating in the face.
            let rec = self.fc_mut(fe);
            rec.holes.retain(|r| *r != e && *r != t);
            self.free_pair(e);
            self.free_vertex(u);
            self.free_vertex(w);
            removal.removed_vertices.extend([u, w]);
        } else if ne == t {
            // `w` is the tip of an antenna.
            self.set_next(pe, nt);
            self.replace_rep(fe, e, nt);
            self.replace_rep(fe, t, nt);
            self.fix_vertex_rep(u, e, nt);
            self.free_pair(e);
            self.free_vertex(w);
            removal.removed_vertices.push(w);
        } else if nt == e {
            // `u` is the tip of an antenna.
            self.set_next(pt, ne);
            self.replace_rep(fe, e, ne);
            self.replace_rep(fe, t, ne);
            self.fix_vertex_rep(w, t, ne);
            self.free_pair(e);
            self.free_vertex(u);
            removal.removed_vertices.push(u);
        } else {
            // A bridge: one cycle falls apart into two.
            let slot = self.cycle_slot(fe, e);
            self.set_next(pe, nt);
            self.set_next(pt, ne);
            self.fix_vertex_rep(u, e, nt);
            self.fix_vertex_rep(w, t, ne);
            self.free_pair(e);

            let (c1, c2) = (ne, nt);
            let (outer, hole) = if self.cycle_area(c1) >= self.cycle_area(c2) { (c1, c2) } else { (c2, c1) };
            let rec = self.fc_mut(fe);
            match slot {
                Slot::Outer => {
                    rec.outer = Some(outer);
                    rec.holes.push(hole);
                }
                Slot::Hole(i) => {
                    rec.holes[i] = c1;
                    rec.holes.push(c2);
                }
            }
        }
        removal
    }

    /// Replace `e1` and its successor `e2` by a single edge.
    ///
    /// The vertex between them must have no other edges and the two must be
    /// collinear.  `e1` survives (from its origin to the target of `e2`),
    /// together with the payload and dominance of the first piece.
    pub fn merge_edges(&mut self, e1: HalfEdgeId, e2: HalfEdgeId) -> HalfEdgeId {
        assert_eq!(self.next(e1), e2, "{e2} does not follow {e1}");
        let (t1, t2) = (self.twin(e1), self.twin(e2));
        assert!(t1 != e2 && self.next(t2) == t1, "vertex between {e1} and {e2} is not of degree 2");
        let (a, v, b) = (self.origin(e1), self.origin(e2), self.target(e2));
        assert_ne!(a, b, "merging {e1} and {e2} would close a loop");
        debug_assert_eq!(
            geom::orient(self.point(a), self.point(v), self.point(b)),
            geo::kernels::Orientation::Collinear,
            "{e1} and {e2} are not collinear",
        );

        let (n2, nt1) = (self.next(e2), self.next(t1));
        let (fe, ft) = (self.face(e1), self.face(t2));
        self.unindex_edge(e1);
        self.unindex_edge(e2);

        self.set_next(e1, n2);
        self.set_next(t2, nt1);
        self.he_mut(e1).twin = t2;
        self.he_mut(t2).twin = e1;
        self.index_edge(e1);

        if self.is_dominant(e1) {
            self.he_mut(t2).dominant = false;
            self.he_mut(t2).data = E::default();
        } else {
            let data = std::mem::take(&mut self.he_mut(t1).data);
            self.he_mut(t2).data = data;
            self.he_mut(t2).dominant = true;
        }

        self.replace_rep(fe, e2, e1);
        self.replace_rep(ft, t1, t2);

        self.half_edges[e2.0] = None;
        self.half_edges[t1.0] = None;
        self.free_vertex(v);
        e1
    }

    /// If `v`'s representative is `old`, point it at `new`.
    fn fix_vertex_rep(&mut self, v: VertexId, old: HalfEdgeId, new: HalfEdgeId) {
        if self.vertices[v.0].as_ref().is_some_and(|x| x.half_edge == old) {
            self.vx_mut(v).half_edge = new;
        }
    }
}
