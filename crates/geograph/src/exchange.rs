//! Trading a bounded region between two arrangements.
//!
//! Both arrangements carry the same closed boundary, given as two aligned
//! lists of half-edges with the traded region on their left.  Everything
//! inside the boundary in `a` moves to `b` and vice versa.  Boundary
//! vertices and the outside twins of the boundary stay where they are; the
//! boundary half-edges themselves travel with their region and are stitched
//! to the other arrangement's outside twins.  `next` links never cross the
//! boundary, so re-pointing `twin` is all it takes to close the seam.

use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::dcel::{Dcel, Face, FaceId, HalfEdge, HalfEdgeId, PointKey, Vertex, VertexId, UNBOUNDED};

/// Where the traded elements ended up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Exchange {
    /// `bounds_a[i]` as it now lives in `b`.
    pub bounds_in_b: Vec<HalfEdgeId>,
    /// `bounds_b[i]` as it now lives in `a`.
    pub bounds_in_a: Vec<HalfEdgeId>,
    /// Faces that moved from `a` into `b`, under their new ids.
    pub faces_in_b:  Vec<FaceId>,
    /// Faces that moved from `b` into `a`, under their new ids.
    pub faces_in_a:  Vec<FaceId>,
}

/// Elements lifted out of one arena, still carrying their old ids.
struct Detached<E, F> {
    vertices:   Vec<(VertexId, Vertex)>,
    half_edges: Vec<(HalfEdgeId, HalfEdge<E>)>,
    faces:      Vec<(FaceId, Face<F>)>,
}

/// Swap the regions enclosed by `bounds_a` in `a` and `bounds_b` in `b`.
///
/// `bounds_a[i]` and `bounds_b[i]` must run between the same coordinates in
/// the same direction, with the traded region on their left; each must
/// separate two different faces.  The region's side of every boundary edge
/// is made dominant first, so boundary payloads travel with the region.
///
/// # Panics
///
/// On mismatched boundaries or a boundary that does not enclose bounded
/// faces only.  Both are contract violations by the caller.
pub fn exchange_subgraph<E, F>(
    a:        &mut Dcel<E, F>,
    b:        &mut Dcel<E, F>,
    bounds_a: &[HalfEdgeId],
    bounds_b: &[HalfEdgeId],
) -> Exchange
where
    E: Clone + Default,
    F: Clone + Default,
{
    assert_eq!(bounds_a.len(), bounds_b.len(), "boundary lists differ in length");
    for (&ea, &eb) in bounds_a.iter().zip(bounds_b) {
        assert!(
            a.source_point(ea) == b.source_point(eb) && a.target_point(ea) == b.target_point(eb),
            "boundary {ea} does not match {eb}",
        );
        assert_ne!(a.face(ea), a.face(a.twin(ea)), "{ea} has the same face on both sides");
        assert_ne!(b.face(eb), b.face(b.twin(eb)), "{eb} has the same face on both sides");
    }

    for &e in bounds_a { if !a.is_dominant(e) { a.swap_dominance(e); } }
    for &e in bounds_b { if !b.is_dominant(e) { b.swap_dominance(e); } }

    // Boundary vertices stay put; remember their counterparts.
    let mut keep_ab: AHashMap<VertexId, VertexId> = AHashMap::new();
    let mut keep_ba: AHashMap<VertexId, VertexId> = AHashMap::new();
    for (&ea, &eb) in bounds_a.iter().zip(bounds_b) {
        for (va, vb) in [(a.origin(ea), b.origin(eb)), (a.target(ea), b.target(eb))] {
            keep_ab.insert(va, vb);
            keep_ba.insert(vb, va);
        }
    }

    // Outside twins, captured before anything moves.
    let outside_a: Vec<HalfEdgeId> = bounds_a.iter().map(|&e| a.twin(e)).collect();
    let outside_b: Vec<HalfEdgeId> = bounds_b.iter().map(|&e| b.twin(e)).collect();
    let seam_ab: AHashMap<HalfEdgeId, HalfEdgeId> = bounds_a.iter().copied().zip(outside_b).collect();
    let seam_ba: AHashMap<HalfEdgeId, HalfEdgeId> = bounds_b.iter().copied().zip(outside_a).collect();

    let from_a = a.detach_region(bounds_a, &keep_ab);
    let from_b = b.detach_region(bounds_b, &keep_ba);
    debug!(
        "exchanging {} faces / {} half-edges for {} faces / {} half-edges",
        from_a.faces.len(), from_a.half_edges.len(), from_b.faces.len(), from_b.half_edges.len(),
    );

    let (edges_ab, faces_in_b) = b.attach_region(from_a, &keep_ab, &seam_ab);
    let (edges_ba, faces_in_a) = a.attach_region(from_b, &keep_ba, &seam_ba);

    Exchange {
        bounds_in_b: bounds_a.iter().map(|e| edges_ab[e]).collect(),
        bounds_in_a: bounds_b.iter().map(|e| edges_ba[e]).collect(),
        faces_in_b,
        faces_in_a,
    }
}

impl<E, F> Dcel<E, F> {
    /// Lift out the faces enclosed by `bounds`, every half-edge on their
    /// cycles, and every vertex of those half-edges except the kept ones.
    fn detach_region(
        &mut self,
        bounds: &[HalfEdgeId],
        keep:   &AHashMap<VertexId, VertexId>,
    ) -> Detached<E, F> {
        let faces: BTreeSet<FaceId> = self.faces_of_edges(bounds.iter().copied());
        assert!(!faces.contains(&UNBOUNDED), "exchange boundary does not enclose its region");

        let edges: BTreeSet<HalfEdgeId> = faces.iter().flat_map(|&f| self.edges_of_face(f)).collect();
        let verts: BTreeSet<VertexId> = edges.iter()
            .map(|&h| self.origin(h))
            .filter(|v| !keep.contains_key(v))
            .collect();

        // Boundary edges keep their geometry: the outside twin stays here.
        let interior: Vec<HalfEdgeId> = edges.iter().copied()
            .filter(|&h| edges.contains(&self.twin(h)) && self.is_dominant(h))
            .collect();
        for h in interior { self.unindex_edge(h); }

        let mut out = Detached { vertices: Vec::new(), half_edges: Vec::new(), faces: Vec::new() };
        for v in verts {
            let rec = self.vertices[v.0].take().unwrap_or_else(|| panic!("{v} detached twice"));
            self.locator.remove(&PointKey::from(rec.point));
            out.vertices.push((v, rec));
        }
        for h in edges {
            let rec = self.half_edges[h.0].take().unwrap_or_else(|| panic!("{h} detached twice"));
            out.half_edges.push((h, rec));
        }
        for f in faces {
            let rec = self.faces[f.0].take().unwrap_or_else(|| panic!("{f} detached twice"));
            out.faces.push((f, rec));
        }
        out
    }

    /// Re-home detached elements under fresh ids.  Kept vertices resolve to
    /// their counterparts here; boundary half-edges pair up with the outside
    /// twins given in `seam`, which are patched to point back.
    fn attach_region(
        &mut self,
        region: Detached<E, F>,
        keep:   &AHashMap<VertexId, VertexId>,
        seam:   &AHashMap<HalfEdgeId, HalfEdgeId>,
    ) -> (AHashMap<HalfEdgeId, HalfEdgeId>, Vec<FaceId>) {
        let vmap: AHashMap<VertexId, VertexId> = region.vertices.iter().enumerate()
            .map(|(i, (old, _))| (*old, VertexId(self.vertices.len() + i)))
            .collect();
        let hmap: AHashMap<HalfEdgeId, HalfEdgeId> = region.half_edges.iter().enumerate()
            .map(|(i, (old, _))| (*old, HalfEdgeId(self.half_edges.len() + i)))
            .collect();
        let fmap: AHashMap<FaceId, FaceId> = region.faces.iter().enumerate()
            .map(|(i, (old, _))| (*old, FaceId(self.faces.len() + i)))
            .collect();

        let vertex = |v: VertexId| vmap.get(&v).or_else(|| keep.get(&v)).copied()
            .unwrap_or_else(|| panic!("{v} is neither moving nor kept"));

        for (_, mut rec) in region.vertices {
            rec.half_edge = hmap[&rec.half_edge];
            let id = VertexId(self.vertices.len());
            self.locator.insert(PointKey::from(rec.point), id);
            self.vertices.push(Some(rec));
        }

        let mut seam_links = Vec::new();
        let mut interior = Vec::new();
        for (old, mut rec) in region.half_edges {
            rec.origin = vertex(rec.origin);
            rec.twin = match hmap.get(&rec.twin) {
                Some(&t) => {
                    if rec.dominant { interior.push(hmap[&old]); }
                    t
                }
                None => {
                    let outside = seam[&old];
                    seam_links.push((outside, hmap[&old]));
                    outside
                }
            };
            rec.next = hmap[&rec.next];
            rec.prev = hmap[&rec.prev];
            rec.face = fmap[&rec.face];
            self.half_edges.push(Some(rec));
        }

        let mut faces = Vec::with_capacity(region.faces.len());
        for (_, mut rec) in region.faces {
            rec.outer = rec.outer.map(|h| hmap[&h]);
            for r in rec.holes.iter_mut() { *r = hmap[&*r]; }
            faces.push(FaceId(self.faces.len()));
            self.faces.push(Some(rec));
        }

        // Close the seam, and give kept vertices a representative that is
        // guaranteed to be live: the boundary half-edge leaving them, or the
        // outside twin leaving the far end.
        let kept: AHashSet<VertexId> = keep.values().copied().collect();
        for (outside, inside) in seam_links {
            self.he_mut(outside).twin = inside;
            let (o, t) = (self.origin(inside), self.origin(outside));
            self.vx_mut(o).half_edge = inside;
            let stale = self.vx(t).half_edge;
            if kept.contains(&t) && !self.contains_half_edge(stale) {
                self.vx_mut(t).half_edge = outside;
            }
        }
        for h in interior { self.index_edge(h); }
        (hmap, faces)
    }
}
