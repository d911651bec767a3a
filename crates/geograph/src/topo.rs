//! Face/edge correspondence and flood fills over the arrangement.

use std::collections::{BTreeSet, VecDeque};

use ahash::AHashSet;

use crate::dcel::{Dcel, FaceId, HalfEdgeId, UNBOUNDED};

impl<E, F> Dcel<E, F> {
    /// Every half-edge on the outer cycle and the hole cycles of `f`.
    pub fn edges_of_face(&self, f: FaceId) -> BTreeSet<HalfEdgeId> {
        let mut out = BTreeSet::new();
        for &rep in self.outer_ccb(f).iter().chain(self.holes(f)) {
            out.extend(self.ccb(rep));
        }
        out
    }

    /// Faces enclosed by an edge set.
    ///
    /// Starts from the faces on the left of the given half-edges and keeps
    /// crossing any boundary edge that is not in the set.  The set acts as a
    /// firebreak, so for a closed boundary with its inside on the left this
    /// yields exactly the inside.  If the boundary leaks, the unbounded face
    /// shows up in the result; callers that require closure check for it.
    pub fn faces_of_edges<I>(&self, edges: I) -> BTreeSet<FaceId>
    where
        I: IntoIterator<Item = HalfEdgeId>,
    {
        let fence: AHashSet<HalfEdgeId> = edges.into_iter().collect();
        let mut found: BTreeSet<FaceId> = fence.iter().map(|&h| self.face(h)).collect();
        let mut queue: VecDeque<FaceId> = found.iter().copied().collect();

        while let Some(f) = queue.pop_front() {
            for h in self.edges_of_face(f) {
                if fence.contains(&h) { continue; }
                let across = self.face(self.twin(h));
                if found.insert(across) { queue.push_back(across); }
            }
        }
        found
    }

    /// Half-edges bounding a face set from the inside: their face is in the
    /// set and their twin's face is not.
    pub fn edges_of_faces(&self, faces: &BTreeSet<FaceId>) -> BTreeSet<HalfEdgeId> {
        faces.iter()
            .flat_map(|&f| self.edges_of_face(f))
            .filter(|&h| !faces.contains(&self.face(self.twin(h))))
            .collect()
    }

    /// Half-edges strictly inside the region enclosed by `edges`: every edge
    /// of the enclosed faces except the boundary itself and its twins.
    pub fn internal_edges<I>(&self, edges: I) -> BTreeSet<HalfEdgeId>
    where
        I: IntoIterator<Item = HalfEdgeId>,
    {
        let fence: BTreeSet<HalfEdgeId> = edges.into_iter().collect();
        let faces = self.faces_of_edges(fence.iter().copied());
        faces.iter()
            .flat_map(|&f| self.edges_of_face(f))
            .filter(|h| !fence.contains(h) && !fence.contains(&self.twin(*h)))
            .collect()
    }

    /// Faces sharing at least one edge with `f`, excluding `f` itself.
    pub fn adjacent_faces(&self, f: FaceId) -> BTreeSet<FaceId> {
        self.edges_of_face(f).into_iter()
            .map(|h| self.face(self.twin(h)))
            .filter(|&g| g != f)
            .collect()
    }

    /// Faces reachable from `start` by stepping across edges into faces that
    /// satisfy `pred`.  The unbounded face is never entered; `start` itself
    /// is included whenever it is bounded.
    pub fn connected_region<P>(&self, start: FaceId, pred: P) -> BTreeSet<FaceId>
    where
        P: Fn(&Self, FaceId) -> bool,
    {
        let mut found = BTreeSet::new();
        if start == UNBOUNDED { return found; }
        found.insert(start);
        let mut queue = VecDeque::from([start]);

        while let Some(f) = queue.pop_front() {
            for g in self.adjacent_faces(f) {
                if g == UNBOUNDED || found.contains(&g) || !pred(self, g) { continue; }
                found.insert(g);
                queue.push_back(g);
            }
        }
        found
    }
}
