//! Doubly Connected Edge List (DCEL) arrangement of a planar subdivision.
//!
//! # Structure
//!
//! Every undirected edge is represented as a pair of directed **half-edges**
//! (twins).  Each half-edge carries:
//!
//! * `origin`  : the vertex it leaves from
//! * `twin`    : the opposite half-edge (same edge, opposite direction)
//! * `next`    : the next half-edge around the same face
//! * `prev`    : the previous half-edge around the same face
//! * `face`    : the face to the left of this half-edge
//! * `dominant`: exactly one half-edge of each twin pair is dominant and
//!   owns the edge payload `E`
//!
//! Faces own one outer boundary cycle (counter-clockwise) and any number of
//! hole cycles (clockwise, or zero-area trees).  The unbounded face is always
//! `FaceId(0)`; it has no outer cycle, and its holes are the outermost
//! boundaries of the map content.
//!
//! # Indexing
//!
//! All elements live in flat arenas addressed by strongly-typed index
//! wrappers (`VertexId`, `HalfEdgeId`, `FaceId`).  Removed elements leave a
//! tombstone; ids are never reused.  Touching a removed id panics.
//! Vertices are found by exact coordinate through a hash locator, edges
//! through an R-tree of their bounding boxes.

use std::fmt;

use ahash::AHashMap;
use geo::{Coord, Line, Rect};
use rstar::RTree;
use smallvec::SmallVec;

use crate::geom;
use crate::index::EdgeKey;

// ---------------------------------------------------------------------------
// Index types
// ---------------------------------------------------------------------------

macro_rules! idx {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

idx!(VertexId);
idx!(HalfEdgeId);
idx!(FaceId);

/// The unbounded (outer) face, always `FaceId(0)`.
pub const UNBOUNDED: FaceId = FaceId(0);

/// Placeholder link for records that are wired up right after allocation.
const UNLINKED: HalfEdgeId = HalfEdgeId(usize::MAX);

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct Vertex {
    pub(crate) point:     Coord<f64>,
    /// Any half-edge leaving this vertex.
    pub(crate) half_edge: HalfEdgeId,
}

#[derive(Clone, Debug)]
pub(crate) struct HalfEdge<E> {
    pub(crate) origin:   VertexId,
    pub(crate) twin:     HalfEdgeId,
    pub(crate) next:     HalfEdgeId,
    pub(crate) prev:     HalfEdgeId,
    pub(crate) face:     FaceId,
    pub(crate) dominant: bool,
    /// Meaningful only on the dominant side.
    pub(crate) data:     E,
}

#[derive(Clone, Debug)]
pub(crate) struct Face<F> {
    /// Representative of the outer cycle; `None` only for the unbounded face.
    pub(crate) outer: Option<HalfEdgeId>,
    /// One representative per hole cycle.
    pub(crate) holes: SmallVec<[HalfEdgeId; 2]>,
    pub(crate) data:  F,
}

/// Exact vertex identity: the coordinate's bit pattern, with `-0.0` folded
/// into `0.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PointKey(u64, u64);

impl From<Coord<f64>> for PointKey {
    #[inline]
    fn from(p: Coord<f64>) -> Self {
        debug_assert!(p.x.is_finite() && p.y.is_finite(), "non-finite coordinate {p:?}");
        Self((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
    }
}

/// Which recorded cycle of a face a half-edge sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Outer,
    Hole(usize),
}

// ---------------------------------------------------------------------------
// DCEL
// ---------------------------------------------------------------------------

/// A planar arrangement with edge payload `E` and face payload `F`.
#[derive(Clone, Debug)]
pub struct Dcel<E, F> {
    pub(crate) vertices:   Vec<Option<Vertex>>,
    pub(crate) half_edges: Vec<Option<HalfEdge<E>>>,
    pub(crate) faces:      Vec<Option<Face<F>>>,
    pub(crate) locator:    AHashMap<PointKey, VertexId>,
    pub(crate) edge_index: RTree<EdgeKey>,
}

impl<E: Clone + Default, F: Clone + Default> Default for Dcel<E, F> {
    fn default() -> Self { Self::new() }
}

impl<E: Clone + Default, F: Clone + Default> Dcel<E, F> {
    /// Create an empty arrangement.  The unbounded face is pre-inserted.
    pub fn new() -> Self {
        Self {
            vertices:   Vec::new(),
            half_edges: Vec::new(),
            // Reserve slot 0 for the unbounded face.
            faces:      vec![Some(Face { outer: None, holes: SmallVec::new(), data: F::default() })],
            locator:    AHashMap::new(),
            edge_index: RTree::new(),
        }
    }

    /// Move the payload (and the flag) of `e`'s pair over to the other side,
    /// so that `e` itself becomes dominant if it was not, and vice versa.
    pub fn swap_dominance(&mut self, e: HalfEdgeId) {
        let t = self.twin(e);
        let data = std::mem::take(&mut self.he_mut(e).data);
        let other = std::mem::replace(&mut self.he_mut(t).data, data);
        self.he_mut(e).data = other;
        let flag = self.he(e).dominant;
        self.he_mut(e).dominant = !flag;
        self.he_mut(t).dominant = flag;
    }

    // -----------------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------------

    pub(crate) fn alloc_vertex(&mut self, point: Coord<f64>) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Some(Vertex { point, half_edge: UNLINKED }));
        self.locator.insert(point.into(), id);
        id
    }

    /// Allocate a twin pair `u→w` / `w→u`.  The first half-edge is dominant;
    /// `next`/`prev` are left pointing at themselves for the caller to wire.
    pub(crate) fn alloc_pair(
        &mut self,
        u:          VertexId,
        w:          VertexId,
        face_left:  FaceId,
        face_right: FaceId,
    ) -> (HalfEdgeId, HalfEdgeId) {
        let uw = HalfEdgeId(self.half_edges.len());
        let wu = HalfEdgeId(self.half_edges.len() + 1);
        self.half_edges.push(Some(HalfEdge {
            origin: u, twin: wu, next: uw, prev: uw, face: face_left, dominant: true, data: E::default(),
        }));
        self.half_edges.push(Some(HalfEdge {
            origin: w, twin: uw, next: wu, prev: wu, face: face_right, dominant: false, data: E::default(),
        }));
        (uw, wu)
    }

    pub(crate) fn alloc_face(&mut self, outer: HalfEdgeId, data: F) -> FaceId {
        let id = FaceId(self.faces.len());
        self.faces.push(Some(Face { outer: Some(outer), holes: SmallVec::new(), data }));
        id
    }
}

impl<E, F> Dcel<E, F> {
    // -----------------------------------------------------------------------
    // Record access (panics on removed ids)
    // -----------------------------------------------------------------------

    #[inline]
    pub(crate) fn vx(&self, id: VertexId) -> &Vertex {
        self.vertices.get(id.0).and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("{id} is not a live vertex of this arrangement"))
    }

    #[inline]
    pub(crate) fn vx_mut(&mut self, id: VertexId) -> &mut Vertex {
        self.vertices.get_mut(id.0).and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("{id} is not a live vertex of this arrangement"))
    }

    #[inline]
    pub(crate) fn he(&self, id: HalfEdgeId) -> &HalfEdge<E> {
        self.half_edges.get(id.0).and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("{id} is not a live half-edge of this arrangement"))
    }

    #[inline]
    pub(crate) fn he_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge<E> {
        self.half_edges.get_mut(id.0).and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("{id} is not a live half-edge of this arrangement"))
    }

    #[inline]
    pub(crate) fn fc(&self, id: FaceId) -> &Face<F> {
        self.faces.get(id.0).and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("{id} is not a live face of this arrangement"))
    }

    #[inline]
    pub(crate) fn fc_mut(&mut self, id: FaceId) -> &mut Face<F> {
        self.faces.get_mut(id.0).and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("{id} is not a live face of this arrangement"))
    }

    pub(crate) fn free_vertex(&mut self, id: VertexId) {
        let v = self.vertices[id.0].take()
            .unwrap_or_else(|| panic!("{id} removed twice"));
        self.locator.remove(&PointKey::from(v.point));
    }

    pub(crate) fn free_pair(&mut self, e: HalfEdgeId) {
        let t = self.twin(e);
        self.half_edges[e.0] = None;
        self.half_edges[t.0] = None;
    }

    /// Set `he.next = next` and `next.prev = he`.
    #[inline]
    pub(crate) fn set_next(&mut self, he: HalfEdgeId, next: HalfEdgeId) {
        self.he_mut(he).next = next;
        self.he_mut(next).prev = he;
    }

    /// Point every half-edge on the cycle of `start` at `face`.
    pub(crate) fn assign_cycle(&mut self, start: HalfEdgeId, face: FaceId) {
        let cycle: Vec<HalfEdgeId> = self.ccb(start).collect();
        for h in cycle { self.he_mut(h).face = face; }
    }

    /// Which recorded cycle of `face` contains `h`.
    pub(crate) fn cycle_slot(&self, face: FaceId, h: HalfEdgeId) -> Slot {
        let members: ahash::AHashSet<HalfEdgeId> = self.ccb(h).collect();
        let rec = self.fc(face);
        if rec.outer.is_some_and(|o| members.contains(&o)) { return Slot::Outer; }
        rec.holes.iter().position(|r| members.contains(r)).map(Slot::Hole)
            .unwrap_or_else(|| panic!("{h} is not on a recorded cycle of {face}"))
    }

    /// Replace a face's cycle representative `old` by `new`, wherever it is recorded.
    pub(crate) fn replace_rep(&mut self, face: FaceId, old: HalfEdgeId, new: HalfEdgeId) {
        let rec = self.fc_mut(face);
        if rec.outer == Some(old) { rec.outer = Some(new); }
        for r in rec.holes.iter_mut() {
            if *r == old { *r = new; }
        }
    }

    // -----------------------------------------------------------------------
    // Counts
    // -----------------------------------------------------------------------

    pub fn num_vertices(&self)   -> usize { self.vertices.iter().flatten().count() }
    pub fn num_half_edges(&self) -> usize { self.half_edges.iter().flatten().count() }
    /// Number of undirected edges.
    pub fn num_edges(&self)      -> usize { self.num_half_edges() / 2 }
    /// Number of faces including the unbounded face.
    pub fn num_faces(&self)      -> usize { self.faces.iter().flatten().count() }
    pub fn is_empty(&self)       -> bool  { self.num_half_edges() == 0 }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline] pub fn point(&self, v: VertexId) -> Coord<f64> { self.vx(v).point }
    /// Some half-edge leaving `v`.
    #[inline] pub fn vertex_half_edge(&self, v: VertexId) -> HalfEdgeId { self.vx(v).half_edge }

    #[inline] pub fn origin(&self, h: HalfEdgeId) -> VertexId   { self.he(h).origin }
    #[inline] pub fn target(&self, h: HalfEdgeId) -> VertexId   { self.he(self.he(h).twin).origin }
    #[inline] pub fn twin(&self, h: HalfEdgeId)   -> HalfEdgeId { self.he(h).twin }
    #[inline] pub fn next(&self, h: HalfEdgeId)   -> HalfEdgeId { self.he(h).next }
    #[inline] pub fn prev(&self, h: HalfEdgeId)   -> HalfEdgeId { self.he(h).prev }
    #[inline] pub fn face(&self, h: HalfEdgeId)   -> FaceId     { self.he(h).face }
    #[inline] pub fn is_dominant(&self, h: HalfEdgeId) -> bool  { self.he(h).dominant }

    /// The dominant half-edge of `h`'s pair.
    #[inline]
    pub fn dominant(&self, h: HalfEdgeId) -> HalfEdgeId {
        if self.he(h).dominant { h } else { self.he(h).twin }
    }

    #[inline] pub fn source_point(&self, h: HalfEdgeId) -> Coord<f64> { self.point(self.origin(h)) }
    #[inline] pub fn target_point(&self, h: HalfEdgeId) -> Coord<f64> { self.point(self.target(h)) }

    #[inline]
    pub fn segment(&self, h: HalfEdgeId) -> Line<f64> {
        Line::new(self.source_point(h), self.target_point(h))
    }

    /// Payload of the undirected edge (read from the dominant side).
    #[inline] pub fn edge_data(&self, h: HalfEdgeId) -> &E { &self.he(self.dominant(h)).data }

    #[inline]
    pub fn edge_data_mut(&mut self, h: HalfEdgeId) -> &mut E {
        let d = self.dominant(h);
        &mut self.he_mut(d).data
    }

    #[inline] pub fn is_unbounded(&self, f: FaceId) -> bool { f == UNBOUNDED }
    #[inline] pub fn outer_ccb(&self, f: FaceId) -> Option<HalfEdgeId> { self.fc(f).outer }
    #[inline] pub fn holes(&self, f: FaceId) -> &[HalfEdgeId] { &self.fc(f).holes }
    #[inline] pub fn face_data(&self, f: FaceId) -> &F { &self.fc(f).data }
    #[inline] pub fn face_data_mut(&mut self, f: FaceId) -> &mut F { &mut self.fc_mut(f).data }

    #[inline] pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.get(v.0).is_some_and(Option::is_some)
    }
    #[inline] pub fn contains_half_edge(&self, h: HalfEdgeId) -> bool {
        self.half_edges.get(h.0).is_some_and(Option::is_some)
    }
    #[inline] pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.get(f.0).is_some_and(Option::is_some)
    }

    /// The vertex sitting exactly at `p`, if any.
    #[inline]
    pub fn locate_vertex(&self, p: Coord<f64>) -> Option<VertexId> {
        self.locator.get(&PointKey::from(p)).copied()
    }

    /// Number of edges incident to `v`.
    pub fn degree(&self, v: VertexId) -> usize { self.vertex_star(v).count() }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().enumerate().filter(|(_, v)| v.is_some()).map(|(i, _)| VertexId(i))
    }

    pub fn half_edge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.half_edges.iter().enumerate().filter(|(_, h)| h.is_some()).map(|(i, _)| HalfEdgeId(i))
    }

    /// One half-edge per undirected edge: the dominant one.
    pub fn dominant_half_edges(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.half_edges.iter().enumerate()
            .filter(|(_, h)| h.as_ref().is_some_and(|h| h.dominant))
            .map(|(i, _)| HalfEdgeId(i))
    }

    /// All live faces, the unbounded face first.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.iter().enumerate().filter(|(_, f)| f.is_some()).map(|(i, _)| FaceId(i))
    }

    pub fn bounded_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.face_ids().filter(|&f| f != UNBOUNDED)
    }

    /// Iterate over the boundary cycle of `start`, beginning with `start`.
    pub fn ccb(&self, start: HalfEdgeId) -> Ccb<'_, E, F> {
        Ccb { dcel: self, start, current: start, done: false }
    }

    /// Iterate over the half-edges leaving `v`.
    pub fn vertex_star(&self, v: VertexId) -> VertexStar<'_, E, F> {
        let start = self.vertex_half_edge(v);
        VertexStar { dcel: self, start, current: start, done: false }
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Source points of the cycle of `start`, in order.
    pub fn cycle_points(&self, start: HalfEdgeId) -> Vec<Coord<f64>> {
        self.ccb(start).map(|h| self.source_point(h)).collect()
    }

    /// Signed area enclosed by the cycle of `start` (positive when counter-clockwise).
    pub fn cycle_area(&self, start: HalfEdgeId) -> f64 {
        geom::signed_area(&self.cycle_points(start))
    }

    /// Area of a bounded face with its holes taken out; zero for the unbounded face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let Some(outer) = self.outer_ccb(f) else { return 0.0 };
        self.cycle_area(outer) + self.holes(f).iter().map(|&h| self.cycle_area(h)).sum::<f64>()
    }

    /// Bounding rectangle of all vertices.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.vertices.iter().flatten()
            .map(|v| Rect::new(v.point, v.point))
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Iterator over the half-edges of one boundary cycle.
pub struct Ccb<'a, E, F> {
    dcel:    &'a Dcel<E, F>,
    start:   HalfEdgeId,
    current: HalfEdgeId,
    done:    bool,
}

impl<E, F> Iterator for Ccb<'_, E, F> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        if self.done { return None; }
        let he = self.current;
        self.current = self.dcel.he(he).next;
        if self.current == self.start { self.done = true; }
        Some(he)
    }
}

/// Iterator over the outgoing half-edges of a vertex, using `twin.next`.
pub struct VertexStar<'a, E, F> {
    dcel:    &'a Dcel<E, F>,
    start:   HalfEdgeId,
    current: HalfEdgeId,
    done:    bool,
}

impl<E, F> Iterator for VertexStar<'_, E, F> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        if self.done { return None; }
        let he = self.current;
        let twin = self.dcel.he(he).twin;
        self.current = self.dcel.he(twin).next;
        if self.current == self.start { self.done = true; }
        Some(he)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
