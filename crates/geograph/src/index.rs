//! R-tree over the undirected edges of an arrangement.
//!
//! Entries are keyed by geometry rather than by half-edge id: edits rewire
//! twins and trade records between arenas, but an edge between two points
//! stays the same edge.  Queries resolve entries back to the dominant
//! half-edge through the vertex locator.

use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

use crate::dcel::{Dcel, HalfEdgeId};

/// An undirected edge, endpoints in lexicographic order so that both
/// directions produce the same key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EdgeKey {
    lo: [f64; 2],
    hi: [f64; 2],
}

impl EdgeKey {
    pub(crate) fn new(a: Coord<f64>, b: Coord<f64>) -> Self {
        let (a, b) = ([a.x, a.y], [b.x, b.y]);
        if (a[0], a[1]) <= (b[0], b[1]) { Self { lo: a, hi: b } } else { Self { lo: b, hi: a } }
    }

    #[inline]
    fn endpoints(&self) -> (Coord<f64>, Coord<f64>) {
        (Coord { x: self.lo[0], y: self.lo[1] }, Coord { x: self.hi[0], y: self.hi[1] })
    }
}

impl RTreeObject for EdgeKey {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.lo, self.hi)
    }
}

impl<E, F> Dcel<E, F> {
    /// Dominant half-edges whose bounding box meets `rect`.
    pub fn edges_near(&self, rect: Rect<f64>) -> impl Iterator<Item = HalfEdgeId> + '_ {
        let env = AABB::from_corners(rect.min().into(), rect.max().into());
        self.edge_index.locate_in_envelope_intersecting(&env).filter_map(|key| {
            let (lo, hi) = key.endpoints();
            let (a, b) = (self.locate_vertex(lo)?, self.locate_vertex(hi)?);
            self.vertex_star(a).find(|&h| self.target(h) == b).map(|h| self.dominant(h))
        })
    }

    /// Record the edge of `h`.  Its twin must already be wired.
    pub(crate) fn index_edge(&mut self, h: HalfEdgeId) {
        let key = EdgeKey::new(self.source_point(h), self.target_point(h));
        self.edge_index.insert(key);
    }

    /// Forget the edge of `h`.  Call before its geometry changes.
    pub(crate) fn unindex_edge(&mut self, h: HalfEdgeId) {
        let key = EdgeKey::new(self.source_point(h), self.target_point(h));
        let removed = self.edge_index.remove(&key);
        debug_assert!(removed.is_some(), "{h} was not in the edge index");
    }

    /// True if the index holds exactly the live edges.
    pub(crate) fn index_in_sync(&self) -> bool {
        self.edge_index.size() == self.num_edges()
            && self.dominant_half_edges()
                .all(|h| self.edge_index.contains(&EdgeKey::new(self.source_point(h), self.target_point(h))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    #[test]
    fn key_ignores_direction() {
        assert_eq!(EdgeKey::new(c(3.0, 1.0), c(0.0, 2.0)), EdgeKey::new(c(0.0, 2.0), c(3.0, 1.0)));
        assert_ne!(EdgeKey::new(c(0.0, 0.0), c(1.0, 1.0)), EdgeKey::new(c(0.0, 0.0), c(1.0, 2.0)));
    }

    #[test]
    fn queries_return_dominant_half_edges() {
        let mut map: Dcel<(), ()> = Dcel::new();
        let ring = map.insert_ring(&[c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 4.0)]).unwrap();
        map.insert_edge(c(10.0, 10.0), c(12.0, 10.0)).unwrap();

        let mut near: Vec<HalfEdgeId> = map.edges_near(Rect::new(c(3.0, -1.0), c(5.0, 1.0))).collect();
        near.sort();
        let mut want = vec![map.dominant(ring[0]), map.dominant(ring[1])];
        want.sort();
        assert_eq!(near, want);
        assert_eq!(map.edges_near(Rect::new(c(6.0, 6.0), c(9.0, 9.0))).count(), 0);
        assert!(map.index_in_sync());
    }

    #[test]
    fn edits_keep_the_index_in_sync() {
        let mut map: Dcel<(), ()> = Dcel::new();
        let ring = map.insert_ring(&[c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 4.0)]).unwrap();
        map.split_edge(ring[0], c(2.0, 0.0));
        assert!(map.index_in_sync());
        assert_eq!(map.edges_near(Rect::new(c(1.0, 0.0), c(1.0, 0.0))).count(), 1);

        let piece = map.next(ring[0]);
        map.merge_edges(ring[0], piece);
        assert!(map.index_in_sync());

        map.remove_edge(ring[2]);
        assert!(map.index_in_sync());
        assert_eq!(map.edges_near(Rect::new(c(1.0, 4.0), c(3.0, 4.0))).count(), 0);
    }
}
