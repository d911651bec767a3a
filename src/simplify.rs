//! Removing edges and vertices that carry no information.

use geo::kernels::Orientation;
use geograph::geom::{dot, orient};
use geograph::{HalfEdgeId, VertexId, UNBOUNDED};
use log::debug;

use crate::map::Arrangement;

/// Simplify `map` in two passes: remove every edge that separates nothing
/// worth keeping, then merge straight-through degree-2 vertices whose edges
/// carry identical data.  With `kill_rivers`, river edges count as
/// meaningless.  Returns the number of edges removed plus vertices merged.
pub fn simplify_map(map: &mut Arrangement, kill_rivers: bool) -> usize {
    let dead: Vec<HalfEdgeId> = map.dominant_half_edges()
        .filter(|&h| !has_meaning(map, h, kill_rivers))
        .collect();
    let removed = dead.len();
    for h in dead {
        map.remove_edge(h);
    }

    let mut merged = 0;
    let vertices: Vec<VertexId> = map.vertex_ids().collect();
    for v in vertices {
        // Earlier merges free vertices.
        if !map.contains_vertex(v) || map.degree(v) != 2 { continue; }
        let e2 = map.vertex_half_edge(v);
        let e1 = map.prev(e2);
        if mergeable(map, e1, e2) {
            map.merge_edges(e1, e2);
            merged += 1;
        }
    }

    debug!("simplified map: {removed} edges removed, {merged} vertices merged");
    removed + merged
}

/// An edge is kept if it is a coastline or the map border, changes land use
/// or area feature, carries roads, or is a river or must-burn edge.
fn has_meaning(map: &Arrangement, h: HalfEdgeId, kill_rivers: bool) -> bool {
    let (f, g) = (map.face(h), map.face(map.twin(h)));
    let (a, b) = (map.face_data(f), map.face_data(g));
    let data = map.edge_data(h);

    let coastline = a.is_water() != b.is_water();
    let border = (f == UNBOUNDED) != (g == UNBOUNDED);
    let lu_change = !a.terrain_match(b);
    let feature = a.area_feature != b.area_feature;
    // Rivers inside water bodies or along coastlines say nothing new.
    let river = !kill_rivers && data.is_river() && !a.is_water() && !b.is_water();

    coastline || border || lu_change || feature || data.has_roads() || river || data.must_burn()
}

/// `e1` runs into a degree-2 vertex and `e2` continues straight on with the
/// same data on the same side.
fn mergeable(map: &Arrangement, e1: HalfEdgeId, e2: HalfEdgeId) -> bool {
    let (a, v, b) = (map.origin(e1), map.origin(e2), map.target(e2));
    if a == b || map.is_dominant(e1) != map.is_dominant(e2) { return false; }

    let (pa, pv, pb) = (map.point(a), map.point(v), map.point(b));
    orient(pa, pv, pb) == Orientation::Collinear
        && dot(pv - pa, pb - pv) > 0.0
        && map.edge_data(e1) == map.edge_data(e2)
}
