//! Water-body queries and topology cleanup.

use std::collections::BTreeSet;

use geograph::{FaceId, HalfEdgeId, UNBOUNDED};
use log::debug;

use crate::map::{is_water_face, Arrangement, FaceData};

/// True if any face across the boundary of `face` is water.  The unbounded
/// face only counts when `unbounded_is_wet` is set.
pub fn is_adjacent_water(map: &Arrangement, face: FaceId, unbounded_is_wet: bool) -> bool {
    assert_ne!(face, UNBOUNDED, "adjacency of the unbounded face is not meaningful");
    map.adjacent_faces(face).into_iter().any(|g| {
        if g == UNBOUNDED { unbounded_is_wet } else { map.face_data(g).is_water() }
    })
}

/// Every bounded water face reachable from `face` through water.
pub fn connected_wet_faces(map: &Arrangement, face: FaceId) -> BTreeSet<FaceId> {
    map.connected_region(face, is_water_face)
}

/// Strip a face of everything inside it: antennas poking in from the outer
/// boundary and every hole.  Returns the number of edges removed.
pub fn clean_face(map: &mut Arrangement, face: FaceId) -> usize {
    let outer = map.outer_ccb(face).expect("cannot clean the unbounded face");

    let mut antennas: Vec<HalfEdgeId> = Vec::new();
    for h in map.ccb(outer) {
        if map.face(map.twin(h)) == face && !antennas.contains(&map.twin(h)) {
            antennas.push(h);
        }
    }
    let mut removed = antennas.len();
    for h in antennas {
        map.remove_edge(h);
    }

    // Removing a hole edge either merges a nested face into this one or
    // shortens a tree; both leave the face as the survivor.
    while let Some(&h) = map.holes(face).first() {
        map.remove_edge(h);
        removed += 1;
    }
    debug!("cleaned {face}: {removed} edges removed");
    removed
}

/// Fold water that touches the unbounded face into it, then drop whatever
/// dangles in the open.  Edges carrying roads are kept.  Returns the number
/// of edges removed.
pub fn remove_unbounded_water(map: &mut Arrangement) -> usize {
    let wet: Vec<HalfEdgeId> = map.dominant_half_edges()
        .filter(|&h| !map.edge_data(h).has_roads())
        .filter(|&h| is_water_face(map, map.face(h)) && is_water_face(map, map.face(map.twin(h))))
        .collect();
    let mut removed = wet.len();
    for h in wet {
        map.remove_edge(h);
    }

    loop {
        let open: Vec<HalfEdgeId> = map.dominant_half_edges()
            .filter(|&h| map.face(h) == UNBOUNDED && map.face(map.twin(h)) == UNBOUNDED)
            .collect();
        if open.is_empty() { break; }
        removed += open.len();
        for h in open {
            map.remove_edge(h);
        }
    }
    debug!("removed {removed} edges of unbounded water");
    removed
}

/// Reduce the map to its water bodies: every edge that does not separate
/// water from land goes, and the remaining land loses its attributes.
/// Returns the number of edges removed.
pub fn reduce_to_water_bodies(map: &mut Arrangement) -> usize {
    let wet = |map: &Arrangement, f: FaceId| map.face_data(f).is_water();
    let dead: Vec<HalfEdgeId> = map.dominant_half_edges()
        .filter(|&h| wet(map, map.face(h)) == wet(map, map.face(map.twin(h))))
        .collect();
    let removed = dead.len();
    for h in dead {
        map.remove_edge(h);
    }

    let land: Vec<FaceId> = map.bounded_faces().filter(|&f| !wet(map, f)).collect();
    for f in land {
        *map.face_data_mut(f) = FaceData::default();
    }
    *map.face_data_mut(UNBOUNDED) = FaceData::default();
    debug!("reduced to {} water faces", map.bounded_faces().count());
    removed
}
