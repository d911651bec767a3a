use geo::Coord;
use geograph::{Dcel, HalfEdgeId, UNBOUNDED};

type Map = Dcel<u32, u8>;

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

fn square(map: &mut Map, x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<HalfEdgeId> {
    map.insert_ring(&[c(x0, y0), c(x1, y0), c(x1, y1), c(x0, y1)]).unwrap()
}

fn edge_between(map: &Map, p: Coord<f64>, q: Coord<f64>) -> HalfEdgeId {
    let a = map.locate_vertex(p).unwrap();
    let b = map.locate_vertex(q).unwrap();
    map.find_edge(a, b).unwrap()
}

// ---------------------------------------------------------------------------
// split / merge
// ---------------------------------------------------------------------------

#[test]
fn split_keeps_id_and_duplicates_payload() {
    let mut map = Map::new();
    let ring = square(&mut map, 0.0, 0.0, 4.0, 4.0);
    let e = ring[0];
    *map.edge_data_mut(e) = 42;

    let kept = map.split_edge(e, c(1.0, 0.0));
    assert_eq!(kept, e);
    let e2 = map.next(e);
    assert_eq!(map.target_point(e), c(1.0, 0.0));
    assert_eq!(map.source_point(e2), c(1.0, 0.0));
    assert_eq!(map.target_point(e2), c(4.0, 0.0));
    assert!(map.is_dominant(e) && map.is_dominant(e2));
    assert_eq!((*map.edge_data(e), *map.edge_data(e2)), (42, 42));
    assert_eq!(map.num_edges(), 5);
    map.validate_planar().unwrap();
}

#[test]
fn split_from_the_subordinate_side() {
    let mut map = Map::new();
    let ring = square(&mut map, 0.0, 0.0, 4.0, 4.0);
    let outside = map.twin(ring[1]);
    *map.edge_data_mut(outside) = 9;
    assert!(!map.is_dominant(outside));

    map.split_edge(outside, c(4.0, 1.0));
    let piece = map.next(outside);
    assert!(!map.is_dominant(outside) && !map.is_dominant(piece));
    assert_eq!(*map.edge_data(piece), 9);
    assert_eq!(map.face(piece), UNBOUNDED);
    map.validate().unwrap();
}

#[test]
fn merge_undoes_split() {
    let mut map = Map::new();
    let ring = square(&mut map, 0.0, 0.0, 4.0, 4.0);
    let e = ring[2];
    *map.edge_data_mut(e) = 3;
    map.split_edge(e, c(2.0, 4.0));
    *map.edge_data_mut(map.next(e)) = 8;

    let merged = map.merge_edges(e, map.next(e));
    assert_eq!(merged, e);
    assert_eq!(map.segment(e).start, c(4.0, 4.0));
    assert_eq!(map.segment(e).end, c(0.0, 4.0));
    assert_eq!(*map.edge_data(e), 3);
    assert!(map.locate_vertex(c(2.0, 4.0)).is_none());
    assert_eq!(map.num_vertices(), 4);
    assert_eq!(map.num_edges(), 4);
    map.validate_planar().unwrap();
}

#[test]
fn merge_keeps_subordinate_payload_on_its_side() {
    let mut map = Map::new();
    let ring = square(&mut map, 0.0, 0.0, 4.0, 4.0);
    let outside = map.twin(ring[0]);
    *map.edge_data_mut(outside) = 5;
    map.split_edge(outside, c(3.0, 0.0));

    let merged = map.merge_edges(outside, map.next(outside));
    assert!(!map.is_dominant(merged));
    assert!(map.is_dominant(map.twin(merged)));
    assert_eq!(*map.edge_data(merged), 5);
    map.validate().unwrap();
}

#[test]
#[should_panic]
fn merge_at_a_junction_panics() {
    let mut map = Map::new();
    square(&mut map, 0.0, 0.0, 4.0, 4.0);
    map.insert_edge(c(2.0, 0.0), c(2.0, 4.0)).unwrap();
    let e = edge_between(&map, c(0.0, 0.0), c(2.0, 0.0));
    map.merge_edges(e, map.next(e));
}

// ---------------------------------------------------------------------------
// remove
// ---------------------------------------------------------------------------

#[test]
fn removing_a_diagonal_merges_faces() {
    let mut map = Map::new();
    square(&mut map, 0.0, 0.0, 4.0, 4.0);
    let d = map.insert_edge(c(0.0, 0.0), c(4.0, 4.0)).unwrap().edges[0];
    let (left, right) = (map.face(d), map.face(map.twin(d)));

    let removal = map.remove_edge(d);
    assert_eq!(removal.face, left);
    assert_eq!(removal.removed_face, Some(right));
    assert!(removal.removed_vertices.is_empty());
    assert!(!map.contains_face(right));
    assert_eq!(map.face_area(left), 16.0);
    map.validate_planar().unwrap();
}

#[test]
fn removing_a_boundary_edge_opens_the_face() {
    let mut map = Map::new();
    let ring = square(&mut map, 0.0, 0.0, 4.0, 4.0);
    let inside = map.face(ring[0]);

    let removal = map.remove_edge(ring[0]);
    assert_eq!(removal.face, UNBOUNDED);
    assert_eq!(removal.removed_face, Some(inside));
    assert_eq!(map.num_faces(), 1);
    assert_eq!(map.holes(UNBOUNDED).len(), 1);
    map.validate_planar().unwrap();
}

#[test]
fn removing_an_antenna_drops_its_tip() {
    let mut map = Map::new();
    square(&mut map, 0.0, 0.0, 4.0, 4.0);
    map.insert_edge(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
    let spike = edge_between(&map, c(1.0, 1.0), c(0.0, 0.0));

    let removal = map.remove_edge(spike);
    assert_eq!(removal.removed_face, None);
    assert_eq!(removal.removed_vertices.len(), 1);
    assert!(map.locate_vertex(c(1.0, 1.0)).is_none());
    assert_eq!(map.num_vertices(), 4);
    map.validate_planar().unwrap();
}

#[test]
fn removing_a_lone_edge_drops_both_ends() {
    let mut map = Map::new();
    let ring = square(&mut map, 0.0, 0.0, 4.0, 4.0);
    let face = map.face(ring[0]);
    let lone = map.insert_edge(c(1.0, 1.0), c(2.0, 3.0)).unwrap().edges[0];

    let removal = map.remove_edge(lone);
    assert_eq!(removal.face, face);
    assert_eq!(removal.removed_vertices.len(), 2);
    assert!(map.holes(face).is_empty());
    map.validate_planar().unwrap();
}

#[test]
fn removing_a_bridge_leaves_an_island() {
    let mut map = Map::new();
    let outer = square(&mut map, 0.0, 0.0, 10.0, 10.0);
    let face = map.face(outer[0]);
    square(&mut map, 4.0, 4.0, 6.0, 6.0);
    let bridge = map.insert_edge(c(0.0, 5.0), c(4.0, 5.0)).unwrap().edges[0];
    assert!(map.holes(face).is_empty());

    map.remove_edge(bridge);
    assert_eq!(map.holes(face).len(), 1);
    assert_eq!(map.face_area(face), 96.0);
    map.validate_planar().unwrap();
}

#[test]
fn opening_an_annulus_keeps_the_nested_face() {
    let mut map = Map::new();
    let outer = square(&mut map, 0.0, 0.0, 10.0, 10.0);
    let inner = square(&mut map, 2.0, 2.0, 8.0, 8.0);
    let inner_face = map.face(inner[0]);

    let removal = map.remove_edge(outer[0]);
    assert_eq!(removal.face, UNBOUNDED);
    assert!(map.contains_face(inner_face));
    assert_eq!(map.face_area(inner_face), 36.0);
    assert_eq!(map.holes(UNBOUNDED).len(), 2);
    map.validate_planar().unwrap();
}
