use geo::Coord;
use geograph::{Change, Dcel, DcelError, FaceId, UNBOUNDED};

type Map = Dcel<u32, u8>;

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Coord<f64>> {
    vec![c(x0, y0), c(x1, y0), c(x1, y1), c(x0, y1)]
}

/// One bounded face `0,0 - 4,4`.
fn unit_square() -> (Map, FaceId) {
    let mut map = Map::new();
    let ring = map.insert_ring(&square(0.0, 0.0, 4.0, 4.0)).unwrap();
    let face = map.face(ring[0]);
    (map, face)
}

#[test]
fn square_has_one_bounded_face() {
    let (map, face) = unit_square();
    assert_eq!(map.num_vertices(), 4);
    assert_eq!(map.num_edges(), 4);
    assert_eq!(map.num_faces(), 2);
    assert_ne!(face, UNBOUNDED);
    assert_eq!(map.face_area(face), 16.0);
    assert_eq!(map.holes(UNBOUNDED).len(), 1);
    map.validate_planar().unwrap();
}

#[test]
fn ring_edges_run_in_ring_order() {
    let mut map = Map::new();
    let pts = square(0.0, 0.0, 4.0, 4.0);
    let ring = map.insert_ring(&pts).unwrap();
    assert_eq!(ring.len(), 4);
    for (i, &h) in ring.iter().enumerate() {
        assert_eq!(map.source_point(h), pts[i]);
        assert!(map.is_dominant(h));
    }
    // A counter-clockwise ring has its inside on the left.
    assert_ne!(map.face(ring[0]), UNBOUNDED);
    assert_eq!(map.face(map.twin(ring[0])), UNBOUNDED);
}

#[test]
fn reinserting_an_edge_returns_it() {
    let (mut map, _) = unit_square();
    let before = map.num_half_edges();
    let ins = map.insert_edge(c(4.0, 0.0), c(0.0, 0.0)).unwrap();
    assert_eq!(ins.edges.len(), 1);
    assert!(ins.changes.is_empty());
    assert_eq!(map.source_point(ins.edges[0]), c(4.0, 0.0));
    assert_eq!(map.num_half_edges(), before);
}

#[test]
fn zero_length_segment_is_rejected() {
    let mut map = Map::new();
    let err = map.insert_edge(c(1.0, 1.0), c(1.0, 1.0)).unwrap_err();
    assert_eq!(err, DcelError::DegenerateSegment { x: 1.0, y: 1.0 });
    assert!(matches!(map.insert_ring(&[c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)]), Err(DcelError::DegenerateRing(2))));
}

#[test]
fn diagonal_splits_face_and_copies_attributes() {
    let (mut map, face) = unit_square();
    *map.face_data_mut(face) = 7;

    let ins = map.insert_edge(c(0.0, 0.0), c(4.0, 4.0)).unwrap();
    let created: Vec<FaceId> = ins.new_faces().collect();
    assert_eq!(created.len(), 1);
    assert!(matches!(ins.changes[1], Change::FaceCreated { parent, .. } if parent == face));

    let h = ins.edges[0];
    let (left, right) = (map.face(h), map.face(map.twin(h)));
    assert_ne!(left, right);
    assert_eq!(map.face_area(left), 8.0);
    assert_eq!(map.face_area(right), 8.0);
    assert_eq!(*map.face_data(created[0]), 7);
    map.validate_planar().unwrap();
}

#[test]
fn endpoints_on_edges_split_them() {
    let (mut map, _) = unit_square();
    let ins = map.insert_edge(c(2.0, 0.0), c(2.0, 4.0)).unwrap();

    let splits = ins.changes.iter().filter(|c| matches!(c, Change::EdgeSplit { .. })).count();
    assert_eq!(splits, 2);
    assert_eq!(map.num_vertices(), 6);
    assert_eq!(map.num_edges(), 7);
    assert_eq!(map.num_faces(), 3);
    map.validate_planar().unwrap();
}

#[test]
fn segment_through_vertices_is_cut_into_pieces() {
    let (mut map, _) = unit_square();
    let ins = map.insert_edge(c(-2.0, -2.0), c(6.0, 6.0)).unwrap();

    assert_eq!(ins.edges.len(), 3);
    assert_eq!(map.source_point(ins.edges[1]), c(0.0, 0.0));
    assert_eq!(map.target_point(ins.edges[1]), c(4.0, 4.0));
    assert_eq!(map.num_faces(), 3);
    map.validate_planar().unwrap();
}

#[test]
fn nested_rings_in_either_order() {
    for outer_first in [true, false] {
        let mut map = Map::new();
        let (outer, inner) = (square(0.0, 0.0, 10.0, 10.0), square(2.0, 2.0, 8.0, 8.0));
        let (first, second) = if outer_first { (&outer, &inner) } else { (&inner, &outer) };
        map.insert_ring(first).unwrap();
        map.insert_ring(second).unwrap();

        let mut areas: Vec<f64> = map.bounded_faces().map(|f| map.face_area(f)).collect();
        areas.sort_by(f64::total_cmp);
        assert_eq!(areas, vec![36.0, 64.0]);

        let annulus = map.bounded_faces().find(|&f| map.face_area(f) == 64.0).unwrap();
        assert_eq!(map.holes(annulus).len(), 1);
        assert_eq!(map.holes(UNBOUNDED).len(), 1);
        map.validate_planar().unwrap();
    }
}

#[test]
fn locate_face_finds_the_innermost() {
    let mut map = Map::new();
    map.insert_ring(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
    let inner = map.insert_ring(&square(2.0, 2.0, 8.0, 8.0)).unwrap();
    let inner_face = map.face(inner[0]);

    assert_eq!(map.locate_face(c(5.0, 5.0)), inner_face);
    assert_eq!(map.locate_face(c(20.0, 5.0)), UNBOUNDED);
    let annulus = map.locate_face(c(1.0, 1.0));
    assert_ne!(annulus, inner_face);
    assert_ne!(annulus, UNBOUNDED);
}

#[test]
fn antenna_stays_inside_its_face() {
    let (mut map, face) = unit_square();
    map.insert_edge(c(4.0, 2.0), c(2.0, 2.0)).unwrap();

    assert_eq!(map.num_faces(), 2);
    let outer = map.outer_ccb(face).unwrap();
    assert_eq!(map.ccb(outer).count(), 7);
    assert_eq!(map.face_area(face), 16.0);
    map.validate_planar().unwrap();
}

#[test]
fn antenna_drawn_towards_the_boundary() {
    let (mut map, face) = unit_square();
    let ins = map.insert_edge(c(2.0, 2.0), c(4.0, 2.0)).unwrap();

    // The new edge keeps the direction it was drawn in and owns the payload.
    assert_eq!(ins.edges.len(), 1);
    assert!(matches!(ins.changes[0], Change::EdgeSplit { .. }));
    let h = ins.edges[0];
    assert_eq!(map.source_point(h), c(2.0, 2.0));
    assert_eq!(map.target_point(h), c(4.0, 2.0));
    assert!(map.is_dominant(h));
    assert_eq!(map.face(h), face);
    assert_eq!(map.num_faces(), 2);
    map.validate_planar().unwrap();
}

#[test]
fn floating_edge_becomes_a_hole() {
    let (mut map, face) = unit_square();
    let ins = map.insert_edge(c(1.0, 1.0), c(3.0, 2.0)).unwrap();
    assert_eq!(map.face(ins.edges[0]), face);
    assert_eq!(map.holes(face).len(), 1);

    // Hooking it to the boundary folds the hole into the outer cycle.
    map.insert_edge(c(0.0, 0.0), c(1.0, 1.0)).unwrap();
    assert!(map.holes(face).is_empty());
    map.validate_planar().unwrap();
}

#[test]
fn vertex_star_and_degree() {
    let (mut map, _) = unit_square();
    map.insert_edge(c(0.0, 0.0), c(4.0, 4.0)).unwrap();
    let corner = map.locate_vertex(c(0.0, 0.0)).unwrap();
    assert_eq!(map.degree(corner), 3);
    assert!(map.vertex_star(corner).all(|h| map.origin(h) == corner));
    assert_eq!(map.bounds().unwrap().max(), c(4.0, 4.0));
}
