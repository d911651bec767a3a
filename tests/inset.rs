use std::f64::consts::PI;

use ahash::AHashMap;
use geo::Coord;
use proptest::prelude::*;
use scenery_map::primitives::{point_in_ring, segments_cross, signed_area};
use scenery_map::{
    inset_face, inset_ring, Arrangement, FaceData, InsetError, InsetOutcome, InsetWidth, MapContext, MapError,
    TerrainType, Tolerances, UNBOUNDED,
};

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Coord<f64>> {
    vec![c(x0, y0), c(x1, y0), c(x1, y1), c(x0, y1)]
}

/// 0..10 square with an antenna from the middle of its right side to (6, 5).
fn antenna_map() -> Arrangement {
    let mut map = Arrangement::new();
    map.insert_ring(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
    map.insert_edge(c(10.0, 5.0), c(6.0, 5.0)).unwrap();
    map
}

fn ring_crosses_itself(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    let seg = |i: usize| geo::Line::new(ring[i], ring[(i + 1) % n]);
    (0..n).any(|i| {
        (i + 2..n)
            .filter(|&j| (j + 1) % n != i)
            .any(|j| segments_cross(seg(i), seg(j)))
    })
}

#[test]
fn antenna_is_bridged_by_two_points() {
    let ring = vec![
        c(0.0, 0.0), c(10.0, 0.0), c(10.0, 5.0), c(6.0, 5.0), c(10.0, 5.0), c(10.0, 10.0), c(0.0, 10.0),
    ];
    let out = inset_ring(&ring, &[1.0; 7], &Tolerances::default()).unwrap();
    assert_eq!(out, vec![vec![
        c(1.0, 1.0), c(9.0, 1.0), c(9.0, 4.0), c(5.0, 4.0), c(5.0, 6.0), c(9.0, 6.0), c(9.0, 9.0), c(1.0, 9.0),
    ]]);
}

#[test]
fn antenna_face_gets_a_band_and_a_core() {
    let mut map = antenna_map();
    let face = map.locate_face(c(2.0, 2.0));
    *map.face_data_mut(face) = FaceData::with_terrain(TerrainType(12));
    let mut ctx = MapContext::default();

    let outcome = inset_face(&mut map, face, &InsetWidth::Uniform(1.0), &FaceData::water(), &mut ctx).unwrap();
    let InsetOutcome::Inset { band, core } = outcome else { panic!("inset collapsed") };

    assert_eq!(band.len(), 1);
    assert_eq!(core.len(), 1);
    let band = *band.first().unwrap();
    let core = *core.first().unwrap();
    assert_eq!(map.face_area(core), 56.0);
    assert_eq!(map.face_area(band), 44.0);
    assert!(map.face_data(band).is_water());
    assert_eq!(map.face_data(core).terrain, TerrainType(12));
    assert_eq!(map.locate_face(c(3.0, 5.0)), core);
    assert_eq!(map.locate_face(c(9.5, 5.5)), band);
    map.validate_planar().unwrap();
}

#[test]
fn holes_are_inset_outward() {
    let mut map = Arrangement::new();
    map.insert_ring(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
    map.insert_ring(&square(4.0, 4.0, 6.0, 6.0)).unwrap();
    let face = map.locate_face(c(1.0, 1.0));
    let island = map.locate_face(c(5.0, 5.0));
    let mut ctx = MapContext::default();

    let outcome = inset_face(&mut map, face, &InsetWidth::Uniform(1.0), &FaceData::water(), &mut ctx).unwrap();
    let InsetOutcome::Inset { band, core } = outcome else { panic!("inset collapsed") };

    assert_eq!(band.len(), 2);
    assert_eq!(core.len(), 1);
    let core = *core.first().unwrap();
    assert_eq!(map.face_area(core), 48.0);
    let mut band_areas: Vec<f64> = band.iter().map(|&f| map.face_area(f)).collect();
    band_areas.sort_by(f64::total_cmp);
    assert_eq!(band_areas, vec![12.0, 36.0]);
    assert!(!map.face_data(island).is_water());
    map.validate_planar().unwrap();
}

#[test]
fn per_edge_widths() {
    let mut map = Arrangement::new();
    let ring = map.insert_ring(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
    let face = map.face(ring[0]);
    let widths: AHashMap<_, _> = ring.iter().zip([1.0, 2.0, 1.0, 3.0]).map(|(&h, w)| (h, w)).collect();
    let mut ctx = MapContext::default();

    let outcome = inset_face(&mut map, face, &InsetWidth::PerEdge(&widths), &FaceData::water(), &mut ctx).unwrap();
    let InsetOutcome::Inset { core, .. } = outcome else { panic!("inset collapsed") };
    let core = *core.first().unwrap();
    // x from 3 to 8, y from 1 to 9.
    assert_eq!(map.face_area(core), 40.0);
}

#[test]
fn missing_width_is_an_error() {
    let mut map = Arrangement::new();
    let ring = map.insert_ring(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
    let face = map.face(ring[0]);
    let widths: AHashMap<_, _> = ring[..3].iter().map(|&h| (h, 1.0)).collect();

    let err = inset_face(&mut map, face, &InsetWidth::PerEdge(&widths), &FaceData::water(), &mut MapContext::default())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<MapError>(), Some(MapError::MissingWidth(h)) if *h == ring[3]));
}

#[test]
fn unbounded_face_cannot_be_inset() {
    let mut map = antenna_map();
    let err = inset_face(&mut map, UNBOUNDED, &InsetWidth::Uniform(1.0), &FaceData::water(), &mut MapContext::default())
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<MapError>(), Some(MapError::UnboundedFace(_))));
}

#[test]
fn narrow_face_collapses_into_the_donor() {
    let mut map = Arrangement::new();
    let ring = map.insert_ring(&square(0.0, 0.0, 10.0, 1.0)).unwrap();
    let face = map.face(ring[0]);
    let edges = map.num_edges();

    let outcome = inset_face(&mut map, face, &InsetWidth::Uniform(1.0), &FaceData::water(), &mut MapContext::default())
        .unwrap();
    assert_eq!(outcome, InsetOutcome::Collapsed);
    assert!(map.face_data(face).is_water());
    assert_eq!(map.num_edges(), edges);
}

#[test]
fn overshooting_a_triangle_collapses() {
    let ring = vec![c(0.0, 0.0), c(4.0, 0.0), c(2.0, 3.0)];
    assert_eq!(inset_ring(&ring, &[2.0; 3], &Tolerances::default()), Err(InsetError::Collapsed));
}

#[test]
fn triangle_face_inset_past_its_inradius_collapses() {
    // Inradius is about 1.07.
    let mut map = Arrangement::new();
    let ring = map.insert_ring(&[c(0.0, 0.0), c(4.0, 0.0), c(2.0, 3.0)]).unwrap();
    let face = map.face(ring[0]);

    let outcome = inset_face(&mut map, face, &InsetWidth::Uniform(1.5), &FaceData::water(), &mut MapContext::default())
        .unwrap();
    assert_eq!(outcome, InsetOutcome::Collapsed);
    assert!(map.face_data(face).is_water());
    assert_eq!(map.num_edges(), 3);
    assert_eq!(map.bounded_faces().count(), 1);
}

/// Two 4 x 4 lobes joined by a 2 x 0.5 corridor.
fn dumbbell() -> Vec<Coord<f64>> {
    vec![
        c(0.0, 0.0), c(4.0, 0.0), c(4.0, 1.75), c(6.0, 1.75), c(6.0, 0.0), c(10.0, 0.0),
        c(10.0, 4.0), c(6.0, 4.0), c(6.0, 2.25), c(4.0, 2.25), c(4.0, 4.0), c(0.0, 4.0),
    ]
}

#[test]
fn pinched_ring_is_cut_at_the_neck() {
    let mut rings = inset_ring(&dumbbell(), &[0.5; 12], &Tolerances::default()).unwrap();
    assert_eq!(rings.len(), 2);
    rings.sort_by(|a, b| a[0].x.total_cmp(&b[0].x));

    for (ring, x0) in rings.iter().zip([0.5, 6.5]) {
        assert_eq!(ring.len(), 4);
        assert!((signed_area(ring) - 9.0).abs() < 1e-9);
        for p in ring {
            assert!(p.x >= x0 - 1e-9 && p.x <= x0 + 3.0 + 1e-9, "{p:?}");
            assert!(p.y >= 0.5 - 1e-9 && p.y <= 3.5 + 1e-9, "{p:?}");
        }
    }
}

#[test]
fn both_lobes_of_a_dumbbell_keep_a_core() {
    let mut map = Arrangement::new();
    map.insert_ring(&dumbbell()).unwrap();
    let face = map.locate_face(c(1.0, 1.0));
    *map.face_data_mut(face) = FaceData::with_terrain(TerrainType(12));

    let outcome = inset_face(&mut map, face, &InsetWidth::Uniform(0.5), &FaceData::water(), &mut MapContext::default())
        .unwrap();
    let InsetOutcome::Inset { band, core } = outcome else { panic!("inset collapsed") };

    assert_eq!(band.len(), 1);
    assert_eq!(core.len(), 2);
    let band = *band.first().unwrap();
    assert!(map.face_data(band).is_water());
    assert!((map.face_area(band) - 15.0).abs() < 1e-9);
    assert_eq!(map.locate_face(c(5.0, 2.0)), band);
    for &f in &core {
        assert!((map.face_area(f) - 9.0).abs() < 1e-9);
        assert_eq!(map.face_data(f).terrain, TerrainType(12));
    }
    assert!(core.contains(&map.locate_face(c(2.0, 2.0))));
    assert!(core.contains(&map.locate_face(c(8.0, 2.0))));
    map.validate_planar().unwrap();
}

#[test]
fn hole_crowding_the_outer_boundary_collapses() {
    let mut map = Arrangement::new();
    map.insert_ring(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
    map.insert_ring(&square(1.0, 4.0, 3.0, 6.0)).unwrap();
    let face = map.locate_face(c(8.0, 8.0));

    let outcome = inset_face(&mut map, face, &InsetWidth::Uniform(1.0), &FaceData::water(), &mut MapContext::default())
        .unwrap();
    assert_eq!(outcome, InsetOutcome::Collapsed);
}

#[test]
fn geographic_inset_in_meters() {
    let mut map = Arrangement::new();
    let ring = map.insert_ring(&square(10.0, 50.0, 10.01, 50.01)).unwrap();
    let face = map.face(ring[0]);
    let mut ctx = MapContext::geographic(Tolerances::default());

    let outcome = inset_face(&mut map, face, &InsetWidth::Uniform(100.0), &FaceData::water(), &mut ctx).unwrap();
    let InsetOutcome::Inset { core, .. } = outcome else { panic!("inset collapsed") };
    assert_eq!(ctx.cached_zones(), 1);

    // 100 m is roughly 0.0014 degrees of longitude and 0.0009 of latitude here.
    let core = *core.first().unwrap();
    let outer = map.outer_ccb(core).unwrap();
    for p in map.cycle_points(outer) {
        assert!(p.x > 10.001 && p.x < 10.009, "{p:?}");
        assert!(p.y > 50.0005 && p.y < 50.0095, "{p:?}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// A regular polygon inset by less than its inradius stays a simple ring
    /// strictly inside the original; inset by more, it collapses.
    #[test]
    fn convex_inset_stays_inside(
        sides in 3usize..12,
        radius in 1.0f64..100.0,
        phase in 0.0f64..(2.0 * PI),
        center in (-50.0f64..50.0, -50.0f64..50.0),
        fraction in prop_oneof![0.05f64..0.9, 1.1f64..3.0],
    ) {
        let ring: Vec<Coord<f64>> = (0..sides)
            .map(|k| {
                let t = phase + 2.0 * PI * k as f64 / sides as f64;
                c(center.0 + radius * t.cos(), center.1 + radius * t.sin())
            })
            .collect();
        let inradius = radius * (PI / sides as f64).cos();
        let d = fraction * inradius;

        let result = inset_ring(&ring, &vec![d; sides], &Tolerances::default());
        if fraction > 1.0 {
            prop_assert!(result.is_err(), "{:?}", result);
        } else {
            let out = result.unwrap();
            prop_assert_eq!(out.len(), 1);
            let out = &out[0];
            prop_assert_eq!(out.len(), sides);
            prop_assert!(signed_area(out) > 0.0);
            prop_assert!(signed_area(out) < signed_area(&ring));
            prop_assert!(!ring_crosses_itself(out));
            for p in out {
                prop_assert!(point_in_ring(*p, &ring));
            }
        }
    }
}
