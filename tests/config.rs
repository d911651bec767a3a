use geo::Coord;
use scenery_map::{MapContext, Tolerances, UtmZone};

#[test]
fn tolerances_round_trip_through_json() {
    let tol = Tolerances { bbox_slop: 2e-5, max_cleanup_passes: 8, ..Default::default() };
    let json = serde_json::to_string(&tol).unwrap();
    let back: Tolerances = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tol);
}

#[test]
fn missing_tolerances_take_defaults() {
    let tol: Tolerances = serde_json::from_str(r#"{ "inset_pinch_dot": -0.7 }"#).unwrap();
    assert_eq!(tol.inset_pinch_dot, -0.7);
    assert_eq!(tol.bbox_slop, Tolerances::default().bbox_slop);
    assert_eq!(tol.max_cleanup_passes, Tolerances::default().max_cleanup_passes);
}

#[test]
fn utm_projection_round_trips() {
    let mut ctx = MapContext::geographic(Tolerances::default());
    let points = vec![Coord { x: 10.0, y: 50.0 }, Coord { x: 10.01, y: 50.01 }];

    let (zone, meters) = ctx.to_utm(&points).unwrap();
    assert_eq!(zone, UtmZone { zone: 32, south: false });
    // 0.01 degrees of latitude is a little over a kilometre.
    let dy = meters[1].y - meters[0].y;
    assert!(dy > 1090.0 && dy < 1140.0, "{dy}");

    let back = ctx.from_utm(zone, &meters).unwrap();
    for (p, q) in points.iter().zip(&back) {
        assert!((p.x - q.x).abs() < 1e-7 && (p.y - q.y).abs() < 1e-7, "{p:?} {q:?}");
    }

    // A second call reuses the cached zone.
    ctx.to_utm(&points).unwrap();
    assert_eq!(ctx.cached_zones(), 1);
    ctx.to_utm(&[Coord { x: -122.4, y: 37.8 }]).unwrap();
    assert_eq!(ctx.cached_zones(), 2);
}

#[test]
fn projecting_nothing_is_an_error() {
    let mut ctx = MapContext::geographic(Tolerances::default());
    assert!(ctx.to_utm(&[]).is_err());
}
