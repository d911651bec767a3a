mod bbox;

use geo::Coord;
use geograph::geom::{cross, dot};

pub(crate) use bbox::{SegmentBox, SortedBoxes};

/// Unit vector along `v`, or `None` for the zero vector.
#[inline]
pub(crate) fn normalize(v: Coord<f64>) -> Option<Coord<f64>> {
    let len = dot(v, v).sqrt();
    (len > 0.0).then(|| v / len)
}

/// `v` turned a quarter counter-clockwise: the left-hand normal.
#[inline]
pub(crate) fn left_normal(v: Coord<f64>) -> Coord<f64> { Coord { x: -v.y, y: v.x } }

/// Intersection of the infinite lines `p + s·u` and `q + t·v`, or `None`
/// when they are parallel.
pub(crate) fn intersect_lines(p: Coord<f64>, u: Coord<f64>, q: Coord<f64>, v: Coord<f64>) -> Option<Coord<f64>> {
    let denom = cross(u, v);
    if denom == 0.0 { return None; }
    let s = cross(q - p, v) / denom;
    let hit = p + u * s;
    (hit.x.is_finite() && hit.y.is_finite()).then_some(hit)
}

/// Midpoint of two points.
#[inline]
pub(crate) fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> { (a + b) * 0.5 }
