//! Geometric primitives shared by the arrangement and the map algorithms.
//!
//! Orientation uses `geo`'s robust adaptive-precision kernel, so exact
//! collinearity answers are trustworthy.  Everything else is plain `f64`.

use geo::kernels::{Kernel, Orientation, RobustKernel};
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, Rect};

/// Orientation of `r` relative to the directed line `p -> q`.
#[inline]
pub fn orient(p: Coord<f64>, q: Coord<f64>, r: Coord<f64>) -> Orientation {
    RobustKernel::orient2d(p, q, r)
}

#[inline]
pub fn is_left_turn(p: Coord<f64>, q: Coord<f64>, r: Coord<f64>) -> bool {
    orient(p, q, r) == Orientation::CounterClockwise
}

#[inline]
pub fn squared_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dx * dx + dy * dy
}

#[inline]
pub fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 { a.x * b.x + a.y * b.y }

#[inline]
pub fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 { a.x * b.y - a.y * b.x }

/// Axis-aligned box of a segment.
#[inline]
pub fn segment_bbox(a: Coord<f64>, b: Coord<f64>) -> Rect<f64> { Rect::new(a, b) }

/// True if the closed boxes overlap.
#[inline]
pub fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && b.min().x <= a.max().x &&
    a.min().y <= b.max().y && b.min().y <= a.max().y
}

/// Grow a box by `slop` on every side.
#[inline]
pub fn expand_rect(r: &Rect<f64>, slop: f64) -> Rect<f64> {
    Rect::new(
        Coord { x: r.min().x - slop, y: r.min().y - slop },
        Coord { x: r.max().x + slop, y: r.max().y + slop },
    )
}

/// `p` lies exactly on segment `a-b`, excluding its endpoints.
pub fn on_open_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    if p == a || p == b { return false; }
    orient(a, b, p) == Orientation::Collinear
        && p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// The single crossing point of two segments, if they meet in exactly one
/// point.  Overlapping collinear segments report `None`.
pub fn segment_intersection(a: Line<f64>, b: Line<f64>) -> Option<Coord<f64>> {
    match line_intersection(a, b)? {
        LineIntersection::SinglePoint { intersection, .. } => Some(intersection),
        LineIntersection::Collinear { .. } => None,
    }
}

/// True if two segments share any point that is not an endpoint of both.
///
/// Segments that only touch at a common endpoint are fine; a T-junction
/// (endpoint of one in the interior of the other) or a proper crossing is not.
pub fn segments_cross(a: Line<f64>, b: Line<f64>) -> bool {
    let shared = |p: Coord<f64>| p == b.start || p == b.end;
    match line_intersection(a, b) {
        None => false,
        Some(LineIntersection::SinglePoint { intersection, .. }) => {
            !((intersection == a.start || intersection == a.end) && shared(intersection))
        }
        Some(LineIntersection::Collinear { intersection }) => {
            // An overlap that degenerates to a shared endpoint is a touch.
            !(intersection.start == intersection.end && shared(intersection.start)
                && (intersection.start == a.start || intersection.start == a.end))
        }
    }
}

/// True if direction `c -> d` lies strictly inside the sector swept
/// counter-clockwise from ray `c -> u` to ray `c -> w`.  When the two rays
/// coincide the sector is the whole plane minus that ray.
pub fn in_ccw_wedge(c: Coord<f64>, u: Coord<f64>, w: Coord<f64>, d: Coord<f64>) -> bool {
    let ou_d = orient(c, u, d);
    let ow_d = orient(c, w, d);
    match orient(c, u, w) {
        Orientation::CounterClockwise => {
            ou_d == Orientation::CounterClockwise && ow_d == Orientation::Clockwise
        }
        // Reflex sector: inside unless in the closed convex complement w..u.
        Orientation::Clockwise => {
            !(ow_d != Orientation::Clockwise && ou_d != Orientation::CounterClockwise)
        }
        Orientation::Collinear if dot(u - c, w - c) > 0.0 => {
            !(ou_d == Orientation::Collinear && dot(u - c, d - c) > 0.0)
        }
        Orientation::Collinear => ou_d == Orientation::CounterClockwise,
    }
}

/// Signed area of a closed ring (counter-clockwise is positive).
pub fn signed_area(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 { return 0.0; }
    let mut sum = 0.0;
    for (i, p) in ring.iter().enumerate() {
        let q = ring[(i + 1) % ring.len()];
        sum += p.x * q.y - q.x * p.y;
    }
    sum * 0.5
}

/// Crossing-number containment test.  Points on the boundary are unspecified;
/// doubled-back spikes cancel out.
pub fn point_in_ring(p: Coord<f64>, ring: &[Coord<f64>]) -> bool {
    let mut inside = false;
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x { inside = !inside; }
        }
    }
    inside
}

/// Near-colinearity of point `p` against segment `seg`: `p` sits within
/// `sq_tol` squared distance of the supporting line and strictly inside the
/// segment's span.  Exactly horizontal and vertical segments compare
/// coordinates directly.
pub fn near_colinear(seg: Line<f64>, p: Coord<f64>, sq_tol: f64) -> bool {
    let (s, t) = (seg.start, seg.end);
    if s == t || p == s || p == t { return false; }

    if s.y == t.y {
        return p.y == s.y && p.x > s.x.min(t.x) && p.x < s.x.max(t.x);
    }
    if s.x == t.x {
        return p.x == s.x && p.y > s.y.min(t.y) && p.y < s.y.max(t.y);
    }

    // Strict box test first; it is the cheap rejection.
    if p.x <= s.x.min(t.x) || p.x >= s.x.max(t.x) ||
       p.y <= s.y.min(t.y) || p.y >= s.y.max(t.y) {
        return false;
    }

    let d = t - s;
    let len2 = dot(d, d);
    let k = dot(p - s, d) / len2;
    let foot = s + d * k;
    if foot != p && squared_distance(foot, p) >= sq_tol { return false; }

    // Inside the span from both ends.
    dot(p - s, d) > 0.0 && dot(p - t, s - t) > 0.0
}
