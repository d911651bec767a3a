use geograph::{DcelError, FaceId, HalfEdgeId};
use thiserror::Error;

/// Why a ring could not be inset.  None of these are fatal for a map: the
/// face-level caller turns them into a collapsed face.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InsetError {
    #[error("ring has {0} usable points, need at least 3")]
    TooFewPoints(usize),
    #[error("got {got} widths for {expected} edges")]
    WidthCount { expected: usize, got: usize },
    #[error("edges {0} and {1} pinch closer than their combined inset")]
    Pinched(usize, usize),
    #[error("inset ring collapsed")]
    Collapsed,
    #[error("inset ring intersects itself")]
    SelfIntersecting,
}

/// Failures of the map-level algorithms.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Dcel(#[from] DcelError),
    #[error(transparent)]
    Inset(#[from] InsetError),
    #[error("{0} is the unbounded face")]
    UnboundedFace(FaceId),
    #[error("no inset width given for {0}")]
    MissingWidth(HalfEdgeId),
    #[error("segment ({x}, {y}) is cut at a point that is already a vertex elsewhere")]
    Misaligned { x: f64, y: f64 },
}
