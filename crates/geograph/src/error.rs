use thiserror::Error;

use crate::dcel::{FaceId, HalfEdgeId, VertexId};

/// Recoverable failures and invariant violations reported by the arrangement.
///
/// Structural misuse (stale ids, ids from another arrangement) is not an
/// error value: it panics at the point of use.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DcelError {
    /// Both endpoints of a segment are the same point.
    #[error("degenerate segment: both endpoints at ({x}, {y})")]
    DegenerateSegment { x: f64, y: f64 },
    /// A ring needs at least three distinct points.
    #[error("ring has {0} distinct points, need at least 3")]
    DegenerateRing(usize),
    /// `twin(twin(e)) != e` or `twin(e) == e`.
    #[error("{0}: broken twin link")]
    BrokenTwin(HalfEdgeId),
    /// `prev(next(e)) != e`.
    #[error("{0}: next/prev links disagree")]
    BrokenNext(HalfEdgeId),
    /// A half-edge's face differs from the face of its successor.
    #[error("{0}: face differs from the rest of its boundary cycle")]
    FaceMismatch(HalfEdgeId),
    /// Neither or both half-edges of a pair are dominant.
    #[error("{0}: dominance flag is not exclusive with its twin")]
    Dominance(HalfEdgeId),
    /// A vertex's representative does not leave from it, or it is isolated.
    #[error("{0}: bad representative half-edge")]
    VertexRep(VertexId),
    /// The vertex index disagrees with the vertex arena.
    #[error("{0}: vertex index out of sync")]
    Locator(VertexId),
    /// The edge R-tree disagrees with the half-edge arena.
    #[error("edge index out of sync")]
    EdgeIndex,
    /// No gap between the edges at a vertex opens towards the new segment.
    #[error("no wedge at {vertex} opens towards ({x}, {y})")]
    NoWedge { vertex: VertexId, x: f64, y: f64 },
    /// A face's recorded cycles do not own it, or an outer cycle is not counter-clockwise.
    #[error("{0}: inconsistent boundary cycles")]
    FaceCycles(FaceId),
    /// Some half-edge is not reachable from any face record.
    #[error("{0}: not on any recorded boundary cycle")]
    Orphan(HalfEdgeId),
    /// Two edges cross without sharing a vertex.
    #[error("{0} and {1} cross")]
    Crossing(HalfEdgeId, HalfEdgeId),
}
