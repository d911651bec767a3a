pub mod dcel;
pub mod edit;
pub mod error;
pub mod exchange;
pub mod geom;
mod index;
pub mod insert;
pub mod topo;
pub mod validate;

pub use dcel::{Ccb, Dcel, FaceId, HalfEdgeId, VertexId, VertexStar, UNBOUNDED};
pub use edit::Removal;
pub use error::DcelError;
pub use exchange::{exchange_subgraph, Exchange};
pub use insert::{Change, Insertion};
