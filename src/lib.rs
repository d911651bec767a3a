#![doc = "Scenery map arrangement engine"]
mod config;
mod crop;
mod error;
mod geom;
mod integrate;
mod inset;
mod map;
mod merge;
mod overlay;
mod simplify;
mod water;

#[doc(inline)]
pub use geograph::{
    exchange_subgraph, Change, Dcel, DcelError, Exchange, FaceId, HalfEdgeId, Insertion, Removal, VertexId,
    UNBOUNDED,
};

#[doc(inline)]
pub use config::{MapContext, Tolerances, UtmZone};

#[doc(inline)]
pub use error::{InsetError, MapError};

#[doc(inline)]
pub use map::{
    add_polygon, calc_bounding_box, insert_ring_integrated, is_water_face, AreaFeature, Arrangement, EdgeData,
    FaceData, NetworkSegment, ParamMap, TerrainType, IS_RIVER, MUST_BURN,
};

#[doc(inline)]
pub use integrate::{integrate_ring, topology_integrate, IntegrateStats};

#[doc(inline)]
pub use crop::{crop, crop_to_box, uncrop, Crop};

#[doc(inline)]
pub use overlay::{overlay, Overlay};

#[doc(inline)]
pub use merge::{merge, MergeOptions};

#[doc(inline)]
pub use inset::{inset_face, inset_ring, InsetOutcome, InsetWidth};

#[doc(inline)]
pub use water::{clean_face, connected_wet_faces, is_adjacent_water, reduce_to_water_bodies, remove_unbounded_water};

#[doc(inline)]
pub use simplify::simplify_map;

/// Geometric primitives of the arrangement.
pub use geograph::geom as primitives;
