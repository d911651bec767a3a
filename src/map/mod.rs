mod build;
mod data;

pub use build::{add_polygon, calc_bounding_box, insert_ring_integrated};
pub use data::{
    is_water_face, AreaFeature, Arrangement, EdgeData, FaceData, NetworkSegment, ParamMap, TerrainType,
    IS_RIVER, MUST_BURN,
};
