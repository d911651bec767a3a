use std::collections::BTreeMap;

use geograph::{Dcel, FaceId, UNBOUNDED};
use serde::{Deserialize, Serialize};

/// Numeric attributes keyed by parameter id.
pub type ParamMap = BTreeMap<i32, f64>;

/// Edge parameter: the edge runs along a river.
pub const IS_RIVER:  i32 = 1;
/// Edge parameter: the edge must survive simplification.
pub const MUST_BURN: i32 = 2;

/// Land class of a face.  Only the two classes the map algorithms
/// interpret are named; everything else is an opaque id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainType(pub i32);

impl TerrainType {
    /// Unclassified land.
    pub const NATURAL: Self = Self(0);
    pub const WATER:   Self = Self(1);

    #[inline] pub fn is_water(self) -> bool { self == Self::WATER }
}

/// A piece of a road (or other linear network feature) running along an edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSegment {
    pub feature:       i32,
    pub rep_type:      i32,
    pub source_height: f64,
    pub target_height: f64,
}

impl NetworkSegment {
    /// The same segment seen from the other end of the edge.
    pub fn reversed(&self) -> Self {
        Self { source_height: self.target_height, target_height: self.source_height, ..self.clone() }
    }
}

/// Payload of an undirected edge, stored on its dominant half-edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Transition (beach, border) type id.
    pub transition: i32,
    /// Network segments running along the dominant direction.
    pub segments:   Vec<NetworkSegment>,
    pub params:     ParamMap,
    /// Scratch flag for algorithms.
    #[serde(skip)]
    pub mark:       bool,
}

impl EdgeData {
    #[inline] pub fn has_roads(&self) -> bool { !self.segments.is_empty() }
    #[inline] pub fn has_param(&self, key: i32) -> bool { self.params.contains_key(&key) }
    #[inline] pub fn is_river(&self) -> bool { self.params.get(&IS_RIVER).is_some_and(|v| *v != 0.0) }
    #[inline] pub fn must_burn(&self) -> bool { self.params.get(&MUST_BURN).is_some_and(|v| *v != 0.0) }

    /// True if any segment is raised (a bridge or overpass).
    pub fn has_bridges(&self) -> bool {
        self.segments.iter().any(|s| s.source_height > 0.0 || s.target_height > 0.0)
    }
}

/// An area feature (e.g. a park, an airport) laid over a face's terrain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaFeature {
    pub feature: i32,
    pub params:  ParamMap,
}

/// Payload of a face.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    pub terrain:      TerrainType,
    /// Terrain matched as an overlay (e.g. town overlays), if any.
    pub overlay:      TerrainType,
    pub area_feature: Option<AreaFeature>,
    pub params:       ParamMap,
    /// Texture rotation in degrees.
    pub rotation_deg: i32,
}

impl FaceData {
    /// A face of the given terrain and nothing else.
    pub fn with_terrain(terrain: TerrainType) -> Self {
        Self { terrain, ..Self::default() }
    }

    pub fn water() -> Self { Self::with_terrain(TerrainType::WATER) }

    #[inline] pub fn is_water(&self) -> bool { self.terrain.is_water() }

    /// True if the face carries any classification worth propagating.
    pub fn is_attributed(&self) -> bool {
        self.terrain != TerrainType::NATURAL || self.area_feature.is_some() || !self.params.is_empty()
    }

    #[inline] pub fn terrain_match(&self, other: &Self) -> bool { self.terrain == other.terrain }

    /// Same terrain and same area feature type.
    pub fn area_match(&self, other: &Self) -> bool {
        let feature = |d: &Self| d.area_feature.as_ref().map(|a| a.feature);
        self.terrain_match(other) && feature(self) == feature(other)
    }
}

/// The map arrangement: roads and transitions on edges, land classes on faces.
pub type Arrangement = Dcel<EdgeData, FaceData>;

/// Water test that treats the unbounded face as open water.
#[inline]
pub fn is_water_face(map: &Arrangement, f: FaceId) -> bool {
    f == UNBOUNDED || map.face_data(f).is_water()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_natural_and_unattributed() {
        let face = FaceData::default();
        assert_eq!(face.terrain, TerrainType::NATURAL);
        assert!(!face.is_attributed());
        assert!(FaceData::water().is_attributed());
        assert!(!EdgeData::default().is_river());
    }

    #[test]
    fn area_match_compares_feature_type_only() {
        let mut a = FaceData::with_terrain(TerrainType(7));
        let mut b = a.clone();
        a.area_feature = Some(AreaFeature { feature: 3, params: ParamMap::new() });
        b.area_feature = Some(AreaFeature { feature: 3, params: ParamMap::from([(1, 2.0)]) });
        assert!(a.area_match(&b));
        b.area_feature = None;
        assert!(!a.area_match(&b));
    }

    #[test]
    fn unbounded_counts_as_water() {
        let map = Arrangement::new();
        assert!(is_water_face(&map, UNBOUNDED));
    }
}
