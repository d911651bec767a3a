//! Merging one map into another with attribute propagation.

use std::collections::BTreeSet;

use ahash::AHashMap;
use anyhow::{Context, Result};
use geograph::{FaceId, HalfEdgeId, UNBOUNDED};
use log::{debug, warn};
use smallvec::SmallVec;

use crate::config::MapContext;
use crate::integrate::topology_integrate;
use crate::map::{Arrangement, EdgeData, FaceData, TerrainType};

/// How [`merge`] resolves attributes that both maps define.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Source attributes overwrite destination attributes unconditionally.
    pub force_props:    bool,
    /// Both maps were already integrated against each other.
    pub pre_integrated: bool,
}

/// Destination pieces covering each source half-edge, in source direction.
type EdgeMap = AHashMap<HalfEdgeId, SmallVec<[HalfEdgeId; 2]>>;

/// Copy every edge of `src` into `dst` and write the classification of every
/// attributed source face onto the destination faces it covers.
///
/// Road segments and edge params are appended onto the destination's
/// dominant piece.  Terrain is written when forced or when the destination
/// face is still natural; area features when forced or when the destination
/// has none.  Returns every destination face written to.
pub fn merge(
    dst:  &mut Arrangement,
    src:  &mut Arrangement,
    opts: MergeOptions,
    ctx:  &MapContext,
) -> Result<BTreeSet<FaceId>> {
    if !opts.pre_integrated {
        let stats = topology_integrate(dst, src, &ctx.tolerances);
        debug!("merge integration: {stats:?}");
    }

    let mut edge_map: EdgeMap = AHashMap::new();
    let sources: Vec<HalfEdgeId> = src.dominant_half_edges().collect();
    for s in sources {
        let (p, q) = (src.source_point(s), src.target_point(s));
        let pieces = dst.insert_edge(p, q)
            .with_context(|| format!("failed to merge edge {p:?} -> {q:?}"))?
            .edges;

        let data = src.edge_data(s);
        for &d in &pieces {
            append_edge_data(dst, d, data, opts.force_props);
        }
        edge_map.insert(src.twin(s), pieces.iter().rev().map(|&d| dst.twin(d)).collect());
        edge_map.insert(s, pieces.into_iter().collect());
    }

    let mut touched = BTreeSet::new();
    let attributed: Vec<FaceId> = src.bounded_faces()
        .filter(|&f| src.face_data(f).is_attributed())
        .collect();
    for f in attributed {
        let fence: Vec<HalfEdgeId> = src.edges_of_face(f).iter()
            .flat_map(|h| edge_map.get(h).into_iter().flatten().copied())
            .collect();
        let mut covered = dst.faces_of_edges(fence);
        if covered.remove(&UNBOUNDED) {
            warn!("source face {f} maps onto an open region; skipping the unbounded face");
        }
        let data = src.face_data(f).clone();
        for g in covered {
            copy_face_data(dst.face_data_mut(g), &data, opts.force_props);
            touched.insert(g);
        }
    }

    debug!("merged {} edges, {} faces touched", edge_map.len() / 2, touched.len());
    Ok(touched)
}

/// Append source edge data to the destination piece `d`, which runs in the
/// source edge's dominant direction.
fn append_edge_data(dst: &mut Arrangement, d: HalfEdgeId, data: &EdgeData, force: bool) {
    let forward = dst.is_dominant(d);
    let target = dst.edge_data_mut(d);

    for seg in &data.segments {
        let seg = if forward { seg.clone() } else { seg.reversed() };
        if !target.segments.contains(&seg) { target.segments.push(seg); }
    }
    for (&k, &v) in &data.params {
        if force || !target.params.contains_key(&k) { target.params.insert(k, v); }
    }
    if force || target.transition == 0 { target.transition = data.transition.max(target.transition); }
}

fn copy_face_data(target: &mut FaceData, data: &FaceData, force: bool) {
    if force || target.terrain == TerrainType::NATURAL {
        target.terrain = data.terrain;
        target.overlay = data.overlay;
        target.rotation_deg = data.rotation_deg;
    }
    if force || target.area_feature.is_none() {
        if data.area_feature.is_some() { target.area_feature = data.area_feature.clone(); }
    }
    for (&k, &v) in &data.params {
        if force || !target.params.contains_key(&k) { target.params.insert(k, v); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::AreaFeature;

    #[test]
    fn terrain_only_overwrites_natural_unless_forced() {
        let urban = FaceData::with_terrain(TerrainType(12));
        let mut target = FaceData::water();
        copy_face_data(&mut target, &urban, false);
        assert_eq!(target.terrain, TerrainType::WATER);
        copy_face_data(&mut target, &urban, true);
        assert_eq!(target.terrain, TerrainType(12));

        let mut target = FaceData::default();
        copy_face_data(&mut target, &urban, false);
        assert_eq!(target.terrain, TerrainType(12));
    }

    #[test]
    fn area_feature_kept_unless_forced() {
        let park = |feature| FaceData {
            area_feature: Some(AreaFeature { feature, ..Default::default() }),
            ..FaceData::default()
        };
        let mut target = park(1);
        copy_face_data(&mut target, &park(2), false);
        assert_eq!(target.area_feature.as_ref().map(|a| a.feature), Some(1));
        copy_face_data(&mut target, &park(2), true);
        assert_eq!(target.area_feature.as_ref().map(|a| a.feature), Some(2));
    }
}
