//! Stitching one map's content into another.
//!
//! Each outermost boundary of the source (a hole cycle of its unbounded
//! face) is inserted into the destination, and the region it carves there is
//! traded for the source's content by subgraph exchange.

use anyhow::{bail, Context, Result};
use geograph::{exchange_subgraph, FaceId, HalfEdgeId, UNBOUNDED};
use log::debug;

use crate::config::MapContext;
use crate::error::MapError;
use crate::integrate::topology_integrate;
use crate::map::Arrangement;

/// Result of [`overlay`].
#[derive(Debug)]
pub struct Overlay {
    /// Destination faces now holding source content.
    pub faces:     Vec<FaceId>,
    /// Destination content that was covered, left behind in the consumed source.
    pub displaced: Arrangement,
}

/// Overlay `src` onto `dst`.  Destination content under the source's
/// footprint is replaced and handed back in [`Overlay::displaced`].
pub fn overlay(dst: &mut Arrangement, mut src: Arrangement, ctx: &MapContext) -> Result<Overlay> {
    let stats = topology_integrate(dst, &mut src, &ctx.tolerances);
    debug!("overlay integration: {stats:?}");

    let mut faces = Vec::new();
    let outlines: Vec<HalfEdgeId> = src.holes(UNBOUNDED).to_vec();
    for rep in outlines {
        // Twins of the outline with real content on their left.  Antennas
        // have the unbounded face on both sides and are not boundary.
        let bounds: Vec<HalfEdgeId> = src.ccb(rep)
            .map(|h| src.twin(h))
            .filter(|&t| src.face(t) != UNBOUNDED)
            .collect();
        if bounds.is_empty() { continue; }

        let (bounds_dst, bounds_src) = stitch(dst, &mut src, &bounds)?;
        let ex = exchange_subgraph(dst, &mut src, &bounds_dst, &bounds_src);
        faces.extend(ex.faces_in_a);
    }

    debug!("overlay placed {} faces", faces.len());
    Ok(Overlay { faces, displaced: src })
}

/// Insert the source boundary into `dst`, splitting source edges wherever
/// the destination already has vertices, so the two lists line up piece by
/// piece.
fn stitch(
    dst:    &mut Arrangement,
    src:    &mut Arrangement,
    bounds: &[HalfEdgeId],
) -> Result<(Vec<HalfEdgeId>, Vec<HalfEdgeId>)> {
    let mut bounds_dst = Vec::with_capacity(bounds.len());
    let mut bounds_src = Vec::with_capacity(bounds.len());

    for &s in bounds {
        let (p, q) = (src.source_point(s), src.target_point(s));
        let pieces = dst.insert_edge(p, q)
            .with_context(|| format!("failed to insert overlay edge {p:?} -> {q:?}"))?
            .edges;

        let mut cur = s;
        for (i, &d) in pieces.iter().enumerate() {
            if i > 0 {
                let cut = dst.source_point(d);
                if src.locate_vertex(cut).is_some() {
                    bail!(MapError::Misaligned { x: cut.x, y: cut.y });
                }
                src.split_edge(cur, cut);
                cur = src.next(cur);
            }
            bounds_dst.push(d);
        }
        // Pieces of `s` in order: `s` itself, then each split-off successor.
        let mut piece = s;
        for _ in 0..pieces.len() {
            bounds_src.push(piece);
            piece = src.next(piece);
        }
    }
    Ok((bounds_dst, bounds_src))
}
