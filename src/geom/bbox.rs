use geo::Rect;
use rstar::{RTreeObject, AABB};

use geograph::geom::rects_overlap;

/// A bounding box in an R-tree, associated with an edge by id.
#[derive(Debug, Clone)]
pub(crate) struct SegmentBox<I> {
    idx:  I,
    bbox: Rect<f64>,
}

impl<I: Copy> SegmentBox<I> {
    pub(crate) fn new(idx: I, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the id of the corresponding edge.
    #[inline] pub(crate) fn idx(&self) -> I { self.idx }
}

impl<I> RTreeObject for SegmentBox<I> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Edge boxes sorted by their lower y bound, split into short and long
/// edges so a query only scans a narrow band of the short ones.
#[derive(Debug, Clone)]
pub(crate) struct SortedBoxes<I> {
    short:  Vec<SegmentBox<I>>,
    long:   Vec<SegmentBox<I>>,
    cutoff: f64,
}

impl<I: Copy> SortedBoxes<I> {
    /// Boxes smaller than `cutoff` in both axes count as short.
    pub(crate) fn new(boxes: impl IntoIterator<Item = SegmentBox<I>>, cutoff: f64) -> Self {
        let (mut short, mut long): (Vec<_>, Vec<_>) = boxes.into_iter()
            .partition(|b| b.bbox.width() < cutoff && b.bbox.height() < cutoff);
        short.sort_by(|a, b| a.bbox.min().y.total_cmp(&b.bbox.min().y));
        long.sort_by(|a, b| a.bbox.min().y.total_cmp(&b.bbox.min().y));
        Self { short, long, cutoff }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.short.len() + self.long.len() }

    /// Ids of every box overlapping `query`.
    pub(crate) fn query<'a>(&'a self, query: &'a Rect<f64>) -> impl Iterator<Item = I> + 'a {
        // A short box starting below this cannot reach the query.
        let lo = query.min().y - self.cutoff;
        let hi = query.max().y;
        let start = self.short.partition_point(|b| b.bbox.min().y < lo);
        let end = self.short.partition_point(|b| b.bbox.min().y <= hi);
        let long_end = self.long.partition_point(|b| b.bbox.min().y <= hi);

        self.short[start..end.max(start)].iter()
            .chain(self.long[..long_end].iter())
            .filter(move |b| rects_overlap(&b.bbox, query))
            .map(|b| b.idx)
    }
}
