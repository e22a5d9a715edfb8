use crate::model::network::{CqiError, Segment};
use geo::{BoundingRect, Distance, Euclidean, Point};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use wkt::ToWkt;

pub type IndexedSegment = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// spatial index over segment bounding rectangles. candidates from the tree are
/// confirmed against the exact segment geometry.
pub struct SegmentIndex<'a> {
    segments: &'a [Segment],
    rtree: RTree<IndexedSegment>,
}

impl<'a> SegmentIndex<'a> {
    pub fn new(segments: &'a [Segment]) -> Result<SegmentIndex<'a>, CqiError> {
        let entries = segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| {
                let rect = segment.linestring.bounding_rect().ok_or_else(|| {
                    CqiError::InternalError(format!(
                        "cannot get bounds of segment {}: '{}'",
                        segment.id,
                        segment.linestring.to_wkt()
                    ))
                })?;
                let envelope = Rectangle::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                );
                Ok(GeomWithData::new(envelope, idx))
            })
            .collect::<Result<Vec<_>, CqiError>>()?;
        Ok(SegmentIndex {
            segments,
            rtree: RTree::bulk_load(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    /// positions of all segments whose geometry lies within `radius` of `point`,
    /// in ascending order.
    pub fn within_distance(&self, point: &Point<f64>, radius: f64) -> Vec<usize> {
        let query = AABB::from_corners(
            [point.x() - radius, point.y() - radius],
            [point.x() + radius, point.y() + radius],
        );
        let mut found: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&query)
            .map(|obj| obj.data)
            .filter(|idx| Euclidean.distance(point, &self.segments[*idx].linestring) <= radius)
            .collect();
        found.sort_unstable();
        found
    }
}
