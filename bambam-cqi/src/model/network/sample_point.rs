use super::SegmentId;
use geo::Point;

/// a point placed along a segment during sampling. `offset` is the arc length
/// from the segment start to the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub segment_id: SegmentId,
    pub offset: f64,
    pub point: Point<f64>,
}

impl SamplePoint {
    pub fn new(segment_id: SegmentId, offset: f64, point: Point<f64>) -> SamplePoint {
        SamplePoint {
            segment_id,
            offset,
            point,
        }
    }
}
