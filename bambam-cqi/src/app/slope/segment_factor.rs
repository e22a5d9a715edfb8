use crate::model::network::Segment;

/// the slope attributes of one segment: the aggregated slope in percent and
/// its multiplicative factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeFactor {
    pub proc_slope: f64,
    pub factor: f64,
}

/// a pure per-segment factor. implementations hold no state that changes
/// between calls.
pub trait SegmentFactor: Send + Sync {
    fn segment_factor(&self, segment: &Segment) -> Option<SlopeFactor>;
}
