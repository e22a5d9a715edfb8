use super::SegmentId;
use geo::LineString;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSide {
    Left,
    Right,
}

impl OffsetSide {
    /// sign applied to the left-hand normal of the segment direction.
    pub fn sign(&self) -> f64 {
        match self {
            OffsetSide::Left => 1.0,
            OffsetSide::Right => -1.0,
        }
    }
}

impl Display for OffsetSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OffsetSide::Left => write!(f, "left"),
            OffsetSide::Right => write!(f, "right"),
        }
    }
}

/// a line parallel to a segment, kept apart from the segment table and
/// correlated to it by (segment id, side).
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetLine {
    pub segment_id: SegmentId,
    pub side: OffsetSide,
    pub linestring: LineString<f64>,
}
