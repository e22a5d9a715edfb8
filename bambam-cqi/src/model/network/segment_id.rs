use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// dense key of a segment within one loaded collection. keys are reassigned
/// whenever collections are merged.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash,
)]
pub struct SegmentId(pub usize);

impl Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
