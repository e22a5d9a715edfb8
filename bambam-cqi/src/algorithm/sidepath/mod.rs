mod segment_index;
mod self_match_policy;
mod sidepath_ops;

pub use segment_index::SegmentIndex;
pub use self_match_policy::SelfMatchPolicy;
pub use sidepath_ops::detect_sidepaths;
