mod sampling_ops;

pub use sampling_ops::{sample_count, sample_points, sample_segment};
