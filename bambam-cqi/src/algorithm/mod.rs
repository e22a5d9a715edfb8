pub mod offset;
pub mod reprojection;
pub mod sampling;
pub mod sidepath;
pub mod topology;
