mod reprojection_ops;
mod reprojector;
mod spherical_mercator;

pub use reprojection_ops::reproject_collection;
pub use reprojector::Reprojector;
pub use spherical_mercator::SphericalMercator;
