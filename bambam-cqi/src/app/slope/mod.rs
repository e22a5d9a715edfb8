mod grid_raster_sampler;
mod raster_sampler;
mod segment_factor;
mod slope_factor_model;
mod slope_ops;
mod slope_unit;
mod stat_choice;

pub use grid_raster_sampler::GridRasterSampler;
pub use raster_sampler::RasterSampler;
pub use segment_factor::{SegmentFactor, SlopeFactor};
pub use slope_factor_model::SlopeFactorModel;
pub use slope_ops::{annotate_slope, percent_to_factor, round2};
pub use slope_unit::SlopeUnit;
pub use stat_choice::StatChoice;
