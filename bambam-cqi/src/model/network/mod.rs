mod cqi_error;
mod crs;
pub mod geojson_ops;
mod network_source;
mod offset_line;
mod pipeline_stage;
mod sample_point;
mod segment;
mod segment_collection;
mod segment_id;
pub mod segment_ops;
mod segment_tags;
mod stage_report;

pub use cqi_error::CqiError;
pub use crs::Crs;
pub use network_source::NetworkSource;
pub use offset_line::{OffsetLine, OffsetSide};
pub use pipeline_stage::PipelineStage;
pub use sample_point::SamplePoint;
pub use segment::Segment;
pub use segment_collection::SegmentCollection;
pub use segment_id::SegmentId;
pub use segment_tags::SegmentTags;
pub use stage_report::StageReport;
