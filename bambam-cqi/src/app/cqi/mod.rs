mod attribute_ops;
mod cqi_ops;
mod cqi_pipeline;
mod cqi_run_output;
mod cqi_weights;
mod output_writer;

pub use attribute_ops::{has_physical_barrier, proc_maxspeed, BARRIER_VALUES};
pub use cqi_ops::{annotate_segment, score_collection};
pub use cqi_pipeline::CqiPipeline;
pub use cqi_run_output::{CqiRunOutput, CqiRunSummary};
pub use cqi_weights::{
    CqiWeights, DEFAULT_BARRIER_WEIGHT, DEFAULT_SIDEPATH_WEIGHT, DEFAULT_SPEED_WEIGHT, MAX_SPEED,
};
pub use output_writer::{write_output, OutputFormat};
