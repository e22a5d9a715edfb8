use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the stages of a cycling quality index run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Load,
    Exclude,
    Clean,
    Sample,
    Sidepath,
    Offset,
    Score,
    Lts,
    Slope,
    Write,
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineStage::Load => "load",
            PipelineStage::Exclude => "exclude",
            PipelineStage::Clean => "clean",
            PipelineStage::Sample => "sample",
            PipelineStage::Sidepath => "sidepath",
            PipelineStage::Offset => "offset",
            PipelineStage::Score => "score",
            PipelineStage::Lts => "lts",
            PipelineStage::Slope => "slope",
            PipelineStage::Write => "write",
        };
        write!(f, "{s}")
    }
}
