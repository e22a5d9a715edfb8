use super::PipelineStage;
use serde::Serialize;

/// record counts for one completed stage. `skipped` counts records dropped
/// because of a geometric degeneracy, not records removed by the stage's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub input: usize,
    pub output: usize,
    pub skipped: usize,
}

impl StageReport {
    pub fn new(stage: PipelineStage, input: usize, output: usize, skipped: usize) -> StageReport {
        StageReport {
            stage,
            input,
            output,
            skipped,
        }
    }

    pub fn log(&self) {
        log::info!(
            "{} stage: {} records in, {} records out",
            self.stage,
            self.input,
            self.output
        );
        if self.skipped > 0 {
            log::warn!(
                "{} stage: skipped {} of {} records with degenerate geometry",
                self.stage,
                self.skipped,
                self.input
            );
        }
    }
}
