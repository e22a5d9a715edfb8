use crate::model::network::{OffsetLine, PipelineStage, SegmentCollection, StageReport};
use serde::Serialize;

/// record counts of every stage that ran, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CqiRunSummary {
    pub reports: Vec<StageReport>,
}

impl CqiRunSummary {
    pub fn push(&mut self, report: StageReport) {
        report.log();
        self.reports.push(report);
    }

    pub fn report(&self, stage: PipelineStage) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.stage == stage)
    }

    /// records skipped for degenerate geometry across all stages
    pub fn total_skipped(&self) -> usize {
        self.reports.iter().map(|r| r.skipped).sum()
    }
}

/// the scored segment table and the offset lines correlated to it by segment id.
#[derive(Debug, Clone)]
pub struct CqiRunOutput {
    pub segments: SegmentCollection,
    pub offsets: Vec<OffsetLine>,
    pub summary: CqiRunSummary,
}
