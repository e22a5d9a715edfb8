use super::PipelineStage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CqiError {
    #[error("invalid CQI configuration: {0}")]
    ConfigurationError(String),
    #[error("invalid schema in source '{source_name}': {message}")]
    SchemaError {
        source_name: String,
        message: String,
    },
    #[error("stage '{stage}' failed: {error}")]
    StageFailed {
        stage: PipelineStage,
        error: Box<CqiError>,
    },
    #[error("failure reading GeoJSON from {0}: {1}")]
    GeoJsonError(String, geojson::Error),
    #[error("failure writing to file {0}: {1}")]
    CsvWriteError(String, csv::Error),
    #[error("failure accessing file {0}: {1}")]
    IoError(String, std::io::Error),
    #[error("{0}")]
    InternalError(String),
}

impl CqiError {
    /// tags this error with the pipeline stage where it occurred. an error that
    /// already carries a stage keeps its original stage.
    pub fn in_stage(self, stage: PipelineStage) -> CqiError {
        match self {
            CqiError::StageFailed { .. } => self,
            other => CqiError::StageFailed {
                stage,
                error: Box::new(other),
            },
        }
    }

    /// the stage that failed, if known.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            CqiError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
