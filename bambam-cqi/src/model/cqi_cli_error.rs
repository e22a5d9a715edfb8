use super::network::CqiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CqiCliError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("cycling quality index run failed: {source}")]
    CqiError {
        #[from]
        source: CqiError,
    },
    #[error("failure reading configuration: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure decoding JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
}
