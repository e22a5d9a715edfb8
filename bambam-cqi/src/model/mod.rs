mod cqi_cli_error;
pub mod network;

pub use cqi_cli_error::CqiCliError;
