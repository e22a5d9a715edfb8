mod cqi_configuration;

pub use cqi_configuration::CqiConfiguration;
