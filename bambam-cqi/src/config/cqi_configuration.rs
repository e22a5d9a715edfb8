use crate::{
    algorithm::sidepath::SelfMatchPolicy,
    app::{
        cqi::CqiWeights,
        slope::{SlopeUnit, StatChoice},
    },
    model::{
        network::{CqiError, Crs},
        CqiCliError,
    },
};
use serde::{Deserialize, Serialize};

/// parameters of a cycling quality index run. distances are in the units of
/// the metric CRS.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct CqiConfiguration {
    /// projected CRS all geometric stages run in
    pub crs_metric: String,
    pub point_spacing: f64,
    pub buffer_distance: f64,
    pub min_length: f64,
    pub offset_distance: f64,
    /// grid size used to match segment endpoints
    pub endpoint_tolerance: f64,
    /// upper bound on dead-end pruning passes, stopping early once nothing changes
    pub dead_end_passes: usize,
    pub sidepath_self_match: SelfMatchPolicy,
    pub weights: CqiWeights,
    pub generate_offsets: bool,
    pub compute_lts: bool,
    pub slope_unit: SlopeUnit,
    pub stat_choice: StatChoice,
    pub exclude_ids_file: Option<String>,
    pub parallelize: bool,
    pub overwrite: bool,
}

impl Default for CqiConfiguration {
    fn default() -> Self {
        Self {
            crs_metric: Crs::WEB_MERCATOR.to_string(),
            point_spacing: 20.0,
            buffer_distance: 5.0,
            min_length: 10.0,
            offset_distance: 2.0,
            endpoint_tolerance: 0.001,
            dead_end_passes: 1,
            sidepath_self_match: SelfMatchPolicy::default(),
            weights: CqiWeights::default(),
            generate_offsets: true,
            compute_lts: false,
            slope_unit: SlopeUnit::default(),
            stat_choice: StatChoice::default(),
            exclude_ids_file: None,
            parallelize: true,
            overwrite: false,
        }
    }
}

impl CqiConfiguration {
    /// the metric CRS, which must parse and must not be geographic.
    pub fn target_crs(&self) -> Result<Crs, CqiError> {
        let crs: Crs = self
            .crs_metric
            .parse()
            .map_err(|e| CqiError::ConfigurationError(format!("invalid crs_metric: {e}")))?;
        if !crs.is_metric() {
            return Err(CqiError::ConfigurationError(format!(
                "crs_metric must be a projected CRS, found geographic {crs}"
            )));
        }
        Ok(crs)
    }

    pub fn validate(&self) -> Result<(), CqiError> {
        self.target_crs()?;
        positive("point_spacing", self.point_spacing)?;
        positive("buffer_distance", self.buffer_distance)?;
        positive("offset_distance", self.offset_distance)?;
        positive("endpoint_tolerance", self.endpoint_tolerance)?;
        if !(self.min_length.is_finite() && self.min_length >= 0.0) {
            return Err(CqiError::ConfigurationError(format!(
                "min_length must be a non-negative number, found {}",
                self.min_length
            )));
        }
        if self.dead_end_passes == 0 {
            return Err(CqiError::ConfigurationError(String::from(
                "dead_end_passes must be at least 1",
            )));
        }
        self.weights.validate()
    }
}

fn positive(name: &str, value: f64) -> Result<(), CqiError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CqiError::ConfigurationError(format!(
            "{name} must be a positive number, found {value}"
        )))
    }
}

impl TryFrom<&String> for CqiConfiguration {
    type Error = CqiCliError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let conf: CqiConfiguration = if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                CqiCliError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            toml::from_str(&s).map_err(|e| {
                CqiCliError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })?
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                CqiCliError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            serde_json::from_str(&s).map_err(|e| {
                CqiCliError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })?
        } else {
            return Err(CqiCliError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )));
        };
        conf.validate()?;
        Ok(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::CqiConfiguration;
    use crate::algorithm::sidepath::SelfMatchPolicy;
    use crate::app::slope::StatChoice;
    use crate::model::network::{CqiError, Crs};
    use std::path::PathBuf;

    fn test_file(name: &str) -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("src")
            .join("config")
            .join("test")
            .join(name)
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn defaults_are_valid() {
        let conf = CqiConfiguration::default();
        match conf.validate() {
            Ok(()) => {}
            Err(e) => panic!("{e}"),
        }
        assert_eq!(conf.target_crs().ok(), Some(Crs::WEB_MERCATOR));
    }

    #[test]
    fn rejects_geographic_crs() {
        let conf = CqiConfiguration {
            crs_metric: String::from("EPSG:4326"),
            ..Default::default()
        };
        match conf.validate() {
            Err(CqiError::ConfigurationError(_)) => {}
            other => panic!("expected configuration error, found {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_distances() {
        let cases = [
            CqiConfiguration {
                point_spacing: 0.0,
                ..Default::default()
            },
            CqiConfiguration {
                buffer_distance: -1.0,
                ..Default::default()
            },
            CqiConfiguration {
                offset_distance: 0.0,
                ..Default::default()
            },
            CqiConfiguration {
                min_length: -0.5,
                ..Default::default()
            },
            CqiConfiguration {
                dead_end_passes: 0,
                ..Default::default()
            },
        ];
        for conf in cases {
            assert!(conf.validate().is_err(), "{conf:?}");
        }
    }

    #[test]
    fn reads_partial_toml() {
        let conf = match CqiConfiguration::try_from(&test_file("cqi.toml")) {
            Ok(c) => c,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(conf.crs_metric, "EPSG:27700");
        assert_eq!(conf.point_spacing, 10.0);
        assert_eq!(conf.sidepath_self_match, SelfMatchPolicy::Exclude);
        assert_eq!(conf.stat_choice, StatChoice::Mean);
        assert_eq!(conf.weights.speed, 0.5);
        // unset options keep their defaults
        assert_eq!(conf.buffer_distance, 5.0);
        assert!(conf.generate_offsets);
    }

    #[test]
    fn reads_json() {
        match CqiConfiguration::try_from(&test_file("cqi.json")) {
            Ok(conf) => {
                assert_eq!(conf.min_length, 0.0);
                assert!(conf.compute_lts);
            }
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn unsupported_extension() {
        assert!(CqiConfiguration::try_from(&String::from("cqi.yaml")).is_err());
    }
}
