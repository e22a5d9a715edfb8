use serde::{Deserialize, Serialize};

/// unit of the values stored in a slope raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeUnit {
    #[default]
    Degree,
    Percent,
}

impl SlopeUnit {
    pub fn to_percent(&self, value: f64) -> f64 {
        match self {
            SlopeUnit::Degree => value.to_radians().tan() * 100.0,
            SlopeUnit::Percent => value,
        }
    }
}
