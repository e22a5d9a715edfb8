use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// a coordinate reference system tag. the pipeline only needs to know whether a
/// CRS is angular (geographic) or projected (metric); the identifier is carried
/// along for reprojection and for labeling outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// OGC CRS84, WGS84 with longitude, latitude axis order
    Crs84,
    Epsg(u32),
}

/// geographic EPSG codes that show up on street network exports.
const GEOGRAPHIC_EPSG_CODES: [u32; 9] = [4326, 4258, 4267, 4269, 4283, 4167, 4674, 4979, 4617];

impl Crs {
    pub const WGS84: Crs = Crs::Epsg(4326);
    pub const WEB_MERCATOR: Crs = Crs::Epsg(3857);

    pub fn is_geographic(&self) -> bool {
        match self {
            Crs::Crs84 => true,
            Crs::Epsg(code) => GEOGRAPHIC_EPSG_CODES.contains(code),
        }
    }

    /// true when coordinates are planar distances (meters or feet), which is
    /// required for length, spacing and buffer operations.
    pub fn is_metric(&self) -> bool {
        !self.is_geographic()
    }

    /// longitude/latitude order with WGS84 datum
    pub fn is_wgs84(&self) -> bool {
        matches!(self, Crs::Crs84 | Crs::Epsg(4326))
    }

    /// name in the OGC URN form used by the legacy GeoJSON `crs` member.
    pub fn urn(&self) -> String {
        match self {
            Crs::Crs84 => String::from("urn:ogc:def:crs:OGC:1.3:CRS84"),
            Crs::Epsg(code) => format!("urn:ogc:def:crs:EPSG::{code}"),
        }
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::WGS84
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Crs84 => write!(f, "OGC:CRS84"),
            Crs::Epsg(code) => write!(f, "EPSG:{code}"),
        }
    }
}

impl FromStr for Crs {
    type Err = String;

    /// accepts `EPSG:3857`, `urn:ogc:def:crs:EPSG::3857`, `urn:ogc:def:crs:EPSG:6.6:3857`,
    /// `CRS84`, `OGC:CRS84` and `urn:ogc:def:crs:OGC:1.3:CRS84`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        if upper.is_empty() {
            return Err(String::from("empty CRS identifier"));
        }
        if upper.ends_with("CRS84") {
            return Ok(Crs::Crs84);
        }
        let code_str = if let Some(rest) = upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
            // optional version segment between the authority and the code
            rest.rsplit(':').next().unwrap_or(rest)
        } else if let Some(rest) = upper.strip_prefix("EPSG:") {
            rest
        } else {
            return Err(format!("unrecognized CRS identifier '{s}'"));
        };
        code_str
            .parse::<u32>()
            .map(Crs::Epsg)
            .map_err(|e| format!("invalid EPSG code in CRS identifier '{s}': {e}"))
    }
}

impl TryFrom<String> for Crs {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Crs::from_str(&value)
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::Crs;
    use std::str::FromStr;

    #[test]
    fn parse_epsg_forms() {
        for s in [
            "EPSG:27700",
            "epsg:27700",
            "urn:ogc:def:crs:EPSG::27700",
            "urn:ogc:def:crs:EPSG:6.6:27700",
        ] {
            match Crs::from_str(s) {
                Ok(crs) => assert_eq!(crs, Crs::Epsg(27700), "parsing {s}"),
                Err(e) => panic!("{e}"),
            }
        }
    }

    #[test]
    fn parse_crs84() {
        match Crs::from_str("urn:ogc:def:crs:OGC:1.3:CRS84") {
            Ok(crs) => {
                assert_eq!(crs, Crs::Crs84);
                assert!(crs.is_geographic());
                assert!(crs.is_wgs84());
            }
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn metric_classification() {
        assert!(Crs::WEB_MERCATOR.is_metric());
        assert!(Crs::Epsg(27700).is_metric());
        assert!(!Crs::WGS84.is_metric());
        assert!(!Crs::Epsg(4258).is_metric());
    }

    #[test]
    fn reject_garbage() {
        assert!(Crs::from_str("").is_err());
        assert!(Crs::from_str("mercator").is_err());
        assert!(Crs::from_str("EPSG:abc").is_err());
    }
}
