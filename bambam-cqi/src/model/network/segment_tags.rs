use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// the OSM tags recognized on a segment. tag keys containing ':' are stored
/// under the same key with '_', e.g. `cycleway:left` becomes `cycleway_left`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTags {
    pub highway: Option<String>,
    pub cycleway: Option<String>,
    pub cycleway_left: Option<String>,
    pub cycleway_right: Option<String>,
    pub cycleway_both: Option<String>,
    pub cycleway_segregated: Option<String>,
    pub bicycle: Option<String>,
    pub lanes: Option<String>,
    pub maxspeed: Option<String>,
    pub name: Option<String>,
    pub surface: Option<String>,
    pub lit: Option<String>,
    pub oneway: Option<String>,
}

impl SegmentTags {
    /// delimiter used when a tag holds several values
    pub const VALUE_DELIMITER: &'static str = ";";

    /// recognized tags as they appear in OSM
    pub const RECOGNIZED_KEYS: [&'static str; 13] = [
        "highway",
        "cycleway",
        "cycleway:left",
        "cycleway:right",
        "cycleway:both",
        "cycleway:segregated",
        "bicycle",
        "lanes",
        "maxspeed",
        "name",
        "surface",
        "lit",
        "oneway",
    ];

    /// the output column name for an OSM tag key
    pub fn normalize_key(key: &str) -> String {
        key.replace(':', "_")
    }

    /// collects recognized tags from a feature's properties. either spelling of
    /// a key is accepted, with the OSM spelling taking precedence.
    pub fn from_properties(properties: &Map<String, Value>) -> SegmentTags {
        let mut tags = SegmentTags::default();
        for key in SegmentTags::RECOGNIZED_KEYS {
            let normalized = SegmentTags::normalize_key(key);
            let value = properties
                .get(key)
                .and_then(normalize_tag_value)
                .or_else(|| properties.get(&normalized).and_then(normalize_tag_value));
            if let Some(field) = tags.field_mut(&normalized) {
                *field = value;
            }
        }
        tags
    }

    /// value of a tag by its normalized key
    pub fn get(&self, key: &str) -> Option<&String> {
        self.iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v)
    }

    /// all recognized tags in output column order, by normalized key
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&String>)> {
        [
            ("highway", self.highway.as_ref()),
            ("cycleway", self.cycleway.as_ref()),
            ("cycleway_left", self.cycleway_left.as_ref()),
            ("cycleway_right", self.cycleway_right.as_ref()),
            ("cycleway_both", self.cycleway_both.as_ref()),
            ("cycleway_segregated", self.cycleway_segregated.as_ref()),
            ("bicycle", self.bicycle.as_ref()),
            ("lanes", self.lanes.as_ref()),
            ("maxspeed", self.maxspeed.as_ref()),
            ("name", self.name.as_ref()),
            ("surface", self.surface.as_ref()),
            ("lit", self.lit.as_ref()),
            ("oneway", self.oneway.as_ref()),
        ]
        .into_iter()
    }

    /// the cycleway tag and its side variants, which together describe
    /// any cycle facility attached to the road.
    pub fn cycleway_values(&self) -> [Option<&String>; 5] {
        [
            self.cycleway.as_ref(),
            self.cycleway_left.as_ref(),
            self.cycleway_right.as_ref(),
            self.cycleway_both.as_ref(),
            self.cycleway_segregated.as_ref(),
        ]
    }

    fn field_mut(&mut self, normalized_key: &str) -> Option<&mut Option<String>> {
        match normalized_key {
            "highway" => Some(&mut self.highway),
            "cycleway" => Some(&mut self.cycleway),
            "cycleway_left" => Some(&mut self.cycleway_left),
            "cycleway_right" => Some(&mut self.cycleway_right),
            "cycleway_both" => Some(&mut self.cycleway_both),
            "cycleway_segregated" => Some(&mut self.cycleway_segregated),
            "bicycle" => Some(&mut self.bicycle),
            "lanes" => Some(&mut self.lanes),
            "maxspeed" => Some(&mut self.maxspeed),
            "name" => Some(&mut self.name),
            "surface" => Some(&mut self.surface),
            "lit" => Some(&mut self.lit),
            "oneway" => Some(&mut self.oneway),
            _ => None,
        }
    }
}

/// flattens a JSON attribute into a tag string. lists (as produced by OSMnx
/// when simplification merges ways) are joined with the value delimiter.
pub fn normalize_tag_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(values) => {
            let joined = values
                .iter()
                .filter_map(normalize_tag_value)
                .join(SegmentTags::VALUE_DELIMITER);
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
