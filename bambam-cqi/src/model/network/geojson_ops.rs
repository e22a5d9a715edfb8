use super::{CqiError, Crs, OffsetLine, Segment, SegmentCollection, SegmentId, SegmentTags};
use geo::{Coord, LineString};
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use kdam::tqdm;
use serde_json::json;
use std::{
    collections::BTreeSet,
    fs::File,
    io::BufWriter,
    path::Path,
    str::FromStr,
};

/// property names searched, in order and case-insensitive, for a feature identifier
pub const ID_FIELD_CANDIDATES: [&str; 4] = ["id", "@id", "osm_id", "osm_way_id"];

/// segments read from one GeoJSON source, in the source's CRS
#[derive(Debug)]
pub struct GeoJsonLayer {
    pub collection: SegmentCollection,
    /// number of features in the source
    pub features: usize,
    /// lines dropped for having fewer than 2 coordinates
    pub skipped: usize,
}

/// reads a GeoJSON file as a feature collection. a single Feature is accepted
/// as a collection of one.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection, CqiError> {
    let path_str = path.to_string_lossy().to_string();
    let contents =
        std::fs::read_to_string(path).map_err(|e| CqiError::IoError(path_str.clone(), e))?;
    let geojson = GeoJson::from_str(&contents).map_err(|e| CqiError::GeoJsonError(path_str.clone(), e))?;
    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        GeoJson::Feature(f) => Ok(FeatureCollection {
            bbox: None,
            features: vec![f],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(CqiError::SchemaError {
            source_name: path_str,
            message: String::from("expected a FeatureCollection, found a bare Geometry"),
        }),
    }
}

/// the CRS named by the legacy `crs` member, or WGS84 per RFC 7946.
pub fn read_crs(fc: &FeatureCollection) -> Result<Crs, CqiError> {
    let name = fc
        .foreign_members
        .as_ref()
        .and_then(|fm| fm.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str());
    match name {
        None => Ok(Crs::WGS84),
        Some(n) => Crs::from_str(n).map_err(CqiError::ConfigurationError),
    }
}

/// finds the identifier property of a feature collection: the first candidate
/// name present on any feature, otherwise the first property whose name contains
/// "id".
pub fn detect_id_field(fc: &FeatureCollection) -> Option<String> {
    let keys: BTreeSet<&String> = fc
        .features
        .iter()
        .filter_map(|f| f.properties.as_ref())
        .flat_map(|props| props.keys())
        .collect();
    for candidate in ID_FIELD_CANDIDATES {
        if let Some(key) = keys.iter().find(|k| k.to_lowercase() == candidate) {
            return Some(key.to_string());
        }
    }
    keys.iter()
        .find(|k| k.to_lowercase().contains("id"))
        .map(|k| k.to_string())
}

/// identifier of a feature, taken from the GeoJSON `id` member when present,
/// otherwise from the identifier property.
pub fn feature_source_id(feature: &Feature, id_field: Option<&str>) -> Option<String> {
    match &feature.id {
        Some(Id::String(s)) => Some(s.trim().to_string()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => id_field
            .and_then(|field| feature.property(field))
            .and_then(|v| match v {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            }),
    }
}

/// reads a GeoJSON file of line features into a segment collection. any feature
/// without a geometry, or with a geometry other than LineString or
/// MultiLineString, fails the whole source. MultiLineStrings produce one segment
/// per part.
pub fn read_segments(path: &Path) -> Result<GeoJsonLayer, CqiError> {
    let source_name = path.to_string_lossy().to_string();
    let fc = read_feature_collection(path)?;
    let crs = read_crs(&fc)?;
    let id_field = detect_id_field(&fc);
    let n_features = fc.features.len();

    let mut segments: Vec<Segment> = Vec::with_capacity(n_features);
    let mut skipped = 0;
    let iter = tqdm!(
        fc.features.iter().enumerate(),
        total = n_features,
        desc = format!("read {source_name}")
    );
    for (feature_idx, feature) in iter {
        let geometry = feature.geometry.as_ref().ok_or_else(|| CqiError::SchemaError {
            source_name: source_name.clone(),
            message: format!("feature {feature_idx} has no geometry"),
        })?;
        let lines = match &geometry.value {
            Value::LineString(positions) => vec![positions_to_linestring(positions)],
            Value::MultiLineString(parts) => {
                parts.iter().map(|p| positions_to_linestring(p)).collect()
            }
            other => {
                return Err(CqiError::SchemaError {
                    source_name: source_name.clone(),
                    message: format!(
                        "feature {} has {} geometry, expected LineString or MultiLineString",
                        feature_idx,
                        other.type_name()
                    ),
                })
            }
        };
        let source_id = feature_source_id(feature, id_field.as_deref());
        let tags = feature
            .properties
            .as_ref()
            .map(SegmentTags::from_properties)
            .unwrap_or_default();
        for line in lines {
            let linestring = line.map_err(|message| CqiError::SchemaError {
                source_name: source_name.clone(),
                message: format!("feature {feature_idx}: {message}"),
            })?;
            let id = SegmentId(segments.len());
            match Segment::new(id, source_id.clone(), linestring, tags.clone()) {
                Ok(segment) => segments.push(segment),
                Err(e) => {
                    log::debug!("skipping feature {feature_idx} of {source_name}: {e}");
                    skipped += 1;
                }
            }
        }
    }
    eprintln!();

    Ok(GeoJsonLayer {
        collection: SegmentCollection::new(crs, segments),
        features: n_features,
        skipped,
    })
}

fn positions_to_linestring(positions: &[Vec<f64>]) -> Result<LineString<f64>, String> {
    let coords = positions
        .iter()
        .map(|p| match p[..] {
            [x, y, ..] => Ok(Coord { x, y }),
            _ => Err(format!("position {p:?} has fewer than 2 ordinates")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn linestring_to_value(linestring: &LineString<f64>) -> Value {
    Value::LineString(linestring.coords().map(|c| vec![c.x, c.y]).collect())
}

/// the legacy `crs` member naming the CRS of the written coordinates
fn crs_member(crs: &Crs) -> JsonObject {
    let mut member = JsonObject::new();
    member.insert(
        String::from("crs"),
        json!({ "type": "name", "properties": { "name": crs.urn() } }),
    );
    member
}

/// builds an output feature holding a segment's tags and computed attributes.
pub fn segment_feature(segment: &Segment) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(String::from("segment_id"), json!(segment.id.0));
    properties.insert(String::from("source_id"), json!(segment.source_id));
    for (key, value) in segment.tags.iter() {
        properties.insert(String::from(key), json!(value));
    }
    properties.insert(String::from("length_m"), json!(segment.length_m));
    properties.insert(
        String::from("sidepath_presence"),
        json!(segment.sidepath_presence),
    );
    properties.insert(String::from("proc_maxspeed"), json!(segment.proc_maxspeed));
    properties.insert(
        String::from("has_physical_barrier"),
        json!(segment.has_physical_barrier),
    );
    properties.insert(String::from("cqi"), json!(segment.cqi));
    if let Some(lts) = segment.lts {
        properties.insert(String::from("lts"), json!(lts));
    }
    if segment.proc_slope.is_some() || segment.fac_5.is_some() {
        properties.insert(String::from("proc_slope"), json!(segment.proc_slope));
        properties.insert(String::from("fac_5"), json!(segment.fac_5));
    }
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(linestring_to_value(&segment.linestring))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn offset_feature(offset: &OffsetLine) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(String::from("segment_id"), json!(offset.segment_id.0));
    properties.insert(String::from("side"), json!(offset.side.to_string()));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(linestring_to_value(&offset.linestring))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// writes features as a FeatureCollection labeled with its CRS. returns false
/// without writing when the file exists and overwrite is not set.
pub fn write_feature_collection(
    path: &Path,
    features: Vec<Feature>,
    crs: &Crs,
    overwrite: bool,
) -> Result<bool, CqiError> {
    let path_str = path.to_string_lossy().to_string();
    if path.exists() && !overwrite {
        log::warn!("{path_str} exists and overwrite is not set, skipping");
        return Ok(false);
    }
    let fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(crs_member(crs)),
    };
    let file = File::create(path).map_err(|e| CqiError::IoError(path_str.clone(), e))?;
    serde_json::to_writer(BufWriter::new(file), &fc).map_err(|e| {
        CqiError::IoError(path_str, std::io::Error::other(e))
    })?;
    Ok(true)
}
