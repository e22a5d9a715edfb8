use crate::model::network::{
    geojson_ops, segment_ops, CqiError, PipelineStage, SegmentCollection, StageReport,
};
use itertools::Itertools;
use std::collections::HashSet;
use std::path::Path;

/// identifiers of features to remove from a network. an identifier matches
/// either exactly or by its first run of digits, so `way/123` and `123` name
/// the same feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionList {
    ids: HashSet<String>,
    numeric_ids: HashSet<String>,
}

impl ExclusionList {
    pub fn new<I, S>(ids: I) -> ExclusionList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: HashSet<String> = ids
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let numeric_ids = ids
            .iter()
            .filter_map(|id| segment_ops::first_digit_run(id))
            .map(String::from)
            .collect();
        ExclusionList { ids, numeric_ids }
    }

    /// reads the identifiers of every feature in a GeoJSON file. the file must
    /// carry feature ids or an identifier property.
    pub fn from_geojson(path: &Path) -> Result<ExclusionList, CqiError> {
        let fc = geojson_ops::read_feature_collection(path)?;
        let id_field = geojson_ops::detect_id_field(&fc);
        let ids = fc
            .features
            .iter()
            .filter_map(|f| geojson_ops::feature_source_id(f, id_field.as_deref()))
            .collect_vec();
        if ids.is_empty() && !fc.features.is_empty() {
            return Err(CqiError::ConfigurationError(format!(
                "no identifier field found in exclusion file {}",
                path.to_string_lossy()
            )));
        }
        let list = ExclusionList::new(ids);
        log::info!(
            "read {} excluded ids from {}",
            list.len(),
            path.to_string_lossy()
        );
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn matches(&self, id: &str) -> bool {
        let id = id.trim();
        self.ids.contains(id)
            || segment_ops::first_digit_run(id)
                .map(|digits| self.numeric_ids.contains(digits))
                .unwrap_or_default()
    }

    /// removes the segments whose source id is excluded. segments without a
    /// source id are kept.
    pub fn apply(&self, collection: &SegmentCollection) -> (SegmentCollection, StageReport) {
        let kept = collection
            .iter()
            .filter(|s| {
                s.source_id
                    .as_deref()
                    .map(|id| !self.matches(id))
                    .unwrap_or(true)
            })
            .cloned()
            .collect_vec();
        let report = StageReport::new(PipelineStage::Exclude, collection.len(), kept.len(), 0);
        (SegmentCollection::new(collection.crs, kept), report)
    }
}
