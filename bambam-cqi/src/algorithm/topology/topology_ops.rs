use super::EndpointDegreeTable;
use crate::model::network::{CqiError, PipelineStage, SegmentCollection, StageReport};
use itertools::Itertools;

/// removes every segment touching a dead end, where a dead end is an endpoint
/// location shared by no other segment endpoint. this is a single pass over the
/// degrees of the input: removing a segment can expose a new dead end, which is
/// left for the caller to prune by invoking this function again.
pub fn prune_once(
    collection: &SegmentCollection,
    tolerance: f64,
) -> Result<SegmentCollection, CqiError> {
    let table = EndpointDegreeTable::build(collection.iter(), tolerance)?;
    let kept = collection
        .iter()
        .filter(|s| !(table.is_dead_end(s.start()) || table.is_dead_end(s.end())))
        .cloned()
        .collect_vec();
    log::info!(
        "removed {} dead-end segments of {} ({} endpoint locations)",
        collection.len() - kept.len(),
        collection.len(),
        table.len()
    );
    Ok(SegmentCollection::new(collection.crs, kept))
}

/// sets `length_m` on each segment and keeps those at least `min_length` long.
/// segments of zero length are degenerate and always dropped; their count is
/// returned alongside the filtered collection.
pub fn filter_min_length(
    collection: &SegmentCollection,
    min_length: f64,
) -> Result<(SegmentCollection, usize), CqiError> {
    collection.require_metric()?;
    if !(min_length.is_finite() && min_length >= 0.0) {
        return Err(CqiError::ConfigurationError(format!(
            "min_length must be a non-negative number, found {min_length}"
        )));
    }
    let mut degenerate = 0;
    let mut kept = Vec::with_capacity(collection.len());
    for segment in collection.iter() {
        let length = segment.planar_length();
        if !(length.is_finite() && length > 0.0) {
            degenerate += 1;
            continue;
        }
        if length >= min_length {
            let mut annotated = segment.clone();
            annotated.length_m = Some(length);
            kept.push(annotated);
        }
    }
    log::info!(
        "removed {} segments shorter than {} of {}",
        collection.len() - kept.len() - degenerate,
        min_length,
        collection.len()
    );
    Ok((SegmentCollection::new(collection.crs, kept), degenerate))
}

/// topology cleaning: one dead-end pass followed by the minimum length filter.
/// the order matters, filtering first would change which endpoints are dead ends.
pub fn clean(
    collection: &SegmentCollection,
    min_length: f64,
    tolerance: f64,
) -> Result<(SegmentCollection, StageReport), CqiError> {
    collection.require_metric()?;
    let pruned = prune_once(collection, tolerance)?;
    let (cleaned, degenerate) = filter_min_length(&pruned, min_length)?;
    let report = StageReport::new(
        PipelineStage::Clean,
        collection.len(),
        cleaned.len(),
        degenerate,
    );
    Ok((cleaned, report))
}
