use super::{SegmentIndex, SelfMatchPolicy};
use crate::model::network::{
    CqiError, PipelineStage, SamplePoint, SegmentCollection, SegmentId, StageReport,
};
use kdam::{tqdm, Bar, BarExt};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// flags each segment with a sample point whose disk of `radius` intersects a
/// segment accepted by the `policy`. every segment of the collection receives
/// an entry, defaulting to false when none of its samples found a match.
pub fn detect_sidepaths(
    collection: &SegmentCollection,
    samples: &[SamplePoint],
    radius: f64,
    policy: SelfMatchPolicy,
    parallelize: bool,
) -> Result<(HashMap<SegmentId, bool>, StageReport), CqiError> {
    collection.require_metric()?;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(CqiError::ConfigurationError(format!(
            "sidepath buffer radius must be a positive number, found {radius}"
        )));
    }
    let lookup = collection.index_lookup();
    let index = SegmentIndex::new(&collection.segments)?;
    log::info!(
        "indexed {} segments for sidepath search, self matches: {policy}",
        index.len()
    );

    let matches_sidepath = |sample: &SamplePoint| -> Result<bool, CqiError> {
        let sampled = lookup.get(&sample.segment_id).ok_or_else(|| {
            CqiError::InternalError(format!(
                "sample point references unknown segment {}",
                sample.segment_id
            ))
        })?;
        let found = index
            .within_distance(&sample.point, radius)
            .into_iter()
            .any(|candidate| policy.accepts(*sampled, candidate));
        Ok(found)
    };

    let results: Vec<bool> = if parallelize {
        let bar = Arc::new(Mutex::new(
            Bar::builder()
                .total(samples.len())
                .desc("sidepath search")
                .build()
                .map_err(CqiError::InternalError)?,
        ));
        let result = samples
            .par_iter()
            .map(|sample| {
                if let Ok(mut bar) = bar.clone().lock() {
                    let _ = bar.update(1);
                }
                matches_sidepath(sample)
            })
            .collect::<Result<Vec<_>, _>>()?;
        eprintln!();
        result
    } else {
        let iter = tqdm!(samples.iter(), total = samples.len(), desc = "sidepath search");
        let result = iter.map(matches_sidepath).collect::<Result<Vec<_>, _>>()?;
        eprintln!();
        result
    };

    let mut presence: HashMap<SegmentId, bool> =
        collection.iter().map(|s| (s.id, false)).collect();
    for (sample, found) in samples.iter().zip(results) {
        if found {
            presence.insert(sample.segment_id, true);
        }
    }
    let flagged = presence.values().filter(|v| **v).count();
    let report = StageReport::new(PipelineStage::Sidepath, samples.len(), flagged, 0);
    Ok((presence, report))
}
