use crate::model::network::{
    CqiError, PipelineStage, SamplePoint, Segment, SegmentCollection, StageReport,
};
use geo::{Euclidean, InterpolateLine, Length};
use itertools::Itertools;
use kdam::{tqdm, Bar, BarExt};
use rayon::prelude::*;
use std::sync::{Arc, Mutex};

/// number of samples along a line of length `length` at spacing `spacing`,
/// which is `floor(length / spacing) + 1`. the start of the line is always
/// sampled, even when the line is shorter than the spacing.
pub fn sample_count(length: f64, spacing: f64) -> usize {
    if !(length.is_finite() && length > 0.0) {
        return 1;
    }
    (length / spacing).floor() as usize + 1
}

/// samples points along a segment at offsets `0, d, 2d, ...` up to the segment length.
pub fn sample_segment(segment: &Segment, spacing: f64) -> Result<Vec<SamplePoint>, CqiError> {
    validate_spacing(spacing)?;
    let length = Euclidean.length(&segment.linestring);
    let n = sample_count(length, spacing);
    (0..n)
        .map(|i| {
            let offset = (i as f64 * spacing).min(length);
            let point = Euclidean
                .point_at_distance_from_start(&segment.linestring, offset)
                .ok_or_else(|| {
                    CqiError::InternalError(format!(
                        "unable to interpolate segment {} at offset {offset}",
                        segment.id
                    ))
                })?;
            Ok(SamplePoint::new(segment.id, offset, point))
        })
        .collect()
}

/// samples every segment of the collection. output is grouped by segment in
/// collection order, and within a segment by increasing offset.
pub fn sample_points(
    collection: &SegmentCollection,
    spacing: f64,
    parallelize: bool,
) -> Result<(Vec<SamplePoint>, StageReport), CqiError> {
    collection.require_metric()?;
    validate_spacing(spacing)?;

    let samples: Vec<Vec<SamplePoint>> = if parallelize {
        let bar = Arc::new(Mutex::new(
            Bar::builder()
                .total(collection.len())
                .desc("sample points")
                .build()
                .map_err(CqiError::InternalError)?,
        ));
        let result = collection
            .segments
            .par_iter()
            .map(|segment| {
                if let Ok(mut bar) = bar.clone().lock() {
                    let _ = bar.update(1);
                }
                sample_segment(segment, spacing)
            })
            .collect::<Result<Vec<_>, _>>()?;
        eprintln!();
        result
    } else {
        let iter = tqdm!(
            collection.iter(),
            total = collection.len(),
            desc = "sample points"
        );
        let result = iter
            .map(|segment| sample_segment(segment, spacing))
            .collect::<Result<Vec<_>, _>>()?;
        eprintln!();
        result
    };

    let points = samples.into_iter().flatten().collect_vec();
    let report = StageReport::new(PipelineStage::Sample, collection.len(), points.len(), 0);
    Ok((points, report))
}

fn validate_spacing(spacing: f64) -> Result<(), CqiError> {
    if spacing.is_finite() && spacing > 0.0 {
        Ok(())
    } else {
        Err(CqiError::ConfigurationError(format!(
            "sample spacing must be a positive number, found {spacing}"
        )))
    }
}
