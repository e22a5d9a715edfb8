use super::SegmentFactor;
use crate::model::network::{CqiError, PipelineStage, SegmentCollection, StageReport};

/// maps a slope in percent to a multiplicative factor.
pub fn percent_to_factor(slope_percent: f64) -> f64 {
    let slope = slope_percent.abs();
    if slope <= 1.0 {
        1.0
    } else if slope <= 3.0 {
        0.95
    } else if slope <= 5.0 {
        0.85
    } else if slope <= 8.0 {
        0.70
    } else if slope <= 10.0 {
        0.50
    } else {
        0.30
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// sets `proc_slope` and `fac_5` on every segment the factor model can
/// evaluate. the skip count holds segments without any raster value.
pub fn annotate_slope(
    collection: &SegmentCollection,
    model: &dyn SegmentFactor,
) -> Result<(SegmentCollection, StageReport), CqiError> {
    let mut missing = 0;
    let segments = collection
        .iter()
        .map(|segment| {
            let mut annotated = segment.clone();
            match model.segment_factor(segment) {
                Some(f) => {
                    annotated.proc_slope = Some(f.proc_slope);
                    annotated.fac_5 = Some(f.factor);
                }
                None => missing += 1,
            }
            annotated
        })
        .collect::<Vec<_>>();
    let report = StageReport::new(
        PipelineStage::Slope,
        collection.len(),
        segments.len(),
        missing,
    );
    Ok((SegmentCollection::new(collection.crs, segments), report))
}
