use super::LtsInputs;
use crate::model::network::{CqiError, PipelineStage, SegmentCollection, StageReport};

/// level of traffic stress, 1 (lowest) to 4 (highest), estimated from road
/// class, bike lane presence, speed and lane count.
pub fn estimate_lts(inputs: &LtsInputs) -> u8 {
    let class = inputs.functional_class.as_deref().unwrap_or_default();
    let speed = inputs.speed_or_default();
    let lanes = inputs.lanes_or_default();
    let bike_lane = inputs.has_bike_lane;

    if matches!(class, "residential" | "living_street") && bike_lane && speed <= 25.0 {
        1
    } else if bike_lane && speed <= 30.0 && lanes <= 2 {
        2
    } else if !bike_lane && matches!(class, "residential" | "tertiary") && speed <= 30.0 {
        3
    } else if lanes >= 4 || speed >= 45.0 {
        4
    } else if matches!(class, "primary" | "secondary" | "trunk") && !bike_lane {
        4
    } else if bike_lane && speed > 35.0 {
        3
    } else {
        2
    }
}

/// sets `lts` on every segment.
pub fn annotate_lts(
    collection: &SegmentCollection,
) -> Result<(SegmentCollection, StageReport), CqiError> {
    let segments = collection
        .iter()
        .map(|segment| {
            let mut annotated = segment.clone();
            annotated.lts = Some(estimate_lts(&LtsInputs::from_tags(&segment.tags)));
            annotated
        })
        .collect::<Vec<_>>();
    let report = StageReport::new(PipelineStage::Lts, collection.len(), segments.len(), 0);
    Ok((SegmentCollection::new(collection.crs, segments), report))
}
