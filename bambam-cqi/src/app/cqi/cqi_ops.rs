use super::{attribute_ops, CqiWeights};
use crate::model::network::{
    CqiError, PipelineStage, Segment, SegmentCollection, SegmentId, StageReport,
};
use kdam::{Bar, BarExt};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// annotates one segment with its processed attributes and score. a segment
/// missing from the sidepath table has no sidepath.
pub fn annotate_segment(
    segment: &Segment,
    sidepaths: &HashMap<SegmentId, bool>,
    weights: &CqiWeights,
) -> Segment {
    let mut annotated = segment.clone();
    annotated.sidepath_presence = Some(sidepaths.get(&segment.id).copied().unwrap_or_default());
    annotated.proc_maxspeed = attribute_ops::proc_maxspeed(&segment.tags);
    annotated.has_physical_barrier = Some(attribute_ops::has_physical_barrier(&segment.tags));
    annotated.cqi = Some(weights.score_segment(&annotated));
    annotated
}

/// scoring stage: attribute processing followed by the weighted index, for
/// every segment. output order matches input order.
pub fn score_collection(
    collection: &SegmentCollection,
    sidepaths: &HashMap<SegmentId, bool>,
    weights: &CqiWeights,
    parallelize: bool,
) -> Result<(SegmentCollection, StageReport), CqiError> {
    weights.validate()?;
    let scored: Vec<Segment> = if parallelize {
        let bar = Arc::new(Mutex::new(
            Bar::builder()
                .total(collection.len())
                .desc("cycling quality index")
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
                annotate_segment(segment, sidepaths, weights)
            })
            .collect();
        eprintln!();
        result
    } else {
        collection
            .iter()
            .map(|segment| annotate_segment(segment, sidepaths, weights))
            .collect()
    };
    let report = StageReport::new(PipelineStage::Score, collection.len(), scored.len(), 0);
    Ok((SegmentCollection::new(collection.crs, scored), report))
}

#[cfg(test)]
mod tests {
    use super::score_collection;
    use crate::app::cqi::CqiWeights;
    use crate::model::network::{Crs, Segment, SegmentCollection, SegmentId, SegmentTags};
    use geo::line_string;
    use std::collections::HashMap;

    #[test]
    fn scores_in_input_order() {
        let protected = SegmentTags {
            cycleway_left: Some(String::from("track")),
            maxspeed: Some(String::from("60")),
            ..Default::default()
        };
        let unmarked = SegmentTags::default();
        let segments = vec![
            Segment::new(
                SegmentId(0),
                None,
                line_string![(x: 0.0, y: 0.0), (x: 50.0, y: 0.0)],
                protected,
            ),
            Segment::new(
                SegmentId(1),
                None,
                line_string![(x: 0.0, y: 10.0), (x: 50.0, y: 10.0)],
                unmarked,
            ),
        ]
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("test invariant: valid segments");
        let collection = SegmentCollection::new(Crs::WEB_MERCATOR, segments);
        let sidepaths = HashMap::from([(SegmentId(0), true)]);

        for parallelize in [false, true] {
            match score_collection(&collection, &sidepaths, &CqiWeights::default(), parallelize) {
                Ok((scored, report)) => {
                    assert_eq!(report.output, 2);
                    let first = &scored.segments[0];
                    assert_eq!(first.id, SegmentId(0));
                    assert_eq!(first.proc_maxspeed, Some(60.0));
                    assert_eq!(first.has_physical_barrier, Some(true));
                    assert_eq!(first.sidepath_presence, Some(true));
                    assert!((first.cqi.unwrap_or_default() - 0.6).abs() < 1e-12);
                    let second = &scored.segments[1];
                    assert_eq!(second.proc_maxspeed, None);
                    assert_eq!(second.sidepath_presence, Some(false));
                    assert!((second.cqi.unwrap_or_default() - 0.4).abs() < 1e-12);
                }
                Err(e) => panic!("{e}"),
            }
        }
    }
}
