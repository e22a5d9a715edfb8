use super::Reprojector;
use crate::model::network::{CqiError, Crs, Segment, SegmentCollection};
use geo::LineString;

/// produces a copy of the collection with every coordinate transformed into
/// the target CRS. the target must be projected, since all downstream stages
/// measure planar distances.
pub fn reproject_collection(
    collection: &SegmentCollection,
    reprojector: &dyn Reprojector,
    target: &Crs,
) -> Result<SegmentCollection, CqiError> {
    if !target.is_metric() {
        return Err(CqiError::ConfigurationError(format!(
            "target CRS {target} is not a projected (metric) CRS"
        )));
    }
    let source = collection.crs;
    if !reprojector.supports(&source, target) {
        return Err(CqiError::ConfigurationError(format!(
            "no reprojection available from {source} to {target}"
        )));
    }
    if source == *target {
        return Ok(collection.clone());
    }
    log::info!(
        "reprojecting {} segments from {} to {}",
        collection.len(),
        source,
        target
    );

    let segments = collection
        .segments
        .iter()
        .map(|segment| {
            let coords = segment
                .linestring
                .coords()
                .map(|c| reprojector.reproject(*c, &source, target))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Segment {
                linestring: LineString::new(coords),
                ..segment.clone()
            })
        })
        .collect::<Result<Vec<_>, CqiError>>()?;
    Ok(SegmentCollection::new(*target, segments))
}
