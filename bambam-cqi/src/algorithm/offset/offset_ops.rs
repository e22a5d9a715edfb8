use crate::model::network::{
    CqiError, OffsetLine, OffsetSide, PipelineStage, SegmentCollection, StageReport,
};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, LineString};
use itertools::Itertools;
use kdam::{tqdm, Bar, BarExt};
use rayon::prelude::*;
use std::sync::{Arc, Mutex};

/// ratio of mitre length to offset distance above which a corner is beveled.
pub const MITRE_LIMIT: f64 = 5.0;

const EPSILON: f64 = 1e-12;

/// builds the line parallel to `linestring` at `distance` on the given side,
/// joining corners with mitres. the result keeps the direction of the input,
/// and a closed input (a roundabout, say) gives a closed offset ring.
/// returns None when the offset is degenerate: fewer than two distinct input
/// coordinates, a corner that doubles back, an offset piece running against
/// its source line, or an offset that crosses itself.
pub fn offset_linestring(
    linestring: &LineString<f64>,
    distance: f64,
    side: OffsetSide,
) -> Option<LineString<f64>> {
    let coords = linestring
        .coords()
        .copied()
        .dedup_by(|a, b| same_coord(*a, *b))
        .collect_vec();
    if coords.len() < 2 {
        return None;
    }
    // a ring needs at least three distinct vertices
    let closed = coords.len() > 3 && same_coord(coords[0], coords[coords.len() - 1]);
    let shift = side.sign() * distance;
    let directions = coords
        .iter()
        .tuple_windows()
        .map(|(a, b)| unit_direction(*a, *b))
        .collect::<Option<Vec<_>>>()?;
    let normals = directions.iter().map(|d| left_normal(*d)).collect_vec();

    // (end of the incoming piece, start of the outgoing piece) at each vertex
    let mut joins: Vec<(Coord<f64>, Coord<f64>)> = Vec::with_capacity(coords.len());
    if closed {
        let n_edges = directions.len();
        for (k, vertex) in coords.iter().take(n_edges).enumerate() {
            let prev = normals[(k + n_edges - 1) % n_edges];
            joins.push(corner_join(*vertex, prev, normals[k], shift)?);
        }
        joins.push(joins[0]);
    } else {
        let first = coords[0] + normals[0] * shift;
        joins.push((first, first));
        for (k, vertex) in coords.iter().enumerate().skip(1).take(coords.len() - 2) {
            joins.push(corner_join(*vertex, normals[k - 1], normals[k], shift)?);
        }
        let last = coords[coords.len() - 1] + normals[normals.len() - 1] * shift;
        joins.push((last, last));
    }

    let runs_backward = joins
        .iter()
        .tuple_windows()
        .zip(directions.iter())
        .any(|(((_, from), (to, _)), direction)| dot(*to - *from, *direction) <= EPSILON);
    if runs_backward {
        return None;
    }

    let n_vertices = if closed { joins.len() - 1 } else { joins.len() };
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(joins.len() + 2);
    for (incoming, outgoing) in joins.into_iter().take(n_vertices) {
        out.push(incoming);
        if outgoing != incoming {
            out.push(outgoing);
        }
    }
    if closed {
        out.push(out[0]);
    }
    let result = LineString::new(out);
    if self_intersects(&result, closed) {
        None
    } else {
        Some(result)
    }
}

/// the offset join at a vertex between two pieces with the given left normals.
/// a mitre point, or a bevel pair when the mitre would be too long. None when
/// the line doubles back on itself at the vertex.
fn corner_join(
    vertex: Coord<f64>,
    prev: Coord<f64>,
    next: Coord<f64>,
    shift: f64,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let bisector = prev + next;
    let norm = bisector.x.hypot(bisector.y);
    if norm < EPSILON {
        return None;
    }
    let bisector = bisector / norm;
    let cos_half = dot(bisector, next);
    if cos_half < 1.0 / MITRE_LIMIT {
        Some((vertex + prev * shift, vertex + next * shift))
    } else {
        let mitre = vertex + bisector * (shift / cos_half);
        Some((mitre, mitre))
    }
}

/// creates left and right offsets for every segment. offsets that would be
/// degenerate are skipped and counted in the stage report. output is ordered
/// by segment, left before right.
pub fn generate_offsets(
    collection: &SegmentCollection,
    distance: f64,
    parallelize: bool,
) -> Result<(Vec<OffsetLine>, StageReport), CqiError> {
    collection.require_metric()?;
    if !(distance.is_finite() && distance > 0.0) {
        return Err(CqiError::ConfigurationError(format!(
            "offset distance must be a positive number, found {distance}"
        )));
    }
    let sides = [OffsetSide::Left, OffsetSide::Right];
    let offsets_for = |segment: &crate::model::network::Segment| {
        sides
            .iter()
            .map(|side| {
                offset_linestring(&segment.linestring, distance, *side).map(|linestring| {
                    OffsetLine {
                        segment_id: segment.id,
                        side: *side,
                        linestring,
                    }
                })
            })
            .collect_vec()
    };

    let nested: Vec<Vec<Option<OffsetLine>>> = if parallelize {
        let bar = Arc::new(Mutex::new(
            Bar::builder()
                .total(collection.len())
                .desc("offset lines")
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
                offsets_for(segment)
            })
            .collect();
        eprintln!();
        result
    } else {
        let iter = tqdm!(
            collection.iter(),
            total = collection.len(),
            desc = "offset lines"
        );
        let result = iter.map(offsets_for).collect();
        eprintln!();
        result
    };

    let attempted = collection.len() * sides.len();
    let offsets = nested.into_iter().flatten().flatten().collect_vec();
    let skipped = attempted - offsets.len();
    let report = StageReport::new(PipelineStage::Offset, attempted, offsets.len(), skipped);
    Ok((offsets, report))
}

fn same_coord(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn unit_direction(a: Coord<f64>, b: Coord<f64>) -> Option<Coord<f64>> {
    let d = b - a;
    let len = d.x.hypot(d.y);
    if len < EPSILON {
        None
    } else {
        Some(d / len)
    }
}

/// unit normal pointing left of a unit direction
fn left_normal(direction: Coord<f64>) -> Coord<f64> {
    Coord {
        x: -direction.y,
        y: direction.x,
    }
}

fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

/// true if any two non-adjacent lines touch, or adjacent lines overlap. in a
/// closed ring the last line is adjacent to the first.
fn self_intersects(linestring: &LineString<f64>, closed: bool) -> bool {
    let lines = linestring.lines().collect_vec();
    for i in 0..lines.len() {
        for j in (i + 1)..lines.len() {
            let adjacent = j == i + 1 || (closed && i == 0 && j == lines.len() - 1);
            match line_intersection(lines[i], lines[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return true,
                Some(LineIntersection::SinglePoint { .. }) if !adjacent => return true,
                Some(LineIntersection::SinglePoint { .. }) => {}
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::{generate_offsets, offset_linestring};
    use crate::model::network::{
        CqiError, Crs, OffsetSide, Segment, SegmentCollection, SegmentId, SegmentTags,
    };
    use geo::{Euclidean, Length, LineString};

    fn assert_coords(ls: &LineString<f64>, expected: &[(f64, f64)]) {
        assert_eq!(ls.0.len(), expected.len(), "{ls:?}");
        for (c, (x, y)) in ls.coords().zip(expected) {
            assert!((c.x - x).abs() < 1e-9 && (c.y - y).abs() < 1e-9, "{ls:?}");
        }
    }

    #[test]
    fn straight_line_offsets_both_sides() {
        let ls = LineString::from(vec![(0.0, 0.0), (100.0, 0.0)]);
        let left = offset_linestring(&ls, 2.0, OffsetSide::Left).expect("left offset");
        let right = offset_linestring(&ls, 2.0, OffsetSide::Right).expect("right offset");
        assert_coords(&left, &[(0.0, 2.0), (100.0, 2.0)]);
        assert_coords(&right, &[(0.0, -2.0), (100.0, -2.0)]);
        assert!((Euclidean.length(&left) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn right_angle_uses_mitre_corner() {
        let ls = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let left = offset_linestring(&ls, 1.0, OffsetSide::Left).expect("left offset");
        assert_coords(&left, &[(0.0, 1.0), (9.0, 1.0), (9.0, 10.0)]);
        let right = offset_linestring(&ls, 1.0, OffsetSide::Right).expect("right offset");
        assert_coords(&right, &[(0.0, -1.0), (11.0, -1.0), (11.0, 10.0)]);
    }

    #[test]
    fn sharp_corner_is_beveled() {
        let ls = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 1.0)]);
        let right = offset_linestring(&ls, 0.1, OffsetSide::Right).expect("right offset");
        assert_eq!(right.0.len(), 4);
    }

    #[test]
    fn degenerate_inputs_are_skipped() {
        let point_like = LineString::from(vec![(3.0, 3.0), (3.0, 3.0)]);
        assert!(offset_linestring(&point_like, 2.0, OffsetSide::Left).is_none());
        let reversal = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (5.0, 0.0)]);
        assert!(offset_linestring(&reversal, 2.0, OffsetSide::Left).is_none());
        // a narrow u-turn: the inner offset crosses itself
        let hairpin = LineString::from(vec![(0.0, 0.0), (20.0, 0.0), (20.0, 1.0), (0.0, 1.0)]);
        assert!(offset_linestring(&hairpin, 2.0, OffsetSide::Left).is_none());
        assert!(offset_linestring(&hairpin, 2.0, OffsetSide::Right).is_some());
    }

    #[test]
    fn closed_ring_offsets_are_closed() {
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 100.0),
            (0.0, 100.0),
            (0.0, 0.0),
        ]);
        let left = offset_linestring(&ring, 2.0, OffsetSide::Left).expect("inner ring");
        assert_coords(
            &left,
            &[(2.0, 2.0), (98.0, 2.0), (98.0, 98.0), (2.0, 98.0), (2.0, 2.0)],
        );
        let right = offset_linestring(&ring, 2.0, OffsetSide::Right).expect("outer ring");
        assert_coords(
            &right,
            &[
                (-2.0, -2.0),
                (102.0, -2.0),
                (102.0, 102.0),
                (-2.0, 102.0),
                (-2.0, -2.0),
            ],
        );
        assert!(left.is_closed() && right.is_closed());
        assert!((Euclidean.length(&left) - 4.0 * 96.0).abs() < 1e-9);
    }

    #[test]
    fn ring_too_small_for_inner_offset() {
        let ring = LineString::from(vec![(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0), (0.0, 0.0)]);
        assert!(offset_linestring(&ring, 2.0, OffsetSide::Left).is_none());
        assert!(offset_linestring(&ring, 2.0, OffsetSide::Right).is_some());
    }

    #[test]
    fn generate_counts_skipped_offsets() {
        let segments = vec![
            Segment::new(
                SegmentId(0),
                None,
                LineString::from(vec![(0.0, 0.0), (100.0, 0.0)]),
                SegmentTags::default(),
            ),
            Segment::new(
                SegmentId(1),
                None,
                LineString::from(vec![(0.0, 0.0), (20.0, 0.0), (20.0, 1.0), (0.0, 1.0)]),
                SegmentTags::default(),
            ),
        ]
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("test invariant: valid segments");
        let c = SegmentCollection::new(Crs::WEB_MERCATOR, segments);
        match generate_offsets(&c, 2.0, false) {
            Ok((offsets, report)) => {
                let keys: Vec<(usize, OffsetSide)> =
                    offsets.iter().map(|o| (o.segment_id.0, o.side)).collect();
                assert_eq!(
                    keys,
                    vec![
                        (0, OffsetSide::Left),
                        (0, OffsetSide::Right),
                        (1, OffsetSide::Right)
                    ]
                );
                assert_eq!(report.input, 4);
                assert_eq!(report.output, 3);
                assert_eq!(report.skipped, 1);
            }
            Err(e) => panic!("{e}"),
        }
        let (par, _) = generate_offsets(&c, 2.0, true).expect("parallel");
        assert_eq!(par.len(), 3);
    }

    #[test]
    fn non_positive_distance_is_configuration_error() {
        let c = SegmentCollection::new(Crs::WEB_MERCATOR, vec![]);
        match generate_offsets(&c, -1.0, false) {
            Err(CqiError::ConfigurationError(_)) => {}
            other => panic!("expected configuration error, found {other:?}"),
        }
    }
}
