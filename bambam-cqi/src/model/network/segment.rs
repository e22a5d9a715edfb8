use super::{SegmentId, SegmentTags};
use geo::{Coord, Euclidean, Length, LineString};
use wkt::ToWkt;

/// a road segment: a polyline with its recognized tags and the attributes
/// appended by the pipeline stages. appended attributes are `None` until the
/// stage that computes them has run.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    /// identifier of the source feature, if the source carried one
    pub source_id: Option<String>,
    pub linestring: LineString<f64>,
    pub tags: SegmentTags,
    pub length_m: Option<f64>,
    pub sidepath_presence: Option<bool>,
    pub proc_maxspeed: Option<f64>,
    pub has_physical_barrier: Option<bool>,
    pub cqi: Option<f64>,
    pub lts: Option<u8>,
    pub proc_slope: Option<f64>,
    pub fac_5: Option<f64>,
}

impl Segment {
    /// builds a segment from a polyline. fails when the polyline has fewer
    /// than 2 coordinates.
    pub fn new(
        id: SegmentId,
        source_id: Option<String>,
        linestring: LineString<f64>,
        tags: SegmentTags,
    ) -> Result<Segment, String> {
        if linestring.0.len() < 2 {
            return Err(format!(
                "segment {} has fewer than 2 coordinates: '{}'",
                id,
                linestring.to_wkt()
            ));
        }
        Ok(Segment {
            id,
            source_id,
            linestring,
            tags,
            length_m: None,
            sidepath_presence: None,
            proc_maxspeed: None,
            has_physical_barrier: None,
            cqi: None,
            lts: None,
            proc_slope: None,
            fac_5: None,
        })
    }

    /// planar length in the units of the collection's CRS
    pub fn planar_length(&self) -> f64 {
        Euclidean.length(&self.linestring)
    }

    pub fn start(&self) -> Coord<f64> {
        self.linestring.0[0]
    }

    pub fn end(&self) -> Coord<f64> {
        self.linestring.0[self.linestring.0.len() - 1]
    }

    pub fn with_id(mut self, id: SegmentId) -> Segment {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Segment;
    use crate::model::network::{SegmentId, SegmentTags};

    #[test]
    fn rejects_single_coordinate() {
        let ls = geo::LineString::new(vec![geo::coord! { x: 0.0, y: 0.0 }]);
        let result = Segment::new(SegmentId(0), None, ls, SegmentTags::default());
        assert!(result.is_err());
    }

    #[test]
    fn planar_length_and_endpoints() {
        let ls = geo::line_string![
            geo::coord! { x: 0.0, y: 0.0 },
            geo::coord! { x: 3.0, y: 4.0 },
            geo::coord! { x: 3.0, y: 10.0 },
        ];
        match Segment::new(SegmentId(7), None, ls, SegmentTags::default()) {
            Ok(segment) => {
                assert!((segment.planar_length() - 11.0).abs() < 1e-9);
                assert_eq!(segment.start(), geo::coord! { x: 0.0, y: 0.0 });
                assert_eq!(segment.end(), geo::coord! { x: 3.0, y: 10.0 });
            }
            Err(e) => panic!("{e}"),
        }
    }
}
