use super::{CqiError, Crs, Segment, SegmentId};
use std::collections::HashMap;

/// a table of segments sharing one coordinate reference system. every stage
/// consumes a collection and produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCollection {
    pub crs: Crs,
    pub segments: Vec<Segment>,
}

impl SegmentCollection {
    pub fn new(crs: Crs, segments: Vec<Segment>) -> SegmentCollection {
        SegmentCollection { crs, segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// fails with a configuration error when the CRS is angular, since lengths,
    /// spacings and buffer radii would be in degrees.
    pub fn require_metric(&self) -> Result<(), CqiError> {
        if self.crs.is_metric() {
            Ok(())
        } else {
            Err(CqiError::ConfigurationError(format!(
                "segment collection uses angular CRS {}, a projected (metric) CRS is required",
                self.crs
            )))
        }
    }

    /// position of each segment in this collection by its id
    pub fn index_lookup(&self) -> HashMap<SegmentId, usize> {
        self.segments
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.id, idx))
            .collect()
    }

    /// concatenates collections in order, assigning fresh dense ids. all
    /// collections must share a CRS.
    pub fn merge(collections: Vec<SegmentCollection>) -> Result<SegmentCollection, CqiError> {
        let mut iter = collections.into_iter();
        let first = iter.next().ok_or_else(|| {
            CqiError::ConfigurationError(String::from("no segment collections to merge"))
        })?;
        let crs = first.crs;
        let mut segments = first.segments;
        for other in iter {
            if other.crs != crs {
                return Err(CqiError::ConfigurationError(format!(
                    "cannot merge segment collections in {} and {}, reproject first",
                    crs, other.crs
                )));
            }
            segments.extend(other.segments);
        }
        Ok(SegmentCollection::new(crs, segments).rekey())
    }

    /// reassigns ids 0..n in collection order
    pub fn rekey(self) -> SegmentCollection {
        let segments = self
            .segments
            .into_iter()
            .enumerate()
            .map(|(idx, s)| s.with_id(SegmentId(idx)))
            .collect();
        SegmentCollection::new(self.crs, segments)
    }
}
