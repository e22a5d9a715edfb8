use crate::model::network::{CqiError, Segment};
use geo::Coord;
use std::collections::HashMap;

/// counts the segment endpoints touching each coordinate. coordinates are
/// snapped to a grid of `tolerance` units so that nearly-equal endpoints share
/// a key; each grid cell is interned to a dense index which holds its count.
#[derive(Debug, Clone)]
pub struct EndpointDegreeTable {
    tolerance: f64,
    keys: HashMap<(i64, i64), usize>,
    degrees: Vec<usize>,
}

impl EndpointDegreeTable {
    pub fn new(tolerance: f64) -> Result<EndpointDegreeTable, CqiError> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(CqiError::ConfigurationError(format!(
                "endpoint tolerance must be a positive number, found {tolerance}"
            )));
        }
        Ok(EndpointDegreeTable {
            tolerance,
            keys: HashMap::new(),
            degrees: vec![],
        })
    }

    /// counts both endpoints of every segment. a closed segment contributes
    /// 2 to its shared endpoint.
    pub fn build<'a>(
        segments: impl IntoIterator<Item = &'a Segment>,
        tolerance: f64,
    ) -> Result<EndpointDegreeTable, CqiError> {
        let mut table = EndpointDegreeTable::new(tolerance)?;
        for segment in segments {
            table.add(segment.start());
            table.add(segment.end());
        }
        Ok(table)
    }

    pub fn add(&mut self, coord: Coord<f64>) {
        let key = self.grid_key(coord);
        let next = self.degrees.len();
        let idx = *self.keys.entry(key).or_insert(next);
        if idx == next {
            self.degrees.push(0);
        }
        self.degrees[idx] += 1;
    }

    /// number of segment endpoints at this coordinate
    pub fn degree(&self, coord: Coord<f64>) -> usize {
        self.keys
            .get(&self.grid_key(coord))
            .map(|idx| self.degrees[*idx])
            .unwrap_or_default()
    }

    pub fn is_dead_end(&self, coord: Coord<f64>) -> bool {
        self.degree(coord) == 1
    }

    /// number of distinct endpoint locations
    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    fn grid_key(&self, coord: Coord<f64>) -> (i64, i64) {
        let x = (coord.x / self.tolerance).round() as i64;
        let y = (coord.y / self.tolerance).round() as i64;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::EndpointDegreeTable;
    use geo::Coord;

    #[test]
    fn nearly_equal_endpoints_share_a_key() {
        let mut table = EndpointDegreeTable::new(0.001).expect("valid tolerance");
        table.add(Coord { x: 10.0, y: 20.0 });
        table.add(Coord {
            x: 10.000_000_000_1,
            y: 19.999_999_999_9,
        });
        table.add(Coord { x: 11.0, y: 20.0 });
        assert_eq!(table.len(), 2);
        assert_eq!(table.degree(Coord { x: 10.0, y: 20.0 }), 2);
        assert!(table.is_dead_end(Coord { x: 11.0, y: 20.0 }));
        assert_eq!(table.degree(Coord { x: 99.0, y: 99.0 }), 0);
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        assert!(EndpointDegreeTable::new(0.0).is_err());
        assert!(EndpointDegreeTable::new(-1.0).is_err());
        assert!(EndpointDegreeTable::new(f64::NAN).is_err());
    }
}
