use super::{slope_ops, RasterSampler, SegmentFactor, SlopeFactor, SlopeUnit, StatChoice};
use crate::algorithm::sampling;
use crate::model::network::{CqiError, Segment};
use geo::Point;

/// derives a slope factor from a slope raster sampled along each segment.
pub struct SlopeFactorModel {
    raster: Box<dyn RasterSampler>,
    spacing: f64,
    unit: SlopeUnit,
    stat_choice: StatChoice,
}

impl SlopeFactorModel {
    pub fn new(
        raster: Box<dyn RasterSampler>,
        spacing: f64,
        unit: SlopeUnit,
        stat_choice: StatChoice,
    ) -> Result<SlopeFactorModel, CqiError> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(CqiError::ConfigurationError(format!(
                "slope sample spacing must be a positive number, found {spacing}"
            )));
        }
        Ok(SlopeFactorModel {
            raster,
            spacing,
            unit,
            stat_choice,
        })
    }

    /// raster values at the segment's sample points and its terminal vertex,
    /// ignoring points that fall outside the raster.
    pub fn slope_samples(&self, segment: &Segment) -> Vec<f64> {
        let mut points: Vec<Point<f64>> = sampling::sample_segment(segment, self.spacing)
            .map(|samples| samples.into_iter().map(|s| s.point).collect())
            .unwrap_or_default();
        let end = Point::from(segment.end());
        if points.last() != Some(&end) {
            points.push(end);
        }
        points
            .iter()
            .filter_map(|p| self.raster.sample(p))
            .collect()
    }
}

impl SegmentFactor for SlopeFactorModel {
    fn segment_factor(&self, segment: &Segment) -> Option<SlopeFactor> {
        let samples = self.slope_samples(segment);
        let slope = self.stat_choice.resolve(&samples)?;
        let percent = self.unit.to_percent(slope);
        Some(SlopeFactor {
            proc_slope: slope_ops::round2(percent),
            factor: slope_ops::round2(slope_ops::percent_to_factor(percent)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SlopeFactorModel;
    use crate::app::slope::{
        GridRasterSampler, SegmentFactor, SlopeFactor, SlopeUnit, StatChoice,
    };
    use crate::model::network::{Segment, SegmentId, SegmentTags};
    use geo::line_string;

    /// a 4x1 raster of 10 unit cells along the x axis, in percent
    fn raster() -> Box<GridRasterSampler> {
        let r = GridRasterSampler::new(4, 1, (0.0, -5.0), 10.0, None, vec![0.5, 2.0, 4.0, 12.0])
            .expect("test invariant: valid raster");
        Box::new(r)
    }

    fn segment(x0: f64, x1: f64) -> Segment {
        Segment::new(
            SegmentId(0),
            None,
            line_string![(x: x0, y: 0.0), (x: x1, y: 0.0)],
            SegmentTags::default(),
        )
        .expect("test invariant: valid segment")
    }

    #[test]
    fn samples_include_terminal_vertex() {
        let model = SlopeFactorModel::new(raster(), 10.0, SlopeUnit::Percent, StatChoice::Max)
            .expect("model");
        // offsets 0, 10, 20 plus the end at 25
        assert_eq!(model.slope_samples(&segment(0.0, 25.0)), vec![0.5, 2.0, 4.0, 4.0]);
        // offsets 0, 10, 20, 30 where 30 is also the end
        assert_eq!(model.slope_samples(&segment(0.0, 30.0)).len(), 4);
    }

    #[test]
    fn factor_from_chosen_statistic() {
        let model = SlopeFactorModel::new(raster(), 10.0, SlopeUnit::Percent, StatChoice::Max)
            .expect("model");
        let expected = SlopeFactor {
            proc_slope: 12.0,
            factor: 0.3,
        };
        assert_eq!(model.segment_factor(&segment(0.0, 35.0)), Some(expected));

        let mean = SlopeFactorModel::new(raster(), 10.0, SlopeUnit::Percent, StatChoice::Mean)
            .expect("model");
        // mean of 0.5, 2.0, 4.0 is 2.1666..
        let expected = SlopeFactor {
            proc_slope: 2.17,
            factor: 0.95,
        };
        assert_eq!(mean.segment_factor(&segment(0.0, 20.0)), Some(expected));
    }

    #[test]
    fn no_samples_gives_no_factor() {
        let model = SlopeFactorModel::new(raster(), 10.0, SlopeUnit::Percent, StatChoice::Q3)
            .expect("model");
        assert_eq!(model.segment_factor(&segment(100.0, 150.0)), None);
    }
}
