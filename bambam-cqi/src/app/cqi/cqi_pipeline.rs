use super::{cqi_ops, CqiRunOutput, CqiRunSummary};
use crate::algorithm::reprojection::{self, Reprojector, SphericalMercator};
use crate::algorithm::{offset, sampling, sidepath, topology};
use crate::app::exclusion::ExclusionList;
use crate::app::lts;
use crate::app::slope::{self, GridRasterSampler, SegmentFactor, SlopeFactorModel};
use crate::config::CqiConfiguration;
use crate::model::network::{CqiError, Crs, PipelineStage, SegmentCollection, StageReport};
use std::path::Path;

/// runs the cycling quality index stages in order over a segment collection.
/// any stage failure aborts the run and names the failing stage.
pub struct CqiPipeline {
    configuration: CqiConfiguration,
    target_crs: Crs,
    reprojector: Box<dyn Reprojector>,
    exclusions: Option<ExclusionList>,
    slope_factor: Option<Box<dyn SegmentFactor>>,
}

impl CqiPipeline {
    pub fn new(
        configuration: CqiConfiguration,
        reprojector: Box<dyn Reprojector>,
    ) -> Result<CqiPipeline, CqiError> {
        configuration.validate()?;
        let target_crs = configuration.target_crs()?;
        Ok(CqiPipeline {
            configuration,
            target_crs,
            reprojector,
            exclusions: None,
            slope_factor: None,
        })
    }

    /// builds a pipeline with the built-in reprojector, reading the exclusion
    /// list and slope raster named by the configuration.
    pub fn from_configuration(
        configuration: &CqiConfiguration,
        slope_raster: Option<&Path>,
    ) -> Result<CqiPipeline, CqiError> {
        let mut pipeline = CqiPipeline::new(configuration.clone(), Box::new(SphericalMercator))?;
        if let Some(f) = &configuration.exclude_ids_file {
            let exclusions = ExclusionList::from_geojson(Path::new(f))
                .map_err(|e| e.in_stage(PipelineStage::Exclude))?;
            pipeline = pipeline.with_exclusions(exclusions);
        }
        if let Some(raster_file) = slope_raster {
            let raster = GridRasterSampler::from_file(raster_file)
                .map_err(|e| e.in_stage(PipelineStage::Slope))?;
            let model = SlopeFactorModel::new(
                Box::new(raster),
                configuration.point_spacing,
                configuration.slope_unit,
                configuration.stat_choice,
            )
            .map_err(|e| e.in_stage(PipelineStage::Slope))?;
            pipeline = pipeline.with_slope_factor(Box::new(model));
        }
        Ok(pipeline)
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> CqiPipeline {
        self.exclusions = Some(exclusions);
        self
    }

    pub fn with_slope_factor(mut self, slope_factor: Box<dyn SegmentFactor>) -> CqiPipeline {
        self.slope_factor = Some(slope_factor);
        self
    }

    pub fn target_crs(&self) -> &Crs {
        &self.target_crs
    }

    pub fn reprojector(&self) -> &dyn Reprojector {
        self.reprojector.as_ref()
    }

    pub fn run(&self, collection: &SegmentCollection) -> Result<CqiRunOutput, CqiError> {
        let conf = &self.configuration;
        let parallelize = conf.parallelize;
        let mut summary = CqiRunSummary::default();

        let excluded = match &self.exclusions {
            Some(list) => {
                log::info!("  (((1))) removing {} excluded ids", list.len());
                let (excluded, report) = list.apply(collection);
                summary.push(report);
                excluded
            }
            None => {
                log::info!("  (((1))) removing excluded ids (skipped)");
                collection.clone()
            }
        };

        log::info!("  (((2))) reprojecting network to {}", self.target_crs);
        let projected = reprojection::reproject_collection(
            &excluded,
            self.reprojector.as_ref(),
            &self.target_crs,
        )
        .map_err(|e| e.in_stage(PipelineStage::Load))?;

        log::info!("  (((3))) cleaning network topology");
        let cleaned = self
            .clean(&projected, &mut summary)
            .map_err(|e| e.in_stage(PipelineStage::Clean))?;

        log::info!("  (((4))) sampling points every {}", conf.point_spacing);
        let (samples, report) = sampling::sample_points(&cleaned, conf.point_spacing, parallelize)
            .map_err(|e| e.in_stage(PipelineStage::Sample))?;
        summary.push(report);

        log::info!(
            "  (((5))) detecting sidepaths within {}",
            conf.buffer_distance
        );
        let (sidepaths, report) = sidepath::detect_sidepaths(
            &cleaned,
            &samples,
            conf.buffer_distance,
            conf.sidepath_self_match,
            parallelize,
        )
        .map_err(|e| e.in_stage(PipelineStage::Sidepath))?;
        summary.push(report);
        drop(samples);

        let offsets = if conf.generate_offsets {
            log::info!("  (((6))) generating offsets at {}", conf.offset_distance);
            let (offsets, report) =
                offset::generate_offsets(&cleaned, conf.offset_distance, parallelize)
                    .map_err(|e| e.in_stage(PipelineStage::Offset))?;
            summary.push(report);
            offsets
        } else {
            log::info!("  (((6))) generating offsets (skipped)");
            vec![]
        };

        log::info!("  (((7))) scoring segments");
        let (mut segments, report) =
            cqi_ops::score_collection(&cleaned, &sidepaths, &conf.weights, parallelize)
                .map_err(|e| e.in_stage(PipelineStage::Score))?;
        summary.push(report);

        if conf.compute_lts {
            log::info!("  (((8))) estimating level of traffic stress");
            let (annotated, report) =
                lts::annotate_lts(&segments).map_err(|e| e.in_stage(PipelineStage::Lts))?;
            summary.push(report);
            segments = annotated;
        } else {
            log::info!("  (((8))) estimating level of traffic stress (skipped)");
        }

        match &self.slope_factor {
            Some(model) => {
                log::info!("  (((9))) computing slope factor");
                let (annotated, report) = slope::annotate_slope(&segments, model.as_ref())
                    .map_err(|e| e.in_stage(PipelineStage::Slope))?;
                summary.push(report);
                segments = annotated;
            }
            None => log::info!("  (((9))) computing slope factor (skipped)"),
        }

        log::info!(
            "scored {} segments with {} offsets, {} records skipped",
            segments.len(),
            offsets.len(),
            summary.total_skipped()
        );
        Ok(CqiRunOutput {
            segments,
            offsets,
            summary,
        })
    }

    /// dead-end pruning repeated up to the configured number of passes, stopping
    /// once a pass removes nothing, then the minimum length filter.
    fn clean(
        &self,
        collection: &SegmentCollection,
        summary: &mut CqiRunSummary,
    ) -> Result<SegmentCollection, CqiError> {
        let conf = &self.configuration;
        let mut current = collection.clone();
        for pass in 1..conf.dead_end_passes {
            let pruned = topology::prune_once(&current, conf.endpoint_tolerance)?;
            let unchanged = pruned.len() == current.len();
            current = pruned;
            if unchanged {
                log::debug!("dead-end pruning converged after {pass} pass(es)");
                break;
            }
        }
        let (cleaned, report) =
            topology::clean(&current, conf.min_length, conf.endpoint_tolerance)?;
        summary.push(StageReport::new(
            PipelineStage::Clean,
            collection.len(),
            report.output,
            report.skipped,
        ));
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::CqiPipeline;
    use crate::algorithm::reprojection::SphericalMercator;
    use crate::algorithm::sidepath::SelfMatchPolicy;
    use crate::app::exclusion::ExclusionList;
    use crate::app::slope::{SegmentFactor, SlopeFactor};
    use crate::config::CqiConfiguration;
    use crate::model::network::{
        CqiError, Crs, PipelineStage, Segment, SegmentCollection, SegmentId, SegmentTags,
    };
    use geo::{line_string, LineString};
    use std::path::Path;

    fn collection(crs: Crs, lines: Vec<(Option<&str>, LineString<f64>, SegmentTags)>) -> SegmentCollection {
        let segments = lines
            .into_iter()
            .enumerate()
            .map(|(idx, (id, ls, tags))| Segment::new(SegmentId(idx), id.map(String::from), ls, tags))
            .collect::<Result<Vec<_>, _>>()
            .expect("test invariant: valid segments");
        SegmentCollection::new(crs, segments)
    }

    /// a short loop, a dead-end spur and one through segment
    fn three_segments() -> SegmentCollection {
        collection(
            Crs::WEB_MERCATOR,
            vec![
                (
                    Some("way/1"),
                    line_string![
                        (x: 0.0, y: 0.0),
                        (x: 1.25, y: 0.0),
                        (x: 1.25, y: 1.25),
                        (x: 0.0, y: 1.25),
                        (x: 0.0, y: 0.0)
                    ],
                    SegmentTags::default(),
                ),
                (
                    Some("way/2"),
                    line_string![(x: 30.0, y: 0.0), (x: 30.0, y: 50.0)],
                    SegmentTags::default(),
                ),
                (
                    Some("way/3"),
                    line_string![(x: 0.0, y: 0.0), (x: 30.0, y: 0.0)],
                    SegmentTags::default(),
                ),
            ],
        )
    }

    fn sequential() -> CqiConfiguration {
        CqiConfiguration {
            parallelize: false,
            ..Default::default()
        }
    }

    #[test]
    fn end_to_end_keeps_only_through_segment() {
        let pipeline = CqiPipeline::new(sequential(), Box::new(SphericalMercator))
            .expect("test invariant: valid pipeline");
        let output = match pipeline.run(&three_segments()) {
            Ok(o) => o,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(output.segments.len(), 1);
        let c = &output.segments.segments[0];
        assert_eq!(c.source_id.as_deref(), Some("way/3"));
        assert_eq!(c.length_m, Some(30.0));
        // a sidepath through self-inclusion, no barrier, no speed
        assert_eq!(c.sidepath_presence, Some(true));
        assert!((c.cqi.unwrap_or_default() - 0.7).abs() < 1e-12);
        assert_eq!(output.offsets.len(), 2);
        let clean = output
            .summary
            .report(PipelineStage::Clean)
            .expect("clean stage reported");
        assert_eq!((clean.input, clean.output), (3, 1));
        assert!(output.summary.report(PipelineStage::Lts).is_none());
    }

    #[test]
    fn excluded_self_match_and_lts() {
        let conf = CqiConfiguration {
            sidepath_self_match: SelfMatchPolicy::Exclude,
            compute_lts: true,
            generate_offsets: false,
            ..sequential()
        };
        let pipeline = CqiPipeline::new(conf, Box::new(SphericalMercator))
            .expect("test invariant: valid pipeline");
        let output = pipeline.run(&three_segments()).expect("run");
        let c = &output.segments.segments[0];
        assert_eq!(c.sidepath_presence, Some(false));
        assert!((c.cqi.unwrap_or_default() - 0.4).abs() < 1e-12);
        assert_eq!(c.lts, Some(2));
        assert!(output.offsets.is_empty());
    }

    #[test]
    fn repeated_pruning_removes_cascading_dead_ends() {
        // a triangle with a two-segment tail
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)],
            line_string![(x: 100.0, y: 0.0), (x: 50.0, y: 80.0)],
            line_string![(x: 50.0, y: 80.0), (x: 0.0, y: 0.0)],
            line_string![(x: 100.0, y: 0.0), (x: 150.0, y: 0.0)],
            line_string![(x: 150.0, y: 0.0), (x: 200.0, y: 0.0)],
        ];
        let input = collection(
            Crs::WEB_MERCATOR,
            lines
                .into_iter()
                .map(|ls| (None, ls, SegmentTags::default()))
                .collect(),
        );
        for (passes, expected) in [(1, 4), (2, 3), (10, 3)] {
            let conf = CqiConfiguration {
                dead_end_passes: passes,
                ..sequential()
            };
            let pipeline = CqiPipeline::new(conf, Box::new(SphericalMercator))
                .expect("test invariant: valid pipeline");
            let output = pipeline.run(&input).expect("run");
            assert_eq!(output.segments.len(), expected, "{passes} passes");
        }
    }

    #[test]
    fn exclusions_and_slope_factor() {
        struct Flat;
        impl SegmentFactor for Flat {
            fn segment_factor(&self, _segment: &Segment) -> Option<SlopeFactor> {
                Some(SlopeFactor {
                    proc_slope: 0.5,
                    factor: 1.0,
                })
            }
        }
        let pipeline = CqiPipeline::new(sequential(), Box::new(SphericalMercator))
            .expect("test invariant: valid pipeline")
            .with_exclusions(ExclusionList::new(["2"]))
            .with_slope_factor(Box::new(Flat));
        let output = pipeline.run(&three_segments()).expect("run");
        // without the spur, the through segment is itself a dead end
        assert!(output.segments.is_empty());
        let exclude = output
            .summary
            .report(PipelineStage::Exclude)
            .expect("exclude stage reported");
        assert_eq!((exclude.input, exclude.output), (3, 2));
        assert!(output.summary.report(PipelineStage::Slope).is_some());
    }

    #[test]
    fn failures_name_the_stage() {
        let pipeline = CqiPipeline::new(sequential(), Box::new(SphericalMercator))
            .expect("test invariant: valid pipeline");
        let unsupported = collection(
            Crs::Epsg(27700),
            vec![(None, line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)], SegmentTags::default())],
        );
        match pipeline.run(&unsupported) {
            Err(e) => assert_eq!(e.stage(), Some(PipelineStage::Load)),
            Ok(_) => panic!("expected reprojection failure"),
        }
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let conf = CqiConfiguration {
            point_spacing: 0.0,
            ..Default::default()
        };
        match CqiPipeline::new(conf, Box::new(SphericalMercator)) {
            Err(CqiError::ConfigurationError(_)) => {}
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("expected configuration error"),
        }
    }

    #[test]
    fn unreadable_inputs_name_their_stage() {
        let missing_exclusions = CqiConfiguration {
            exclude_ids_file: Some(String::from("/does/not/exist/exclude.geojson")),
            ..sequential()
        };
        match CqiPipeline::from_configuration(&missing_exclusions, None) {
            Err(e) => assert_eq!(e.stage(), Some(PipelineStage::Exclude)),
            Ok(_) => panic!("expected exclusion file failure"),
        }
        match CqiPipeline::from_configuration(
            &sequential(),
            Some(Path::new("/does/not/exist/slope.asc")),
        ) {
            Err(e) => assert_eq!(e.stage(), Some(PipelineStage::Slope)),
            Ok(_) => panic!("expected raster file failure"),
        }
    }
}
