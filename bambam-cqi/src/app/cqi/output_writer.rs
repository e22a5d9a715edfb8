use super::CqiRunOutput;
use crate::model::network::{
    geojson_ops, segment_ops, CqiError, OffsetLine, OffsetSide, PipelineStage, Segment,
    StageReport,
};
use csv::QuoteStyle;
use flate2::{write::GzEncoder, Compression};
use geo::LineString;
use kdam::tqdm;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// file format of a run's output, chosen by the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    GeoJson,
    Csv,
    CsvGz,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<(OutputFormat, &'static str), CqiError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let matched = [
            (".csv.gz", OutputFormat::CsvGz),
            (".csv", OutputFormat::Csv),
            (".geojson", OutputFormat::GeoJson),
            (".json", OutputFormat::GeoJson),
        ]
        .into_iter()
        .find(|(suffix, _)| name.ends_with(suffix) && name.len() > suffix.len());
        match matched {
            Some((suffix, format)) => Ok((format, suffix)),
            None => Err(CqiError::ConfigurationError(format!(
                "unsupported output file type: {}, expected .geojson, .json, .csv or .csv.gz",
                path.to_string_lossy()
            ))),
        }
    }

    /// path of the offset line file written next to `path`: the same name with
    /// `_offsets` inserted before the extension.
    pub fn offsets_path(path: &Path) -> Result<PathBuf, CqiError> {
        let (_, suffix) = OutputFormat::from_path(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let stem = &name[..name.len() - suffix.len()];
        let original_suffix = &name[name.len() - suffix.len()..];
        Ok(path.with_file_name(format!("{stem}_offsets{original_suffix}")))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentRow {
    pub segment_id: usize,
    pub source_id: Option<String>,
    pub highway: Option<String>,
    pub cycleway: Option<String>,
    pub cycleway_left: Option<String>,
    pub cycleway_right: Option<String>,
    pub cycleway_both: Option<String>,
    pub cycleway_segregated: Option<String>,
    pub bicycle: Option<String>,
    pub lanes: Option<String>,
    pub maxspeed: Option<String>,
    pub name: Option<String>,
    pub surface: Option<String>,
    pub lit: Option<String>,
    pub oneway: Option<String>,
    pub length_m: Option<f64>,
    pub sidepath_presence: Option<bool>,
    pub proc_maxspeed: Option<f64>,
    pub has_physical_barrier: Option<bool>,
    pub cqi: Option<f64>,
    pub lts: Option<u8>,
    pub proc_slope: Option<f64>,
    pub fac_5: Option<f64>,
    #[serde(serialize_with = "segment_ops::serialize_linestring")]
    pub geometry: LineString<f64>,
}

impl From<&Segment> for SegmentRow {
    fn from(value: &Segment) -> Self {
        let tags = value.tags.clone();
        SegmentRow {
            segment_id: value.id.0,
            source_id: value.source_id.clone(),
            highway: tags.highway,
            cycleway: tags.cycleway,
            cycleway_left: tags.cycleway_left,
            cycleway_right: tags.cycleway_right,
            cycleway_both: tags.cycleway_both,
            cycleway_segregated: tags.cycleway_segregated,
            bicycle: tags.bicycle,
            lanes: tags.lanes,
            maxspeed: tags.maxspeed,
            name: tags.name,
            surface: tags.surface,
            lit: tags.lit,
            oneway: tags.oneway,
            length_m: value.length_m,
            sidepath_presence: value.sidepath_presence,
            proc_maxspeed: value.proc_maxspeed,
            has_physical_barrier: value.has_physical_barrier,
            cqi: value.cqi,
            lts: value.lts,
            proc_slope: value.proc_slope,
            fac_5: value.fac_5,
            geometry: value.linestring.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OffsetRow {
    pub segment_id: usize,
    pub side: OffsetSide,
    #[serde(serialize_with = "segment_ops::serialize_linestring")]
    pub geometry: LineString<f64>,
}

impl From<&OffsetLine> for OffsetRow {
    fn from(value: &OffsetLine) -> Self {
        OffsetRow {
            segment_id: value.segment_id.0,
            side: value.side,
            geometry: value.linestring.clone(),
        }
    }
}

/// writes the scored segments to `path` and, when offsets were generated, the
/// offset lines to the companion offsets file. existing files are left in place
/// unless `overwrite` is set.
pub fn write_output(
    output: &CqiRunOutput,
    path: &Path,
    overwrite: bool,
) -> Result<StageReport, CqiError> {
    write_files(output, path, overwrite).map_err(|e| e.in_stage(PipelineStage::Write))
}

fn write_files(
    output: &CqiRunOutput,
    path: &Path,
    overwrite: bool,
) -> Result<StageReport, CqiError> {
    let (format, _) = OutputFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CqiError::IoError(parent.to_string_lossy().to_string(), e))?;
        }
    }
    let write_offsets = output.summary.report(PipelineStage::Offset).is_some();
    let offsets_path = OutputFormat::offsets_path(path)?;
    let crs = &output.segments.crs;
    let mut written = 0;

    match format {
        OutputFormat::GeoJson => {
            let features = tqdm!(
                output.segments.iter(),
                total = output.segments.len(),
                desc = "segment features"
            )
            .map(geojson_ops::segment_feature)
            .collect::<Vec<_>>();
            eprintln!();
            if geojson_ops::write_feature_collection(path, features, crs, overwrite)? {
                written += output.segments.len();
            }
            if write_offsets {
                let features = output
                    .offsets
                    .iter()
                    .map(geojson_ops::offset_feature)
                    .collect::<Vec<_>>();
                if geojson_ops::write_feature_collection(&offsets_path, features, crs, overwrite)?
                {
                    written += output.offsets.len();
                }
            }
        }
        OutputFormat::Csv | OutputFormat::CsvGz => {
            let gzip = format == OutputFormat::CsvGz;
            let rows = output.segments.segments.iter().map(SegmentRow::from);
            if write_csv(path, rows, gzip, overwrite)? {
                written += output.segments.len();
            }
            if write_offsets {
                let rows = output.offsets.iter().map(OffsetRow::from);
                if write_csv(&offsets_path, rows, gzip, overwrite)? {
                    written += output.offsets.len();
                }
            }
        }
    }

    let total = output.segments.len()
        + if write_offsets {
            output.offsets.len()
        } else {
            0
        };
    Ok(StageReport::new(PipelineStage::Write, total, written, 0))
}

/// writes rows to a CSV file, gzip-compressed if requested. returns false
/// without writing when the file exists and overwrite is not set.
fn write_csv<T: Serialize>(
    path: &Path,
    rows: impl ExactSizeIterator<Item = T>,
    gzip: bool,
    overwrite: bool,
) -> Result<bool, CqiError> {
    let path_str = path.to_string_lossy().to_string();
    if path.exists() && !overwrite {
        log::warn!("{path_str} exists and overwrite is not set, skipping");
        return Ok(false);
    }
    let file = File::create(path).map_err(|e| CqiError::IoError(path_str.clone(), e))?;
    if gzip {
        let writer = serialize_rows(
            create_writer(GzEncoder::new(file, Compression::default())),
            rows,
            &path_str,
        )?;
        let encoder = writer
            .into_inner()
            .map_err(|e| CqiError::IoError(path_str.clone(), e.into_error()))?;
        encoder
            .finish()
            .map_err(|e| CqiError::IoError(path_str.clone(), e))?;
    } else {
        let mut writer = serialize_rows(create_writer(file), rows, &path_str)?;
        writer
            .flush()
            .map_err(|e| CqiError::IoError(path_str.clone(), e))?;
    }
    log::info!("wrote {path_str}");
    Ok(true)
}

fn create_writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(inner)
}

fn serialize_rows<W: Write, T: Serialize>(
    mut writer: csv::Writer<W>,
    rows: impl ExactSizeIterator<Item = T>,
    path_str: &str,
) -> Result<csv::Writer<W>, CqiError> {
    let total = rows.len();
    let iter = tqdm!(rows, total = total, desc = "write rows");
    for row in iter {
        writer
            .serialize(row)
            .map_err(|e| CqiError::CsvWriteError(String::from(path_str), e))?;
    }
    eprintln!();
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::{write_output, OutputFormat};
    use crate::algorithm::reprojection::SphericalMercator;
    use crate::app::cqi::CqiPipeline;
    use crate::config::CqiConfiguration;
    use crate::model::network::{
        Crs, PipelineStage, Segment, SegmentCollection, SegmentId, SegmentTags,
    };
    use flate2::read::GzDecoder;
    use geo::line_string;
    use std::io::Read;
    use std::path::{Path, PathBuf};

    fn run_output() -> super::CqiRunOutput {
        // a square, so that no endpoint is a dead end
        let lines = vec![
            line_string![(x: 0.0, y: 0.0), (x: 40.0, y: 0.0)],
            line_string![(x: 40.0, y: 0.0), (x: 40.0, y: 40.0)],
            line_string![(x: 40.0, y: 40.0), (x: 0.0, y: 40.0)],
            line_string![(x: 0.0, y: 40.0), (x: 0.0, y: 0.0)],
        ];
        let segments = lines
            .into_iter()
            .enumerate()
            .map(|(idx, ls)| {
                let tags = SegmentTags {
                    name: Some(format!("side, {idx}")),
                    ..Default::default()
                };
                Segment::new(SegmentId(idx), Some(format!("way/{idx}")), ls, tags)
            })
            .collect::<Result<Vec<_>, _>>()
            .expect("test invariant: valid segments");
        let conf = CqiConfiguration {
            parallelize: false,
            ..Default::default()
        };
        let pipeline = CqiPipeline::new(conf, Box::new(SphericalMercator))
            .expect("test invariant: valid pipeline");
        pipeline
            .run(&SegmentCollection::new(Crs::WEB_MERCATOR, segments))
            .expect("test invariant: pipeline runs")
    }

    fn out_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bambam-cqi-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn format_from_extension() {
        let cases = [
            ("out.geojson", OutputFormat::GeoJson),
            ("out.JSON", OutputFormat::GeoJson),
            ("out.csv", OutputFormat::Csv),
            ("out.csv.gz", OutputFormat::CsvGz),
        ];
        for (name, expected) in cases {
            match OutputFormat::from_path(Path::new(name)) {
                Ok((format, _)) => assert_eq!(format, expected, "{name}"),
                Err(e) => panic!("{e}"),
            }
        }
        assert!(OutputFormat::from_path(Path::new("out.shp")).is_err());
        assert!(OutputFormat::from_path(Path::new(".csv")).is_err());
    }

    #[test]
    fn offsets_file_name() {
        let offsets = OutputFormat::offsets_path(Path::new("dir/cqi.csv.gz")).expect("path");
        assert_eq!(offsets, PathBuf::from("dir/cqi_offsets.csv.gz"));
        let offsets = OutputFormat::offsets_path(Path::new("cqi.geojson")).expect("path");
        assert_eq!(offsets, PathBuf::from("cqi_offsets.geojson"));
    }

    #[test]
    fn writes_geojson_with_offsets() {
        let output = run_output();
        let dir = out_dir("geojson");
        let path = dir.join("cqi.geojson");
        let report = match write_output(&output, &path, false) {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(report.output, 4 + 8);
        let text = std::fs::read_to_string(&path).expect("output exists");
        let fc: geojson::FeatureCollection = text.parse().expect("valid GeoJSON");
        assert_eq!(fc.features.len(), 4);
        let first = &fc.features[0];
        assert_eq!(first.property("source_id"), Some(&serde_json::json!("way/0")));
        assert!(first.property("cqi").is_some());
        assert!(dir.join("cqi_offsets.geojson").exists());

        // a second write without overwrite leaves the files alone
        let again = write_output(&output, &path, false).expect("second write");
        assert_eq!(again.output, 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn writes_gzipped_csv() {
        let output = run_output();
        let dir = out_dir("csv");
        let path = dir.join("cqi.csv.gz");
        if let Err(e) = write_output(&output, &path, true) {
            panic!("{e}");
        }
        let mut text = String::new();
        GzDecoder::new(std::fs::File::open(&path).expect("output exists"))
            .read_to_string(&mut text)
            .expect("valid gzip");
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().expect("headers").clone();
        assert!(headers.iter().any(|h| h == "cqi"));
        assert!(headers.iter().any(|h| h == "geometry"));
        let rows = reader.records().collect::<Result<Vec<_>, _>>().expect("rows");
        assert_eq!(rows.len(), 4);
        assert!(rows[0].iter().any(|v| v.starts_with("LINESTRING")));
        assert!(dir.join("cqi_offsets.csv.gz").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_failures_name_the_write_stage() {
        let output = run_output();
        let dir = out_dir("unknown-format");
        match write_output(&output, &dir.join("cqi.shp"), true) {
            Err(e) => assert_eq!(e.stage(), Some(PipelineStage::Write)),
            Ok(_) => panic!("expected an unsupported format failure"),
        }
    }
}
