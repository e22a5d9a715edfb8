use super::{geojson_ops, CqiError, Crs, PipelineStage, SegmentCollection, StageReport};
use crate::algorithm::reprojection::{self, Reprojector};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum NetworkSource {
    /// GeoJSON files of line features. a directory path stands for every
    /// `.geojson` file in it, in file name order.
    GeoJson { paths: Vec<String> },
}

impl NetworkSource {
    /// reads all inputs, reprojects each into the target CRS and merges them
    /// into one collection with fresh segment ids. a schema problem in any
    /// input fails the whole load. failures are tagged with the load stage.
    pub fn load(
        &self,
        reprojector: &dyn Reprojector,
        target: &Crs,
    ) -> Result<(SegmentCollection, StageReport), CqiError> {
        self.load_inputs(reprojector, target)
            .map_err(|e| e.in_stage(PipelineStage::Load))
    }

    fn load_inputs(
        &self,
        reprojector: &dyn Reprojector,
        target: &Crs,
    ) -> Result<(SegmentCollection, StageReport), CqiError> {
        match self {
            NetworkSource::GeoJson { paths } => {
                let files = expand_paths(paths)?;
                let mut collections = Vec::with_capacity(files.len());
                let mut n_features = 0;
                let mut n_skipped = 0;
                for file in files.iter() {
                    log::info!("reading network from {}", file.to_string_lossy());
                    let layer = geojson_ops::read_segments(file)?;
                    n_features += layer.features;
                    n_skipped += layer.skipped;
                    let projected =
                        reprojection::reproject_collection(&layer.collection, reprojector, target)?;
                    collections.push(projected);
                }
                let merged = SegmentCollection::merge(collections)?;
                log::info!(
                    "loaded {} segments from {} features in {} file(s)",
                    merged.len(),
                    n_features,
                    files.len()
                );
                let report = StageReport::new(PipelineStage::Load, n_features, merged.len(), n_skipped);
                Ok((merged, report))
            }
        }
    }
}

fn expand_paths(paths: &[String]) -> Result<Vec<PathBuf>, CqiError> {
    if paths.is_empty() {
        return Err(CqiError::ConfigurationError(String::from(
            "no network input paths provided",
        )));
    }
    let mut files = vec![];
    for p in paths.iter() {
        let path = Path::new(p);
        if path.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|e| CqiError::IoError(p.clone(), e))?;
            let geojson_files = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|f| {
                    f.extension()
                        .map(|ext| ext.eq_ignore_ascii_case("geojson"))
                        .unwrap_or(false)
                })
                .sorted()
                .collect_vec();
            if geojson_files.is_empty() {
                return Err(CqiError::ConfigurationError(format!(
                    "directory {p} contains no .geojson files"
                )));
            }
            files.extend(geojson_files);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            return Err(CqiError::ConfigurationError(format!(
                "network input {p} does not exist"
            )));
        }
    }
    Ok(files)
}
