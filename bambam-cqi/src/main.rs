use bambam_cqi::{
    app::cqi::{self, CqiPipeline},
    config::CqiConfiguration,
    model::{network::NetworkSource, CqiCliError},
};
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CqiAppArguments {
    #[command(subcommand)]
    app: App,
}

#[derive(Subcommand)]
pub enum App {
    /// score a street network with the cycling quality index
    Run {
        #[arg(long, required = true, num_args = 1.., help = "GeoJSON network files or directories of them")]
        input: Vec<String>,
        #[arg(long, help = "output file (.geojson, .json, .csv or .csv.gz)")]
        output: String,
        #[arg(long, help = "path to .toml or .json file with bambam-cqi run parameters")]
        configuration_file: Option<String>,
        #[arg(long, help = "ESRI ASCII grid of slopes, in the metric CRS, for the slope factor")]
        slope_raster: Option<String>,
    },
}

pub fn run(app: &App) -> Result<(), CqiCliError> {
    env_logger::init();
    match app {
        App::Run {
            input,
            output,
            configuration_file,
            slope_raster,
        } => {
            let conf = match configuration_file {
                None => Ok(CqiConfiguration::default()),
                Some(f) => {
                    log::info!("reading bambam-cqi configuration from {f}");
                    CqiConfiguration::try_from(f)
                }
            }?;
            log::info!(
                "bambam-cqi configuration: {}",
                serde_json::to_string(&conf)?
            );
            let pipeline =
                CqiPipeline::from_configuration(&conf, slope_raster.as_deref().map(Path::new))?;
            let source = NetworkSource::GeoJson {
                paths: input.clone(),
            };
            let (network, load_report) =
                source.load(pipeline.reprojector(), pipeline.target_crs())?;
            load_report.log();
            let result = pipeline.run(&network)?;
            match cqi::write_output(&result, Path::new(output), conf.overwrite) {
                Ok(report) => {
                    report.log();
                    eprintln!("finished.");
                    Ok(())
                }
                Err(e) => {
                    log::error!("bambam-cqi failed: {e}");
                    Err(e)?
                }
            }
        }
    }
}

fn main() {
    let args = CqiAppArguments::parse();
    if let Err(e) = run(&args.app) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
