use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use maint_report::core::config::{Config, StorageConfig};
use maint_report::core::error::{AppError, Result};
use maint_report::features::operator_map::views::CoordinateLines;
use maint_report::features::operator_map::{GeoJsonFileLayer, NoopLayer, OperatorMap};
use maint_report::features::submissions::services::{
    progress_label, FixedLocation, Geolocator, ImageUpload, NoLocation, SubmissionFlow,
};
use maint_report::modules::api::{HttpMaintenanceApi, MaintenanceApi};
use maint_report::modules::storage::{ObjectStore, S3ObjectStore, UploadProgress};
use maint_report::shared::render::render_template;
use maint_report::shared::types::Coordinates;
use maint_report::shared::validation::parse_submission_id;

#[derive(Parser)]
#[command(author, version, about = "Report public maintenance issues and triage them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the report catalog
    Reports,
    /// Upload a picture, wait for its classification and submit it
    Submit {
        /// Picture of the issue
        image: PathBuf,
        /// Report type to submit; repeat for several. Omit to only see the options
        #[arg(short, long = "report")]
        reports: Vec<String>,
        /// Device latitude
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Device longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Write open submissions as GeoJSON markers and list them
    Map {
        /// Marker file, defaults to MAINT_MAP_OUTPUT
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the detail panel of an open submission
    Show { id: String },
    /// Resolve a submission and drop its marker
    Resolve { id: String },
}

#[derive(Serialize)]
struct MarkerLine {
    submission_id: Uuid,
    coords: CoordinateLines,
    title: String,
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let api: Arc<dyn MaintenanceApi> = Arc::new(HttpMaintenanceApi::new(&config.api)?);

    match cli.command {
        Commands::Reports => {
            let catalog = api.list_reports().await?;
            for (id, report) in catalog.iter() {
                println!("{:<24} {}", id, report.name);
            }
        }
        Commands::Submit {
            image,
            reports,
            lat,
            lon,
        } => {
            let storage = StorageConfig::from_env().map_err(AppError::Config)?;
            let store = S3ObjectStore::new(&storage)?;
            tracing::info!("Pictures go to bucket {}", store.bucket_name());
            let store: Arc<dyn ObjectStore> = Arc::new(store);
            let locator: Box<dyn Geolocator> = match (lat, lon) {
                (Some(lat), Some(lon)) => Box::new(FixedLocation(Coordinates::new(lat, lon))),
                _ => Box::new(NoLocation),
            };
            submit(api, store, &config, image, reports, locator.as_ref()).await?;
        }
        Commands::Map { output } => {
            let path = output.unwrap_or_else(|| config.map.output_path.clone());
            tracing::info!("Using map style {}", config.map.style);
            let map = OperatorMap::load(api, GeoJsonFileLayer::new(&path)).await?;

            let markers: Vec<MarkerLine> = map
                .markers()
                .iter()
                .map(|marker| MarkerLine {
                    submission_id: marker.submission_id,
                    coords: marker.coordinates.into(),
                    title: marker.title.clone(),
                })
                .collect();
            print!(
                "{}",
                render_template(
                    "markers.txt",
                    minijinja::context! { count => markers.len(), markers => markers },
                )?
            );
            println!("Markers written to {}", map.layer().path().display());
        }
        Commands::Show { id } => {
            let id = parse_submission_id(&id)?;
            // Read-only: leave the marker file alone
            let mut map = OperatorMap::load(api, NoopLayer).await?;
            let panel = map.select(id)?;
            print!(
                "{}",
                render_template("detail.txt", minijinja::context! { panel => panel })?
            );
        }
        Commands::Resolve { id } => {
            let id = parse_submission_id(&id)?;
            let mut map =
                OperatorMap::load(api, GeoJsonFileLayer::new(&config.map.output_path)).await?;
            map.resolve(id).await?;
            println!(
                "Resolved {}; {} open report(s) left",
                id,
                map.markers().len()
            );
        }
    }

    Ok(())
}

async fn submit(
    api: Arc<dyn MaintenanceApi>,
    store: Arc<dyn ObjectStore>,
    config: &Config,
    image: PathBuf,
    reports: Vec<String>,
    locator: &dyn Geolocator,
) -> Result<()> {
    let mut flow = SubmissionFlow::start(api, store, config.poll).await?;
    let image = ImageUpload::from_path(&image).await?;

    let on_progress = |progress: UploadProgress| {
        eprint!(
            "\r{:>3}% {:<9}",
            progress.percent(),
            progress_label(&progress).unwrap_or("")
        );
    };
    let id = flow.upload(image, &on_progress).await?;
    eprintln!("\rProcessing...  ");

    // Ctrl-C abandons the classification wait
    let cancel = flow.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    let classified = flow.classify().await;
    ctrl_c.abort();
    let view = classified?;

    print!(
        "{}",
        render_template(
            "classification.txt",
            minijinja::context! { submission_id => id.to_string(), view => &view },
        )?
    );

    if !view.has_suggestions() {
        println!("No report type matched the picture automatically.");
    }
    if reports.is_empty() {
        println!("Pass --report <id> to submit one or more of these report types.");
        return Ok(());
    }

    let receipt = flow.submit(reports, locator).await?;
    println!("Thank you! Your report was received.");
    println!("Submission: {}", receipt.submission_id);
    if let Some(at) = receipt.display_timestamp() {
        println!("Submitted: {}", at);
    }
    Ok(())
}
