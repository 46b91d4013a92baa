//! Somewhere CLI: drop pinpoints on the shared map from the command line.
//!
//! Set SOMEWHERE_API_URL (or API_URL) to point at the backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use somewhere_api_client::ApiClient;
use somewhere_app::{init_tracing, PendingSpotController, ScreenAnchor, SpotCollection, UploadStatus};
use somewhere_core::constants::DEFAULT_REGION;
use somewhere_core::{content_type_for, ClientConfig, Coordinate, MediaFile, PhotoPolicy};
use somewhere_processing::UploadOrchestrator;

#[derive(Parser)]
#[command(name = "somewhere", about = "Somewhere pinpoint CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every committed spot
    List,
    /// Check whether a point falls inside the allowed region
    Check {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Place, describe and save a spot, optionally with a photo
    Drop {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// What is at this spot
        #[arg(long)]
        description: String,
        /// Photo to attach
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Embed the photo in the spot record instead of uploading it
        #[arg(long)]
        inline: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", s);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            let config = ClientConfig::from_env()?;
            let client = ApiClient::from_config(&config)?;
            let spots = SpotCollection::load(&client, config.request_timeout).await;
            print_json(&spots)?;
        }
        Commands::Check { lat, lng } => {
            let point = Coordinate::new(lat, lng);
            let inside = DEFAULT_REGION.contains(point);
            print_json(&serde_json::json!({ "lat": lat, "lng": lng, "inside": inside }))?;
        }
        Commands::Drop {
            lat,
            lng,
            description,
            photo,
            inline,
        } => {
            let config = ClientConfig::from_env()?;
            let client = Arc::new(ApiClient::from_config(&config)?);
            let spots = SpotCollection::load(client.as_ref(), config.request_timeout).await;
            let mut controller = PendingSpotController::new(DEFAULT_REGION, spots)
                .with_request_timeout(config.request_timeout);

            controller
                .place(Coordinate::new(lat, lng), ScreenAnchor::default())
                .map_err(|e| anyhow::anyhow!(e.user_notice()))?;
            controller
                .edit_description(description)
                .map_err(|e| anyhow::anyhow!(e.user_notice()))?;

            if let Some(path) = photo {
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("photo")
                    .to_string();
                let content_type = content_type_for(&file_name);
                let policy = if inline {
                    PhotoPolicy::inline()
                } else {
                    PhotoPolicy::remote()
                };
                let orchestrator = UploadOrchestrator::new(client.clone(), policy)
                    .with_request_timeout(config.request_timeout);

                controller
                    .select_photo(&orchestrator, MediaFile::new(data, file_name, content_type))
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_notice()))?;

                if let Some(UploadStatus::Failed(reason)) =
                    controller.pending().map(|p| p.upload_status())
                {
                    eprintln!("Photo not attached ({}), saving without it", reason);
                }
            }

            let committed = controller
                .submit(client.as_ref())
                .await
                .map_err(|e| anyhow::anyhow!(e.user_notice()))?;
            print_json(&committed)?;
        }
    }

    Ok(())
}
