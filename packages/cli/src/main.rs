#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocodes NYC collision intersections and street addresses.
//!
//! Reads pending records from `PostgreSQL` (`DATABASE_URL`), sends each
//! address to the Google Geocoding API and writes the coordinates and raw
//! response back. Log output is routed through `indicatif-log-bridge` so
//! log lines and progress bars never fight for the terminal.

mod progress;

use std::time::Instant;

use clap::Parser;
use collision_geocode_database::db::connect_from_env;
use collision_geocode_database::store::PostgresLocationStore;
use collision_geocode_geocoder::google::GoogleGeocoder;
use collision_geocode_geocoder::service_registry::google_service;
use collision_geocode_models::RecordCategory;
use collision_geocode_runner::{DEFAULT_BATCH_SIZE, RunnerConfig, run};

use crate::progress::{CategoryProgress, init_logger};

#[derive(Parser)]
#[command(
    name = "collision_geocode",
    about = "Geocode NYC collision intersections and street addresses"
)]
struct Cli {
    /// Google Maps Geocoding API key
    #[arg(long)]
    google_api_key: Option<String>,

    /// Only geocode this category (default: intersections, then street addresses)
    #[arg(long)]
    category: Option<RecordCategory>,

    /// Maximum number of records to geocode per category
    #[arg(long)]
    limit: Option<u64>,

    /// Number of pending records read per database query
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: u32,
}

/// The message printed when no API key was supplied.
fn usage() -> String {
    [
        "You have to specify a Google Maps Geocoding API key",
        "Usage:",
        "  collision_geocode --google-api-key YOUR_API_KEY_HERE",
    ]
    .join("\n\n")
}

impl Cli {
    /// The API key, if one was given and is not blank.
    fn api_key(&self) -> Option<&str> {
        self.google_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            categories: self
                .category
                .map_or_else(|| RecordCategory::ALL.to_vec(), |category| vec![category]),
            batch_size: self.batch_size.max(1),
            limit: self.limit,
            ..RunnerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(api_key) = cli.api_key() else {
        println!("{}", usage());
        return Ok(());
    };

    let multi = init_logger();
    let start = Instant::now();

    let db = connect_from_env().await?;
    let store = PostgresLocationStore::new(db);
    let geocoder = GoogleGeocoder::from_service(reqwest::Client::new(), &google_service(), api_key);
    let config = cli.runner_config();

    let summary = run(&store, &geocoder, &config, &|category: RecordCategory| {
        CategoryProgress::bar(&multi, category)
    })
    .await?;

    for category in &summary.categories {
        log::info!(
            "{}: {} of {} pending",
            category.category.display_name(),
            category.tally(),
            category.candidates,
        );
        if !category.skipped.is_empty() {
            log::debug!("Skipped ids: {:?}", category.skipped);
        }
    }

    log::info!("Geocoding complete in {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
