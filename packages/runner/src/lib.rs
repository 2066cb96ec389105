#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sequential geocoding of collision location records.
//!
//! For each [`RecordCategory`] the runner counts the pending records, walks
//! them in id order, geocodes each one and stores the raw response (plus
//! coordinates when the first result is accepted). Records are processed
//! strictly one at a time.
//!
//! Per-record outcomes:
//! - **Geocoded**: an accepted result; coordinates and response stored.
//! - **Unmatched**: no acceptable result; response stored without
//!   coordinates. The record is still considered processed.
//! - **Skipped**: the geocoder rejected the query. Nothing is stored, so the
//!   record stays pending for a later run or manual review.
//!
//! Any other failure (missing street name, server error, failed update)
//! aborts the run. Records saved before the failure stay saved, so a rerun
//! resumes where this one stopped.

pub mod progress;

use std::sync::Arc;

use collision_geocode_database::{DbError, LocationStore};
use collision_geocode_geocoder::address::{AddressError, address_for_geocode};
use collision_geocode_geocoder::interpret::{accepted_location, unserved_status};
use collision_geocode_geocoder::{GeocodeError, Geocoder};
use collision_geocode_models::{CollisionLocationRecord, Coordinates, RecordCategory};

use crate::progress::ProgressCallback;

/// Records read from the store per query.
pub const DEFAULT_BATCH_SIZE: u32 = 1000;

/// Interval, in records, between `done N addresses` log lines.
pub const DEFAULT_HEARTBEAT_EVERY: u64 = 50;

/// Errors that abort a geocoding run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Reading or updating records failed.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The geocoder failed for a reason other than rejecting the query.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// A record lacks the street names needed to build its address.
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Configuration for a geocoding run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Categories to process, in order.
    pub categories: Vec<RecordCategory>,
    /// Records fetched per query.
    pub batch_size: u32,
    /// Log `done N addresses` every this many records.
    pub heartbeat_every: u64,
    /// Maximum records to process per category.
    pub limit: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            categories: RecordCategory::ALL.to_vec(),
            batch_size: DEFAULT_BATCH_SIZE,
            heartbeat_every: DEFAULT_HEARTBEAT_EVERY,
            limit: None,
        }
    }
}

/// What happened to a single record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
    /// The first result was accepted.
    Geocoded(Coordinates),
    /// The response was stored without coordinates.
    Unmatched,
    /// The geocoder rejected the query; the record was left untouched.
    Skipped,
}

/// Totals for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    /// Category processed.
    pub category: RecordCategory,
    /// Pending records when the category started.
    pub candidates: u64,
    /// Records stored with coordinates.
    pub geocoded: u64,
    /// Records stored without coordinates.
    pub unmatched: u64,
    /// Ids of records the geocoder rejected.
    pub skipped: Vec<i64>,
}

impl CategorySummary {
    const fn new(category: RecordCategory, candidates: u64) -> Self {
        Self {
            category,
            candidates,
            geocoded: 0,
            unmatched: 0,
            skipped: Vec::new(),
        }
    }

    fn record(&mut self, id: i64, outcome: GeocodeOutcome) {
        match outcome {
            GeocodeOutcome::Geocoded(_) => self.geocoded += 1,
            GeocodeOutcome::Unmatched => self.unmatched += 1,
            GeocodeOutcome::Skipped => self.skipped.push(id),
        }
    }

    /// Running totals, e.g. `12 geocoded, 3 unmatched, 1 skipped`.
    #[must_use]
    pub fn tally(&self) -> String {
        format!(
            "{} geocoded, {} unmatched, {} skipped",
            self.geocoded,
            self.unmatched,
            self.skipped.len()
        )
    }

    /// Records visited, whatever their outcome.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.geocoded + self.unmatched + self.skipped.len() as u64
    }
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One entry per processed category, in processing order.
    pub categories: Vec<CategorySummary>,
}

/// Geocodes every pending record of each configured category.
///
/// `progress_for` supplies a progress reporter per category.
///
/// # Errors
///
/// Returns [`RunnerError`] on the first record that cannot be handled
/// (see the crate docs); rejected queries are not errors.
pub async fn run(
    store: &dyn LocationStore,
    geocoder: &dyn Geocoder,
    config: &RunnerConfig,
    progress_for: &dyn Fn(RecordCategory) -> Arc<dyn ProgressCallback>,
) -> Result<RunSummary, RunnerError> {
    let mut summary = RunSummary::default();

    for &category in &config.categories {
        let progress = progress_for(category);
        let category_summary =
            run_category(store, geocoder, config, category, progress.as_ref()).await?;
        summary.categories.push(category_summary);
    }

    Ok(summary)
}

/// Geocodes the pending records of one category.
///
/// Records are read in id-ordered batches of `config.batch_size`, resuming
/// after the last id seen, so a skipped record is not revisited within the
/// same run.
///
/// # Errors
///
/// Returns [`RunnerError`] on the first record that cannot be handled.
pub async fn run_category(
    store: &dyn LocationStore,
    geocoder: &dyn Geocoder,
    config: &RunnerConfig,
    category: RecordCategory,
    progress: &dyn ProgressCallback,
) -> Result<CategorySummary, RunnerError> {
    let name = category.display_name();
    let candidates = store.count_pending(category).await?;
    log::info!("going to geocode {candidates} {name} addresses");

    let total = config.limit.map_or(candidates, |limit| limit.min(candidates));
    progress.set_total(total);

    let mut summary = CategorySummary::new(category, candidates);
    let mut after_id = None;
    let mut index = 0u64;
    let batch_size = config.batch_size.max(1);

    'batches: loop {
        let batch = store.fetch_pending(category, after_id, batch_size).await?;
        let Some(last) = batch.last() else {
            break;
        };
        after_id = Some(last.id);

        for record in &batch {
            if config.limit.is_some_and(|limit| index >= limit) {
                break 'batches;
            }

            if index > 0 && config.heartbeat_every > 0 && index % config.heartbeat_every == 0 {
                log::info!("done {index} addresses");
            }

            let outcome = geocode_record(store, geocoder, record).await?;
            summary.record(record.id, outcome);
            progress.inc(1);
            progress.set_message(summary.tally());
            index += 1;
        }

        if batch.len() < batch_size as usize {
            break;
        }
    }

    log::info!("finished {name}");
    progress.finish(summary.tally());

    Ok(summary)
}

/// Geocodes a single record and stores the response.
///
/// # Errors
///
/// Returns [`RunnerError::Address`] if the record lacks a required street
/// name, [`RunnerError::Geocode`] for geocoder failures other than a
/// rejected query, and [`RunnerError::Database`] if the update fails.
pub async fn geocode_record(
    store: &dyn LocationStore,
    geocoder: &dyn Geocoder,
    record: &CollisionLocationRecord,
) -> Result<GeocodeOutcome, RunnerError> {
    let category = record.category();
    let address = address_for_geocode(record)?;

    let body = match geocoder.geocode(&address).await {
        Ok(body) => body,
        Err(e) if e.is_rejected() => {
            log::warn!(
                "Bad request for {} {}: {e}",
                category.display_name(),
                record.id
            );
            return Ok(GeocodeOutcome::Skipped);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(status) = unserved_status(&body) {
        log::warn!(
            "Geocoder answered {status} for {} {}",
            category.display_name(),
            record.id
        );
    }

    let coordinates = accepted_location(&body, category);
    store
        .save_geocode(category, record.id, coordinates, &body)
        .await?;

    Ok(coordinates.map_or(GeocodeOutcome::Unmatched, GeocodeOutcome::Geocoded))
}
