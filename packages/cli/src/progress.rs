//! `indicatif`-backed progress bars and logger setup.
//!
//! Each category gets its own bar on a shared [`MultiProgress`], and `log`
//! output is routed through the same [`MultiProgress`].

use std::sync::Arc;

use collision_geocode_models::RecordCategory;
use collision_geocode_runner::progress::ProgressCallback;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const CATEGORY_TEMPLATE: &str =
    "{prefix:>22.bold} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// One bar per record category, prefixed with the category's name and
/// trailed by the runner's geocoded/unmatched/skipped tally.
pub struct CategoryProgress {
    bar: ProgressBar,
}

impl CategoryProgress {
    /// Adds a bar for `category` to `multi`. Its length is set once the
    /// runner has counted the pending records.
    #[must_use]
    pub fn bar(multi: &MultiProgress, category: RecordCategory) -> Arc<dyn ProgressCallback> {
        let progress = Self::new(category);
        multi.add(progress.bar.clone());
        Arc::new(progress)
    }

    fn new(category: RecordCategory) -> Self {
        let bar = ProgressBar::new(0).with_style(
            ProgressStyle::with_template(CATEGORY_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_prefix(category.display_name());

        Self { bar }
    }
}

impl ProgressCallback for CategoryProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Initializes the global timestamped logger wrapped in
/// `indicatif-log-bridge`.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Returns the
/// [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
