//! nearby_kml library: grid survey of the Places nearby search API
//!
//! Surveys a rectangular grid of coordinates against the Google Places
//! "nearby search" endpoint, deduplicates results across overlapping cell
//! searches into a persisted JSON cache, filters them by rating thresholds,
//! and renders the survivors as a KML overlay document.
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use nearby_kml::{run_survey, Opt};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let opt = Opt::parse_from(["nearby_kml", "--blocks", "3x2", "--search-type", "bar"]);
//! let report = run_survey(&opt).await?;
//! print!("{}", report.kml);
//! # Ok(())
//! # }
//! ```
//!
//! Re-running with the same cache path is idempotent: previously fetched
//! records are reloaded, re-fetched records are overwritten in place, and
//! changing the thresholds reclassifies the cached set without any new
//! API traffic.
//!
//! This library requires a Tokio runtime.

pub mod classify;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod grid;
pub mod initialization;
pub mod kml;
pub mod models;
pub mod store;
pub mod styles;

// Re-export public API
pub use config::{LogFormat, LogLevel, Opt, Thresholds};
pub use run::{run_survey, SurveyReport};

// Internal run module (ties the components into the full survey)
mod run {
    use anyhow::{Error, Result};
    use log::{info, warn};

    use crate::config::Opt;
    use crate::fetch::PlacesClient;
    use crate::grid::{walk, GridSpec};
    use crate::initialization::{init_client, resolve_api_key};
    use crate::kml::{render, write_cache};
    use crate::store::{CacheLoad, ResultStore};
    use crate::styles::StyleCatalog;

    /// Summary of one completed survey.
    #[derive(Debug)]
    pub struct SurveyReport {
        /// The rendered overlay document.
        pub kml: String,
        /// Grid cells visited.
        pub cells: usize,
        /// Result pages fetched across all cells.
        pub pages: usize,
        /// Records seen for the first time this run.
        pub new_records: usize,
        /// Records re-fetched from overlapping searches or prior runs.
        pub duplicates: usize,
        /// Total records accumulated (cache included).
        pub total_records: usize,
        /// Records currently passing the thresholds.
        pub markers: usize,
        /// Wall-clock duration of the survey.
        pub elapsed_seconds: f64,
    }

    /// Runs the full survey: load cache, walk the grid, render the KML and
    /// persist the accumulated record set.
    ///
    /// The cache is only written after a completed traversal; a fatal fetch
    /// error aborts the run without committing partial results to disk.
    pub async fn run_survey(opt: &Opt) -> Result<SurveyReport> {
        let started = std::time::Instant::now();
        let api_key = resolve_api_key()?;

        let catalog = StyleCatalog::new();
        let (mut store, cache) =
            ResultStore::load(&opt.cache_path, opt.thresholds(), catalog.clone());
        match cache {
            CacheLoad::Loaded(n) => info!(
                "loaded {n} cached records from {} ({} pass the thresholds)",
                opt.cache_path.display(),
                store.marker_count()
            ),
            CacheLoad::Missing => info!(
                "no cache at {}; starting empty",
                opt.cache_path.display()
            ),
            CacheLoad::Unreadable(reason) => warn!(
                "ignoring unreadable cache at {}: {reason}",
                opt.cache_path.display()
            ),
        }

        let client = PlacesClient::new(init_client()?, api_key);
        let spec = GridSpec {
            start: opt.location,
            block_size_km: opt.block_size,
            extent: opt.blocks,
        };
        let stats = walk(&spec, &opt.search_type, &client, &mut store)
            .await
            .map_err(|(cell, e)| Error::new(e).context(format!("fetching cell at {cell}")))?;

        let kml = render(&store, &catalog);
        write_cache(&store, &opt.cache_path);

        Ok(SurveyReport {
            kml,
            cells: stats.cells,
            pages: stats.pages,
            new_records: stats.new,
            duplicates: stats.duplicates,
            total_records: store.record_count(),
            markers: store.marker_count(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}
