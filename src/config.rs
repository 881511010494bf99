use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::grid::GridExtent;
use crate::models::LatLng;

// constants (used as defaults)

/// Linear kilometres-to-degrees approximation: one kilometre is roughly
/// 0.0090 degrees of latitude (and of longitude near the default latitudes
/// this tool is used at).
pub const KM_TO_DEGREES: f64 = 0.0090;

/// Delay imposed before each continuation-page request.
///
/// The Places API issues `next_page_token` values that are not valid
/// immediately; requesting too early returns INVALID_REQUEST. One second is
/// the documented propagation allowance.
pub const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(1);

/// Nearby search endpoint.
pub const PLACES_API_URL: &str =
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Environment variable holding the Places API credential.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API";

/// Per-request timeout in seconds for the HTTP client.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CACHE_PATH: &str = "./places.json";
pub const DEFAULT_LOCATION: &str = "-33.85441,151.2012";
pub const DEFAULT_BLOCKS: &str = "10x30";
pub const DEFAULT_BLOCK_SIZE_KM: f64 = 0.5;
pub const DEFAULT_MIN_RATING: f64 = 4.4;
pub const DEFAULT_MIN_USER_RATINGS: u32 = 100;
pub const DEFAULT_SEARCH_TYPE: &str = "restaurant";

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to
/// most verbose (Trace). Used with the `--log-level` CLI option.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Inclusive lower bounds a record must meet to become a marker.
///
/// Passed by value into the store and classifier at construction; never
/// mutated during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_rating: f64,
    pub min_user_ratings: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            min_rating: DEFAULT_MIN_RATING,
            min_user_ratings: DEFAULT_MIN_USER_RATINGS,
        }
    }
}

/// Command-line options and configuration.
///
/// This struct is automatically generated by `clap` from the field
/// attributes. All options have defaults and can be overridden via
/// command-line flags; unrecognized flags are rejected.
///
/// # Examples
///
/// ```bash
/// # Survey the default area around the Sydney CBD
/// nearby_kml > places.kml
///
/// # A 3x2 grid of 100m cells, bars only
/// nearby_kml --block-size 0.1 --blocks 3x2 --search-type bar \
///     --location ' -33.85441,151.2012' > bars.kml
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "nearby_kml",
    about = "Surveys a grid of coordinates against the Places nearby search API and emits a KML overlay."
)]
pub struct Opt {
    /// Cell size in kilometres (0.1 = 100m); must be positive
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE_KM, value_parser = parse_block_size)]
    pub block_size: f64,

    /// Grid extent as WxH cell counts: W cells wide (longitude), H cells
    /// high (latitude). Each cell may use several API requests; the API
    /// returns at most 20 results per page.
    #[arg(long, default_value = DEFAULT_BLOCKS)]
    pub blocks: GridExtent,

    /// Start coordinate as "lat,lng" (the grid's north-west corner).
    /// Negative latitudes need a leading space or `--location=` so the
    /// value is not mistaken for a flag.
    #[arg(long, default_value = DEFAULT_LOCATION, allow_hyphen_values = true)]
    pub location: LatLng,

    /// Minimum rating to include in the map (inclusive)
    #[arg(long, default_value_t = DEFAULT_MIN_RATING)]
    pub min_rating: f64,

    /// Minimum number of user ratings to include in the map (inclusive)
    #[arg(long, default_value_t = DEFAULT_MIN_USER_RATINGS)]
    pub min_user_ratings: u32,

    /// Place type to search for
    #[arg(long, default_value = DEFAULT_SEARCH_TYPE)]
    pub search_type: String,

    /// Path of the JSON cache of every raw result ever fetched
    #[arg(long, value_parser, default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: PathBuf,

    /// Shorthand for --log-level debug
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// A zero or negative cell size would collapse every cell onto the start
/// coordinate (or walk the grid the wrong way), so it is rejected at parse.
fn parse_block_size(s: &str) -> Result<f64, String> {
    let size: f64 = s
        .parse()
        .map_err(|_| format!("invalid cell size {s:?}"))?;
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(format!("cell size must be positive, got {s}"))
    }
}

impl Opt {
    /// Effective log filter: `--verbose` wins over `--log-level` unless the
    /// explicit level is already more verbose than debug.
    pub fn log_filter(&self) -> log::LevelFilter {
        let level = log::LevelFilter::from(self.log_level.clone());
        if self.verbose {
            level.max(log::LevelFilter::Debug)
        } else {
            level
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_rating: self.min_rating,
            min_user_ratings: self.min_user_ratings,
        }
    }
}
