//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `nearby_kml` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Writing the KML document to stdout and the summary to stderr
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use nearby_kml::initialization::init_logger_with;
use nearby_kml::{run_survey, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file (if one exists), so the
    // API key does not have to be exported manually. Try the current
    // directory first, then next to the executable.
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();

    let log_format = opt.log_format.clone();
    init_logger_with(opt.log_filter(), log_format).context("Failed to initialize logger")?;

    match run_survey(&opt).await {
        Ok(report) => {
            // stdout carries only the document; everything else is stderr.
            print!("{}", report.kml);
            eprintln!(
                "Surveyed {} cell{} over {} page{} in {:.1}s: {} new, {} duplicate{}; {} of {} records on the map",
                report.cells,
                if report.cells == 1 { "" } else { "s" },
                report.pages,
                if report.pages == 1 { "" } else { "s" },
                report.elapsed_seconds,
                report.new_records,
                report.duplicates,
                if report.duplicates == 1 { "" } else { "s" },
                report.markers,
                report.total_records,
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("nearby_kml error: {:#}", e);
            process::exit(1);
        }
    }
}
