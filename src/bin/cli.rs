//! tripcluster CLI - Debug tool for trip detection
//!
//! Usage:
//!   tripcluster-cli detect <photos.json> [--algorithm hdbscan|timegap] [--config <cfg.json>]
//!   tripcluster-cli season <timestamp>
//!
//! Reads photo records from JSON, runs trip detection and prints the
//! trips found, with verbose clustering diagnostics when asked.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tripcluster::{
    identify_season, Algorithm, DetectedTrip, DetectionConfig, PhotoRecord, TripDetector,
};

#[derive(Parser)]
#[command(name = "tripcluster-cli")]
#[command(about = "Debug tool for trip detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster photos into trips
    Detect {
        /// JSON file containing an array of photo records
        photos: PathBuf,

        /// JSON file with a detection config; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Clustering algorithm ("hdbscan" or "timegap")
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        /// Minimum number of photos per trip
        #[arg(long)]
        min_photos: Option<usize>,

        /// Largest gap inside a trip, in seconds (timegap)
        #[arg(long)]
        max_time_gap: Option<u64>,

        /// Split threshold (hdbscan)
        #[arg(long)]
        threshold: Option<f64>,

        /// Weight of elapsed time (hdbscan)
        #[arg(long)]
        time_weight: Option<f64>,

        /// Weight of geographic distance (hdbscan)
        #[arg(long)]
        location_weight: Option<f64>,

        /// Reference time for the finish gate (defaults to the system clock)
        #[arg(long)]
        now: Option<i64>,

        /// Print trips as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the season label for a Unix timestamp
    Season {
        timestamp: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let result = match cli.command {
        Commands::Detect {
            photos,
            config,
            algorithm,
            min_photos,
            max_time_gap,
            threshold,
            time_weight,
            location_weight,
            now,
            json,
        } => load_config(config.as_deref()).and_then(|mut cfg| {
            if let Some(algorithm) = algorithm {
                cfg.algorithm = algorithm;
            }
            if let Some(min_photos) = min_photos {
                cfg.min_photos = min_photos;
            }
            if let Some(max_time_gap) = max_time_gap {
                cfg.max_time_gap_seconds = max_time_gap;
            }
            if let Some(threshold) = threshold {
                cfg.threshold = threshold;
            }
            if let Some(time_weight) = time_weight {
                cfg.time_weight = time_weight;
            }
            if let Some(location_weight) = location_weight {
                cfg.location_weight = location_weight;
            }
            run_detect(&photos, cfg, now.unwrap_or_else(current_timestamp), json)
        }),
        Commands::Season { timestamp } => {
            println!("{}", identify_season(timestamp));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn load_config(path: Option<&Path>) -> Result<DetectionConfig, String> {
    let Some(path) = path else {
        return Ok(DetectionConfig::default());
    };
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| format!("{}: {}", path.display(), e))
}

fn load_photos(path: &Path) -> Result<Vec<PhotoRecord>, String> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| format!("{}: {}", path.display(), e))
}

fn run_detect(path: &Path, config: DetectionConfig, now: i64, json: bool) -> Result<(), String> {
    let photos = load_photos(path)?;

    // Banner on stderr keeps stdout parseable under --json
    eprintln!("\n{}", "=".repeat(60));
    eprintln!(
        "Detecting trips in {} photos ({}, min {} photos)",
        photos.len(),
        config.algorithm,
        config.min_photos
    );
    eprintln!("{}", "=".repeat(60));

    let detector = TripDetector::new(config);
    let trips = detector.detect(photos, now).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&trips).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else {
        print_trips(&trips);
    }

    Ok(())
}

fn print_trips(trips: &[DetectedTrip<PhotoRecord>]) {
    println!("\nFound {} trips", trips.len());

    for (i, detected) in trips.iter().enumerate() {
        let summary = &detected.summary;
        println!(
            "\n  Trip {}: {} ({})",
            i + 1,
            detected.name(),
            summary.timeframe
        );
        println!(
            "    {} photos, {:.1}km travelled",
            summary.photo_count, summary.distance_km
        );
    }
}
