//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod details;
pub mod reverse;
pub mod search;
pub mod serve;
pub mod track;

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, OutputFormatter};
use crate::search::catalog;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Pickup location search and recycler tracking
#[derive(Parser)]
#[command(name = "pickup-radar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for pickup locations
    Search(search::SearchArgs),

    /// Show details for a place id
    Details(details::DetailsArgs),

    /// Resolve a coordinate to an address
    Reverse(reverse::ReverseArgs),

    /// Follow a recycler toward a pickup point
    Track(track::TrackArgs),

    /// Start the demo gateway server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => {
            init_logging("warn");
            search::run(args).await
        }
        Commands::Details(args) => {
            init_logging("warn");
            details::run(args).await
        }
        Commands::Reverse(args) => {
            init_logging("warn");
            reverse::run(args).await
        }
        Commands::Track(args) => {
            init_logging("info");
            track::run(args).await
        }
        Commands::Serve(args) => {
            init_logging("info");
            serve::run(args).await
        }
        Commands::Config(args) => config::run(args),
    }
}

/// Initialize logging; `RUST_LOG` overrides `default_level`
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve a point given as "lat,lng" or as a catalog place id
pub fn resolve_point(point: &str) -> Result<Coordinate> {
    if let Some((lat, lng)) = point.split_once(',') {
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidCoordinates(format!("Not a coordinate: {}", point)))
        };
        let coordinate = Coordinate::new(parse(lat)?, parse(lng)?);
        coordinate.validate()?;
        return Ok(coordinate);
    }

    catalog::find(point.trim())
        .and_then(|place| place.coordinate)
        .ok_or_else(|| Error::Config(format!("Unknown place: {}", point)))
}

/// Look up an output formatter or fail with the list of known ones
fn formatter(name: &str) -> Result<Box<dyn OutputFormatter>> {
    get_formatter(name).ok_or_else(|| {
        let known: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!(
            "Unknown format: {} (available: {})",
            name,
            known.join(", ")
        ))
    })
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:<6} - {}", format.name, format.description);
    }
}

/// Write output to a file or stdout
fn emit(output: &str, path: Option<&str>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)?;
            eprintln!("Output written to {}", path);
        }
        None => println!("{}", output),
    }
    Ok(())
}
