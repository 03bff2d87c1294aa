//! Reverse geocode command handler

use crate::cli::resolve_point;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::search::{LocationSearchClient, SearchSettings};
use clap::Args;

/// Reverse geocode command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Point to resolve, as "lat,lng"
    #[arg(allow_hyphen_values = true)]
    pub point: String,
}

/// Run the reverse command
///
/// Prints the sentinel address when the gateway cannot resolve the point.
pub async fn run(args: ReverseArgs) -> Result<()> {
    let config = Config::load()?;
    let coordinate = resolve_point(&args.point)?;

    let client = LocationSearchClient::new(
        HttpGateway::from_config(&config)?,
        SearchSettings::from_config(&config),
    );

    println!("{}", client.reverse_geocode(coordinate).await);
    Ok(())
}
