//! Details command handler

use crate::cli::{emit, formatter};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::HttpGateway;
use crate::search::{LocationSearchClient, SearchSettings};
use clap::Args;

/// Details command arguments
#[derive(Args)]
pub struct DetailsArgs {
    /// Place id from a search result
    pub place_id: String,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Run the details command
pub async fn run(args: DetailsArgs) -> Result<()> {
    let config = Config::load()?;
    let formatter = formatter(&args.format)?;

    let client = LocationSearchClient::new(
        HttpGateway::from_config(&config)?,
        SearchSettings::from_config(&config),
    );

    let place = client
        .get_location_details(&args.place_id)
        .await
        .ok_or_else(|| Error::Gateway(format!("No details found for {}", args.place_id)))?;

    let output = formatter.format_suggestions(std::slice::from_ref(&place))?;
    emit(&output, None)
}
