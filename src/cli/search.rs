//! Search command handler
//!
//! Runs one query through the search client against the configured gateway.

use crate::cli::{emit, formatter, list_formats, resolve_point};
use crate::config::Config;
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::search::{LocationSearchClient, SearchSettings};
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query
    #[arg(required_unless_present = "list_formats")]
    pub query: Vec<String>,

    /// Bias results toward a point ("lat,lng" or place id)
    #[arg(long, allow_hyphen_values = true)]
    pub near: Option<String>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;
    let formatter = formatter(&args.format)?;
    let bias = args.near.as_deref().map(resolve_point).transpose()?;

    let client = LocationSearchClient::new(
        HttpGateway::from_config(&config)?,
        SearchSettings::from_config(&config),
    );

    let query = args.query.join(" ");
    let suggestions = client.search_locations(&query, bias).await?;

    let output = formatter.format_suggestions(&suggestions)?;
    emit(&output, args.output.as_deref())
}
