//! Output formatters
//!
//! Provides trait-based output formatting for search results and tracking
//! sessions.

pub mod gpx;
pub mod json;
pub mod text;

use crate::error::Result;
use crate::search::LocationSuggestion;
use crate::tracking::TrackingState;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a list of search suggestions
    fn format_suggestions(&self, suggestions: &[LocationSuggestion]) -> Result<String>;

    /// Format a tracking session snapshot
    fn format_tracking(&self, state: &TrackingState) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    let formatters: [&dyn OutputFormatter; 3] =
        [&json::JsonFormatter, &text::TextFormatter, &gpx::GpxFormatter];

    formatters
        .iter()
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}
