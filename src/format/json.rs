//! JSON output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::markers::{from_tracking, project_all, MapEntity};
use crate::search::LocationSuggestion;
use crate::tracking::TrackingState;

/// JSON formatter - pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON"
    }

    fn format_suggestions(&self, suggestions: &[LocationSuggestion]) -> Result<String> {
        let pickups: Vec<MapEntity> = suggestions.iter().filter_map(MapEntity::pickup).collect();
        let value = serde_json::json!({
            "suggestions": suggestions,
            "markers": project_all(&pickups),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_tracking(&self, state: &TrackingState) -> Result<String> {
        let value = serde_json::json!({
            "state": state,
            "markers": from_tracking(state),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
