//! Human-readable text output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::search::LocationSuggestion;
use crate::tracking::{TrackingPhase, TrackingState};

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format_suggestions(&self, suggestions: &[LocationSuggestion]) -> Result<String> {
        if suggestions.is_empty() {
            return Ok("No locations found\n".to_string());
        }

        let mut output = String::new();
        for (i, s) in suggestions.iter().enumerate() {
            output.push_str(&format!("{:>2}. {} [{}]\n", i + 1, s.name, s.kind));
            output.push_str(&format!("    {}\n", s.address));
            match s.coordinate {
                Some(c) => output.push_str(&format!("    ({})  id: {}\n", c, s.id)),
                None => output.push_str(&format!("    id: {}\n", s.id)),
            }
        }
        Ok(output)
    }

    fn format_tracking(&self, state: &TrackingState) -> Result<String> {
        let status = match state.phase {
            TrackingPhase::Idle => "waiting",
            TrackingPhase::Tracking => "on the way",
            TrackingPhase::Arrived => "arrived",
            TrackingPhase::Stopped => "stopped",
        };

        let mut output = String::new();
        output.push_str(&format!("Request {} ({})\n", state.request_id, status));
        output.push_str(&format!("Recycler:    ({})\n", state.recycler_position));
        output.push_str(&format!("Destination: ({})\n", state.destination_position));
        output.push_str(&format!(
            "Distance: {:.2} km, ETA: {} min\n",
            state.distance_km, state.eta_minutes
        ));
        output.push_str(&format!(
            "Updates: {}, trace points: {}\n",
            state.ticks,
            state.route_trace.len()
        ));
        Ok(output)
    }
}
