//! GPX output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::search::LocationSuggestion;
use crate::tracking::TrackingState;

/// GPX formatter - suggestions as waypoints, tracking as a track
pub struct GpxFormatter;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn header(gpx: &mut String, name: &str) {
    gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    gpx.push('\n');
    gpx.push_str(r#"<gpx version="1.1" creator="pickup-radar">"#);
    gpx.push('\n');
    gpx.push_str("  <metadata>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", escape(name)));
    gpx.push_str("  </metadata>\n");
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints (search) or track (tracking)"
    }

    fn format_suggestions(&self, suggestions: &[LocationSuggestion]) -> Result<String> {
        let mut gpx = String::new();
        header(&mut gpx, "Location suggestions");

        // Suggestions without geometry have nothing to plot
        for s in suggestions {
            let Some(c) = s.coordinate else { continue };
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                c.latitude, c.longitude
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape(&s.name)));
            gpx.push_str(&format!("    <desc>{}</desc>\n", escape(&s.address)));
            gpx.push_str(&format!("    <type>{}</type>\n", s.kind));
            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }

    fn format_tracking(&self, state: &TrackingState) -> Result<String> {
        let mut gpx = String::new();
        header(&mut gpx, &format!("Pickup {}", state.request_id));

        gpx.push_str(&format!(
            r#"  <wpt lat="{}" lon="{}">"#,
            state.destination_position.latitude, state.destination_position.longitude
        ));
        gpx.push('\n');
        gpx.push_str("    <name>Destination</name>\n");
        gpx.push_str("    <sym>flag</sym>\n");
        gpx.push_str("  </wpt>\n");

        gpx.push_str("  <trk>\n");
        gpx.push_str(&format!("    <name>Recycler {}</name>\n", escape(&state.request_id)));
        gpx.push_str("    <trkseg>\n");
        for point in state.route_trace.iter() {
            gpx.push_str(&format!(
                "      <trkpt lat=\"{}\" lon=\"{}\"/>\n",
                point.latitude, point.longitude
            ));
        }
        gpx.push_str("    </trkseg>\n");
        gpx.push_str("  </trk>\n");

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}
