//! Map marker projection
//!
//! Pure mapping from domain records to render-ready markers. Icon and
//! color come from a fixed table keyed by category; unknown category tags
//! are drawn as pickups.

use crate::coord::Coordinate;
use crate::search::LocationSuggestion;
use crate::tracking::TrackingState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Marker category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    Pickup,
    Recycler,
    Destination,
}

impl MarkerCategory {
    /// Map a free-form tag to a category, defaulting to `Pickup`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "pickup" => Self::Pickup,
            "recycler" => Self::Recycler,
            "destination" => Self::Destination,
            other => {
                debug!(tag = other, "unmapped marker category, drawing as pickup");
                Self::Pickup
            }
        }
    }

    /// Icon and color for this category
    pub fn style(&self) -> MarkerStyle {
        match self {
            Self::Pickup => MarkerStyle {
                color: ACCENT_GREEN,
                icon: MarkerIcon::Pin,
            },
            Self::Recycler => MarkerStyle {
                color: ORANGE,
                icon: MarkerIcon::Truck,
            },
            Self::Destination => MarkerStyle {
                color: RED,
                icon: MarkerIcon::Flag,
            },
        }
    }
}

impl std::fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pickup => write!(f, "pickup"),
            Self::Recycler => write!(f, "recycler"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

pub const ACCENT_GREEN: &str = "#4CAF50";
pub const ORANGE: &str = "#FF9800";
pub const RED: &str = "#F44336";

/// Icon glyph semantic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    Pin,
    Truck,
    Flag,
}

/// Icon/color pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub icon: MarkerIcon,
}

/// A domain record to place on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntity {
    pub id: String,
    /// Free-form category tag ("pickup", "recycler", "destination", ...)
    pub category: String,
    pub coordinate: Coordinate,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl MapEntity {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        coordinate: Coordinate,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            coordinate,
            title: title.into(),
            description: description.into(),
        }
    }

    /// A selected search result as a pickup point; `None` without geometry
    pub fn pickup(suggestion: &LocationSuggestion) -> Option<Self> {
        suggestion.coordinate.map(|coordinate| {
            Self::new(
                suggestion.id.clone(),
                "pickup",
                coordinate,
                suggestion.name.clone(),
                suggestion.address.clone(),
            )
        })
    }
}

/// Render-ready marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    pub coordinate: Coordinate,
    pub title: String,
    pub description: String,
    pub category: MarkerCategory,
    pub style: MarkerStyle,
}

/// Project one entity
pub fn project(entity: &MapEntity) -> MapMarker {
    let category = MarkerCategory::from_tag(&entity.category);
    MapMarker {
        id: entity.id.clone(),
        coordinate: entity.coordinate,
        title: entity.title.clone(),
        description: entity.description.clone(),
        category,
        style: category.style(),
    }
}

/// Project a list of entities, preserving order
pub fn project_all(entities: &[MapEntity]) -> Vec<MapMarker> {
    entities.iter().map(project).collect()
}

/// Recycler and destination markers for a live tracking session
pub fn from_tracking(state: &TrackingState) -> Vec<MapMarker> {
    project_all(&[
        MapEntity::new(
            format!("{}-recycler", state.request_id),
            "recycler",
            state.recycler_position,
            "Recycler",
            format!("{:.2} km away, ETA {} min", state.distance_km, state.eta_minutes),
        ),
        MapEntity::new(
            format!("{}-destination", state.request_id),
            "destination",
            state.destination_position,
            "Pickup location",
            String::new(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SuggestionKind;
    use crate::tracking::TrackingSettings;
    use std::collections::HashSet;

    fn entity(id: &str, category: &str) -> MapEntity {
        MapEntity::new(id, category, Coordinate::new(6.67, -1.57), id.to_uppercase(), "")
    }

    #[test]
    fn test_style_table() {
        assert_eq!(
            MarkerCategory::Pickup.style(),
            MarkerStyle {
                color: ACCENT_GREEN,
                icon: MarkerIcon::Pin
            }
        );
        assert_eq!(MarkerCategory::Recycler.style().icon, MarkerIcon::Truck);
        assert_eq!(MarkerCategory::Recycler.style().color, ORANGE);
        assert_eq!(MarkerCategory::Destination.style().icon, MarkerIcon::Flag);
        assert_eq!(MarkerCategory::Destination.style().color, RED);
    }

    #[test]
    fn test_styles_distinct() {
        let styles: HashSet<MarkerStyle> = [
            MarkerCategory::Pickup,
            MarkerCategory::Recycler,
            MarkerCategory::Destination,
        ]
        .iter()
        .map(MarkerCategory::style)
        .collect();
        assert_eq!(styles.len(), 3);
    }

    #[test]
    fn test_unknown_category_falls_back_to_pickup() {
        let marker = project(&entity("x", "dumpster"));
        assert_eq!(marker.category, MarkerCategory::Pickup);
        assert_eq!(marker.style, MarkerCategory::Pickup.style());
        assert_eq!(MarkerCategory::from_tag(" Recycler "), MarkerCategory::Recycler);
    }

    #[test]
    fn test_project_all_preserves_order_and_is_idempotent() {
        let entities = vec![
            entity("a", "destination"),
            entity("b", "pickup"),
            entity("c", "recycler"),
        ];

        let first = project_all(&entities);
        let second = project_all(&entities);

        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(project_all(&[]).is_empty());
    }

    #[test]
    fn test_pickup_from_suggestion() {
        let mut suggestion = LocationSuggestion {
            id: "kumasi_mall".to_string(),
            name: "Kumasi City Mall".to_string(),
            address: "Lake Road, Asokwa, Kumasi, Ghana".to_string(),
            coordinate: Some(Coordinate::new(6.6745, -1.6060)),
            kind: SuggestionKind::Establishment,
        };

        let marker = project(&MapEntity::pickup(&suggestion).unwrap());
        assert_eq!(marker.category, MarkerCategory::Pickup);
        assert_eq!(marker.title, "Kumasi City Mall");

        suggestion.coordinate = None;
        assert!(MapEntity::pickup(&suggestion).is_none());
    }

    #[test]
    fn test_from_tracking() {
        let state = TrackingState::new(
            "req-1",
            Coordinate::new(6.70, -1.60),
            Coordinate::new(6.6734, -1.5714),
            &TrackingSettings::default(),
        );

        let markers = from_tracking(&state);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].category, MarkerCategory::Recycler);
        assert_eq!(markers[0].coordinate, state.recycler_position);
        assert_eq!(markers[1].category, MarkerCategory::Destination);
        assert_eq!(markers[1].id, "req-1-destination");
    }

    #[test]
    fn test_marker_serialization() {
        let json = serde_json::to_value(project(&entity("a", "recycler"))).unwrap();
        assert_eq!(json["category"], "recycler");
        assert_eq!(json["style"]["icon"], "truck");
        assert_eq!(json["style"]["color"], ORANGE);
    }
}
