//! Gateway response normalization
//!
//! The backend has shipped several envelope formats over time. Each
//! `normalize_*` function accepts every known shape and returns one
//! canonical type, so format drift stays behind this module.
//!
//! Search responses:
//! - wrapped: `{"success": true, "data": {"predictions": [...]}}` (or `data: [...]`)
//! - status:  `{"status": "OK", "predictions": [...]}`
//! - bare:    `[...]`

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::search::{LocationSuggestion, SuggestionKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Status strings the legacy envelope uses for a usable answer
const OK_STATUSES: &[&str] = &["ok", "success", "zero_results"];

/// One prediction as the gateway sends it
#[derive(Debug, Deserialize)]
struct RawPrediction {
    #[serde(alias = "place_id", alias = "placeId")]
    id: String,
    #[serde(default, alias = "main_text", alias = "title")]
    name: Option<String>,
    #[serde(default, alias = "description", alias = "formatted_address")]
    address: Option<String>,
    #[serde(default, alias = "location", alias = "coordinates", alias = "geometry")]
    coordinate: Option<Coordinate>,
    #[serde(default, alias = "lat")]
    latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon")]
    longitude: Option<f64>,
    #[serde(default, rename = "type", alias = "kind")]
    kind: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictionList {
    Keyed { predictions: Vec<RawPrediction> },
    Bare(Vec<RawPrediction>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchEnvelope {
    Wrapped {
        success: bool,
        #[serde(default)]
        data: Option<PredictionList>,
        #[serde(default)]
        message: Option<String>,
    },
    Status {
        status: String,
        #[serde(default)]
        predictions: Vec<RawPrediction>,
        #[serde(default)]
        error_message: Option<String>,
    },
    Bare(Vec<RawPrediction>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetailsEnvelope {
    Wrapped {
        success: bool,
        #[serde(default)]
        data: Option<RawPrediction>,
        #[serde(default)]
        message: Option<String>,
    },
    Status {
        status: String,
        #[serde(default)]
        result: Option<RawPrediction>,
    },
    Bare(RawPrediction),
}

#[derive(Debug, Deserialize)]
struct ReverseEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "formatted_address")]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PositionEnvelope {
    Wrapped { success: bool, data: Option<Coordinate> },
    Bare(Coordinate),
}

impl RawPrediction {
    fn into_suggestion(self) -> LocationSuggestion {
        let coordinate = self.coordinate.or(match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        });

        let kind = self
            .kind
            .iter()
            .chain(self.types.iter())
            .find_map(|k| k.parse::<SuggestionKind>().ok())
            .unwrap_or_default();

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.address
                    .as_deref()
                    .and_then(|a| a.split(',').next())
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_else(|| self.id.clone());
        let address = self
            .address
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| name.clone());

        LocationSuggestion {
            id: self.id,
            name,
            address,
            coordinate,
            kind,
        }
    }
}

fn status_ok(status: &str) -> bool {
    OK_STATUSES.contains(&status.to_lowercase().as_str())
}

fn unique(predictions: Vec<RawPrediction>) -> Vec<LocationSuggestion> {
    let mut seen = HashSet::new();
    predictions
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .map(RawPrediction::into_suggestion)
        .collect()
}

/// Normalize any known search envelope into suggestions
pub fn normalize_predictions(body: Value) -> Result<Vec<LocationSuggestion>> {
    let envelope: SearchEnvelope = serde_json::from_value(body)
        .map_err(|_| Error::Gateway("Unrecognized search response shape".to_string()))?;

    match envelope {
        SearchEnvelope::Wrapped {
            success: true,
            data,
            ..
        } => Ok(match data {
            Some(PredictionList::Keyed { predictions }) | Some(PredictionList::Bare(predictions)) => {
                unique(predictions)
            }
            None => Vec::new(),
        }),
        SearchEnvelope::Wrapped { message, .. } => Err(Error::Gateway(
            message.unwrap_or_else(|| "Search was not successful".to_string()),
        )),
        SearchEnvelope::Status {
            status,
            predictions,
            ..
        } if status_ok(&status) => Ok(unique(predictions)),
        SearchEnvelope::Status {
            status,
            error_message,
            ..
        } => Err(Error::Gateway(format!(
            "Search returned status {}{}",
            status,
            error_message.map(|m| format!(": {}", m)).unwrap_or_default()
        ))),
        SearchEnvelope::Bare(predictions) => Ok(unique(predictions)),
    }
}

/// Normalize any known details envelope into a single suggestion
pub fn normalize_details(body: Value) -> Result<LocationSuggestion> {
    let envelope: DetailsEnvelope = serde_json::from_value(body)
        .map_err(|_| Error::Gateway("Unrecognized details response shape".to_string()))?;

    let raw = match envelope {
        DetailsEnvelope::Wrapped {
            success: true,
            data,
            ..
        } => data,
        DetailsEnvelope::Wrapped { message, .. } => {
            return Err(Error::Gateway(
                message.unwrap_or_else(|| "Details lookup was not successful".to_string()),
            ))
        }
        DetailsEnvelope::Status { status, result } if status_ok(&status) => result,
        DetailsEnvelope::Status { status, .. } => {
            return Err(Error::Gateway(format!("Details returned status {}", status)))
        }
        DetailsEnvelope::Bare(raw) => Some(raw),
    };

    raw.map(RawPrediction::into_suggestion)
        .ok_or_else(|| Error::Gateway("Details response carried no place".to_string()))
}

/// Normalize `{address}` or legacy `{status, address}` into an address
pub fn normalize_address(body: Value) -> Result<String> {
    let envelope: ReverseEnvelope = serde_json::from_value(body)
        .map_err(|_| Error::Gateway("Unrecognized reverse geocode response shape".to_string()))?;

    if let Some(status) = &envelope.status {
        if !status_ok(status) {
            return Err(Error::Gateway(format!("Reverse geocode returned status {}", status)));
        }
    }

    envelope
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| Error::Gateway("Reverse geocode response carried no address".to_string()))
}

/// Normalize a recycler position response
pub fn normalize_position(body: Value) -> Result<Coordinate> {
    let envelope: PositionEnvelope = serde_json::from_value(body)
        .map_err(|_| Error::Gateway("Unrecognized position response shape".to_string()))?;

    let coordinate = match envelope {
        PositionEnvelope::Wrapped {
            success: true,
            data: Some(c),
        } => c,
        PositionEnvelope::Wrapped { .. } => {
            return Err(Error::Gateway("Position lookup was not successful".to_string()))
        }
        PositionEnvelope::Bare(c) => c,
    };

    coordinate.validate()?;
    Ok(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prediction() -> Value {
        json!({"id": "x", "name": "Y"})
    }

    #[test]
    fn test_three_search_shapes_agree() {
        let wrapped = normalize_predictions(json!({
            "success": true,
            "data": {"predictions": [prediction()]}
        }))
        .unwrap();
        let status = normalize_predictions(json!({
            "status": "OK",
            "predictions": [prediction()]
        }))
        .unwrap();
        let bare = normalize_predictions(json!([prediction()])).unwrap();

        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].id, "x");
        assert_eq!(wrapped[0].name, "Y");
        assert_eq!(wrapped, status);
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn test_wrapped_data_may_be_a_list() {
        let results = normalize_predictions(json!({
            "success": true,
            "data": [prediction()]
        }))
        .unwrap();
        assert_eq!(results[0].id, "x");
    }

    #[test]
    fn test_google_style_prediction() {
        let results = normalize_predictions(json!({
            "status": "OK",
            "predictions": [{
                "place_id": "abc",
                "description": "Kejetia Market, Kumasi, Ghana",
                "types": ["point_of_interest", "establishment"],
                "location": {"lat": 6.69, "lng": -1.62}
            }]
        }))
        .unwrap();

        let s = &results[0];
        assert_eq!(s.id, "abc");
        assert_eq!(s.name, "Kejetia Market");
        assert_eq!(s.address, "Kejetia Market, Kumasi, Ghana");
        assert_eq!(s.kind, SuggestionKind::Establishment);
        assert_eq!(s.coordinate, Some(Coordinate::new(6.69, -1.62)));
    }

    #[test]
    fn test_flat_coordinates() {
        let results =
            normalize_predictions(json!([{"id": "a", "name": "A", "latitude": 1.0, "longitude": 2.0}]))
                .unwrap();
        assert_eq!(results[0].coordinate, Some(Coordinate::new(1.0, 2.0)));
    }

    #[test]
    fn test_duplicate_ids_dropped() {
        let results = normalize_predictions(json!([
            {"id": "a", "name": "First"},
            {"id": "a", "name": "Second"},
            {"id": "b", "name": "Third"}
        ]))
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "First");
    }

    #[test]
    fn test_zero_results_is_empty() {
        let results = normalize_predictions(json!({"status": "ZERO_RESULTS"})).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_unsuccessful_envelopes_error() {
        assert!(normalize_predictions(json!({"success": false, "message": "nope"})).is_err());
        assert!(normalize_predictions(json!({"status": "REQUEST_DENIED"})).is_err());
        assert!(normalize_predictions(json!({"unexpected": 1})).is_err());
        assert!(normalize_predictions(json!("text")).is_err());
    }

    #[test]
    fn test_details_shapes() {
        let place = json!({"id": "p", "name": "Place", "address": "1 Road"});

        let wrapped = normalize_details(json!({"success": true, "data": place.clone()})).unwrap();
        let status = normalize_details(json!({"status": "OK", "result": place.clone()})).unwrap();
        let bare = normalize_details(place).unwrap();

        assert_eq!(wrapped, status);
        assert_eq!(wrapped, bare);
        assert!(normalize_details(json!({"success": true})).is_err());
        assert!(normalize_details(json!({"status": "NOT_FOUND"})).is_err());
    }

    #[test]
    fn test_address_shapes() {
        assert_eq!(normalize_address(json!({"address": "Lake Road"})).unwrap(), "Lake Road");
        assert_eq!(
            normalize_address(json!({"status": "OK", "address": "Lake Road"})).unwrap(),
            "Lake Road"
        );
        assert!(normalize_address(json!({"status": "ERROR", "address": "x"})).is_err());
        assert!(normalize_address(json!({"address": ""})).is_err());
        assert!(normalize_address(json!({})).is_err());
    }

    #[test]
    fn test_position_shapes() {
        let bare = normalize_position(json!({"latitude": 6.6, "longitude": -1.6})).unwrap();
        let wrapped =
            normalize_position(json!({"success": true, "data": {"lat": 6.6, "lng": -1.6}})).unwrap();

        assert_eq!(bare, wrapped);
        assert!(normalize_position(json!({"latitude": 95.0, "longitude": 0.0})).is_err());
        assert!(normalize_position(json!({"success": false, "data": null})).is_err());
    }
}
