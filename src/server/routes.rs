//! HTTP API routes
//!
//! The gateway endpoints served over the built-in catalog. Responses use
//! the wrapped `{"success": true, "data": ...}` envelope, except reverse
//! geocoding which answers `{"address": ...}`.

use crate::constants::geo::REVERSE_GEOCODE_RADIUS_KM;
use crate::coord::Coordinate;
use crate::error::Error;
use crate::search::catalog;
use crate::server::state::AppState;
use crate::tracking::CollectionStatus;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/locations/search", get(search_handler))
        .route("/api/locations/details/:id", get(details_handler))
        .route("/api/locations/reverse-geocode", get(reverse_geocode_handler))
        .route("/api/waste-collections/:id/status", patch(update_status_handler))
        .route(
            "/api/waste-collections/:id/recycler-location",
            get(get_position_handler).put(put_position_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub message: String,
    pub code: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code: code.to_string(),
            status,
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(StatusCode::BAD_REQUEST, code, err.to_string())
    }
}

fn wrapped(data: impl Serialize) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub places: usize,
    pub uptime_secs: u64,
}

/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        places: catalog::all().len(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// GET /api/locations/search
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let bias = match (params.latitude, params.longitude) {
        (Some(lat), Some(lng)) => {
            let bias = Coordinate::new(lat, lng);
            bias.validate()?;
            Some(bias)
        }
        _ => None,
    };

    let predictions = if params.query.trim().is_empty() {
        Vec::new()
    } else {
        catalog::search(&params.query, bias, state.result_limit)
    };

    Ok(wrapped(json!({ "predictions": predictions })))
}

/// GET /api/locations/details/:id
async fn details_handler(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    catalog::find(&id)
        .map(wrapped)
        .ok_or_else(|| ApiError::not_found(format!("No place with id {}", id)))
}

/// Coordinate query parameters
#[derive(Debug, Deserialize)]
pub struct CoordinateParams {
    pub latitude: f64,
    pub longitude: f64,
}

/// GET /api/locations/reverse-geocode
async fn reverse_geocode_handler(
    Query(params): Query<CoordinateParams>,
) -> Result<Json<Value>, ApiError> {
    let coordinate = Coordinate::new(params.latitude, params.longitude);
    coordinate.validate()?;

    catalog::nearest(coordinate, REVERSE_GEOCODE_RADIUS_KM)
        .map(|place| Json(json!({ "address": place.address })))
        .ok_or_else(|| ApiError::not_found(format!("No known place near {}", coordinate)))
}

/// Status update body
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: CollectionStatus,
}

/// PATCH /api/waste-collections/:id/status
async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Json<Value> {
    info!(collection_id = %id, status = %update.status, "collection status updated");
    state.set_status(&id, update.status).await;
    wrapped(json!({ "id": id, "status": update.status }))
}

/// GET /api/waste-collections/:id/recycler-location
async fn get_position_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .position_of(&id)
        .await
        .map(wrapped)
        .ok_or_else(|| ApiError::not_found(format!("No recycler position for {}", id)))
}

/// PUT /api/waste-collections/:id/recycler-location
async fn put_position_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(position): Json<Coordinate>,
) -> Result<Json<Value>, ApiError> {
    position.validate()?;
    state.set_position(&id, position).await;
    Ok(wrapped(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::envelope;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::new())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state());

        let (status, body) = get_json(app, "/api/status").await;

        assert_eq!(status, StatusCode::OK);
        let status: StatusResponse = serde_json::from_value(body).unwrap();
        assert!(status.running);
        assert_eq!(status.places, catalog::all().len());
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let app = create_router(create_test_state());

        let (status, body) = get_json(app, "/api/locations/search?query=atonsu").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let suggestions = envelope::normalize_predictions(body).unwrap();
        assert!(suggestions.iter().any(|s| s.name == "Atonsu Unity Oil"));
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let app = create_router(create_test_state());

        let (_, body) = get_json(app, "/api/locations/search?query=%20").await;

        assert!(envelope::normalize_predictions(body).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_invalid_bias() {
        let app = create_router(create_test_state());

        let (status, body) =
            get_json(app, "/api/locations/search?query=mall&latitude=95&longitude=0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let app = create_router(Arc::new(AppState::with_result_limit(2)));

        let (_, body) = get_json(app, "/api/locations/search?query=kumasi").await;

        assert_eq!(envelope::normalize_predictions(body).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_details_endpoint() {
        let state = create_test_state();

        let (status, body) =
            get_json(create_router(state.clone()), "/api/locations/details/tech_junction").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(envelope::normalize_details(body).unwrap().name, "Tech Junction");

        let (status, body) =
            get_json(create_router(state), "/api/locations/details/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_reverse_geocode_endpoint() {
        let app = create_router(create_test_state());

        let (status, body) = get_json(
            app,
            "/api/locations/reverse-geocode?latitude=6.6885&longitude=-1.6244",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            envelope::normalize_address(body).unwrap(),
            "Adum, Kumasi, Ashanti Region, Ghana"
        );
    }

    #[tokio::test]
    async fn test_status_update_endpoint() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/waste-collections/req-1/status")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"status":"cancelled"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.status_of("req-1").await, Some(CollectionStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_position_endpoints() {
        let state = create_test_state();

        let (status, _) = get_json(
            create_router(state.clone()),
            "/api/waste-collections/req-1/recycler-location",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let response = create_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/waste-collections/req-1/recycler-location")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"latitude":6.67,"longitude":-1.57}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, body) = get_json(
            create_router(state),
            "/api/waste-collections/req-1/recycler-location",
        )
        .await;
        assert_eq!(
            envelope::normalize_position(body).unwrap(),
            Coordinate::new(6.67, -1.57)
        );
    }
}
