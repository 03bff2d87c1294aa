//! HTTP gateway client
//!
//! Talks to the places/geocoding backend and the collection status
//! endpoints. All response bodies go through [`envelope`] before they leave
//! this module.

pub mod envelope;

use crate::config::Config;
use crate::constants::api::{COLLECTIONS_PATH, DETAILS_PATH, REVERSE_GEOCODE_PATH, SEARCH_PATH};
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::search::{LocationSuggestion, PlacesGateway};
use crate::tracking::{CollectionStatus, StatusReporter};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("pickup-radar/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed gateway
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (e.g. `http://host:port/api`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a gateway from the `[gateway]` config section
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.gateway.base_url.clone(),
            Duration::from_millis(config.gateway.timeout_ms),
        )
    }

    /// Base URL the endpoint paths are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn collection_url(&self, collection_id: &str, suffix: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url,
            COLLECTIONS_PATH,
            urlencoding::encode(collection_id),
            suffix
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url, "gateway GET");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Gateway(format!(
                "Gateway returned status: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Current recycler position for a collection
    pub async fn recycler_position(&self, collection_id: &str) -> Result<Coordinate> {
        let body = self
            .get_json(&self.collection_url(collection_id, "recycler-location"))
            .await?;
        envelope::normalize_position(body)
    }
}

impl PlacesGateway for HttpGateway {
    async fn search(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> Result<Vec<LocationSuggestion>> {
        let mut url = format!("{}?query={}", self.url(SEARCH_PATH), urlencoding::encode(query));
        if let Some(bias) = bias {
            url.push_str(&format!(
                "&latitude={}&longitude={}",
                bias.latitude, bias.longitude
            ));
        }

        envelope::normalize_predictions(self.get_json(&url).await?)
    }

    async fn details(&self, place_id: &str) -> Result<LocationSuggestion> {
        let url = format!("{}/{}", self.url(DETAILS_PATH), urlencoding::encode(place_id));
        envelope::normalize_details(self.get_json(&url).await?)
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String> {
        let url = format!(
            "{}?latitude={}&longitude={}",
            self.url(REVERSE_GEOCODE_PATH),
            coordinate.latitude,
            coordinate.longitude
        );
        envelope::normalize_address(self.get_json(&url).await?)
    }
}

impl StatusReporter for HttpGateway {
    async fn update_status(&self, collection_id: &str, status: CollectionStatus) -> Result<()> {
        let url = self.collection_url(collection_id, "status");
        debug!(url, %status, "gateway PATCH");

        let response = self
            .client
            .patch(&url)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Gateway(format!(
                "Status update returned status: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::routes::create_router;
    use crate::server::state::AppState;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn spawn_demo_gateway() -> (HttpGateway, Arc<AppState>) {
        let state = Arc::new(AppState::new());
        let app = create_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let gateway =
            HttpGateway::new(format!("http://{}/api/", addr), Duration::from_secs(5)).unwrap();
        (gateway, state)
    }

    #[test]
    fn test_base_url_trimmed() {
        let gateway = HttpGateway::new("http://example.test/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.base_url(), "http://example.test/api");
        assert_eq!(
            gateway.collection_url("a b", "status"),
            "http://example.test/api/waste-collections/a%20b/status"
        );
    }

    #[tokio::test]
    async fn test_search_round_trip() {
        let (gateway, _) = spawn_demo_gateway().await;

        let results = gateway.search("Unity Oil", None).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "atonsu_unity_oil");
        assert!(results[0].coordinate.is_some());
    }

    #[tokio::test]
    async fn test_search_with_bias() {
        let (gateway, _) = spawn_demo_gateway().await;
        let bias = Coordinate::new(5.6226, -0.1731);

        let results = gateway.search("mall", Some(bias)).await.unwrap();

        assert_eq!(results[0].id, "accra_mall");
    }

    #[tokio::test]
    async fn test_details_round_trip() {
        let (gateway, _) = spawn_demo_gateway().await;

        let place = gateway.details("knust_campus").await.unwrap();
        assert_eq!(place.name, "KNUST Campus");

        assert!(gateway.details("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_reverse_geocode_round_trip() {
        let (gateway, _) = spawn_demo_gateway().await;

        let address = gateway
            .reverse_geocode(Coordinate::new(6.6734, -1.5714))
            .await
            .unwrap();
        assert_eq!(address, "University Post Office, Kumasi, Ghana");

        assert!(gateway.reverse_geocode(Coordinate::new(0.0, 0.0)).await.is_err());
    }

    #[tokio::test]
    async fn test_status_update_and_position() {
        let (gateway, state) = spawn_demo_gateway().await;

        gateway
            .update_status("req-1", CollectionStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(state.status_of("req-1").await, Some(CollectionStatus::InProgress));

        assert!(gateway.recycler_position("req-1").await.is_err());
        let here = Coordinate::new(6.66, -1.59);
        state.set_position("req-1", here).await;
        assert_eq!(gateway.recycler_position("req-1").await.unwrap(), here);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_errors() {
        let gateway = HttpGateway::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap();
        assert!(gateway.search("adum", None).await.is_err());
    }
}
