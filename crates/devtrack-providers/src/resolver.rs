//! Reverse geocoding.
//!
//! An [`AddressResolver`] turns coordinates into a human-readable address.
//! It never fails past its boundary: any lookup problem degrades to one of
//! the sentinel strings below.

use std::time::Duration;

use async_trait::async_trait;
use devtrack_core::config::ResolverSettings;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ProviderError;

/// The service answered, but without an address for these coordinates.
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// The lookup itself failed (network, status code, malformed payload).
pub const ADDRESS_LOOKUP_FAILED: &str = "Address lookup failed";

/// Coordinates to address, infallible by contract.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, latitude: f64, longitude: f64) -> String;
}

/// Renders the coordinates themselves. Used when geocoding is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateResolver;

#[async_trait]
impl AddressResolver for CoordinateResolver {
    async fn resolve(&self, latitude: f64, longitude: f64) -> String {
        format!("{latitude:.6}, {longitude:.6}")
    }
}

/// Subset of the Nominatim `/reverse` JSON answer.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<serde_json::Value>,
}

/// OpenStreetMap Nominatim reverse geocoder.
pub struct NominatimResolver {
    http_client: Client,
    base_url: String,
}

impl NominatimResolver {
    pub fn new(settings: &ResolverSettings) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<String>, reqwest::Error> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<ReverseResponse>().await?;
        Ok(match body {
            ReverseResponse {
                display_name: Some(name),
                address: Some(_),
            } => Some(name),
            _ => None,
        })
    }
}

#[async_trait]
impl AddressResolver for NominatimResolver {
    async fn resolve(&self, latitude: f64, longitude: f64) -> String {
        match self.lookup(latitude, longitude).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                debug!(latitude, longitude, "No address for coordinates");
                ADDRESS_NOT_FOUND.to_string()
            }
            Err(e) => {
                warn!(latitude, longitude, error = %e, "Reverse geocoding failed");
                ADDRESS_LOOKUP_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn resolver_for(url: String) -> NominatimResolver {
        NominatimResolver::new(&ResolverSettings {
            base_url: url,
            timeout_seconds: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolves_display_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/reverse")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("lat".into(), "10.5".into()),
                Matcher::UrlEncoded("lon".into(), "20.25".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"display_name": "1 Main St, Springfield", "address": {"road": "Main St"}}"#)
            .create_async()
            .await;

        let address = resolver_for(server.url()).resolve(10.5, 20.25).await;

        assert_eq!(address, "1 Main St, Springfield");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_address_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "Unable to geocode"}"#)
            .create_async()
            .await;

        let address = resolver_for(server.url()).resolve(0.0, 0.0).await;
        assert_eq!(address, ADDRESS_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let address = resolver_for(server.url()).resolve(1.0, 2.0).await;
        assert_eq!(address, ADDRESS_LOOKUP_FAILED);
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/reverse")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let address = resolver_for(server.url()).resolve(1.0, 2.0).await;
        assert_eq!(address, ADDRESS_LOOKUP_FAILED);
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let address = resolver_for("http://127.0.0.1:9".to_string())
            .resolve(1.0, 2.0)
            .await;
        assert_eq!(address, ADDRESS_LOOKUP_FAILED);
    }

    #[tokio::test]
    async fn test_coordinate_resolver() {
        let address = CoordinateResolver.resolve(10.0, -20.5).await;
        assert_eq!(address, "10.000000, -20.500000");
    }
}
