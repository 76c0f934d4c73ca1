//! Best-effort IP geolocation.
//!
//! Providers are tried in order with a short per-request timeout; the
//! first usable payload wins and results are never merged across
//! providers. Every failure mode degrades to a smaller (possibly empty)
//! [`LocationData`] so lead submission is never blocked on geolocation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use leadflow_config::GeoSettings;
use leadflow_core::{LocationData, LocationLookup};

/// Full-detail provider payload (ipapi.co shape). A body carrying
/// `error: true` is a quota/denial response and counts as a failure.
#[derive(Debug, Deserialize)]
struct PrimaryPayload {
    #[serde(default)]
    error: bool,
    city: Option<String>,
    country_name: Option<String>,
    region: Option<String>,
    ip: Option<String>,
}

/// Fallback payload (ipify shape), IP only.
#[derive(Debug, Deserialize)]
struct FallbackPayload {
    ip: Option<String>,
}

pub struct LocationEnricher {
    http: reqwest::Client,
    settings: GeoSettings,
}

impl LocationEnricher {
    pub fn new(settings: GeoSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_seconds)
    }

    async fn try_primary(&self) -> Option<LocationData> {
        let payload: PrimaryPayload = self
            .http
            .get(&self.settings.primary_url)
            .timeout(self.timeout())
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .json()
            .await
            .ok()?;
        if payload.error {
            return None;
        }
        Some(LocationData {
            city: payload.city,
            country: payload.country_name,
            region: payload.region,
            ip: payload.ip,
        })
    }

    async fn try_fallback(&self) -> Option<LocationData> {
        let payload: FallbackPayload = self
            .http
            .get(&self.settings.fallback_url)
            .timeout(self.timeout())
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .json()
            .await
            .ok()?;
        payload.ip.map(|ip| LocationData {
            ip: Some(ip),
            ..Default::default()
        })
    }
}

#[async_trait]
impl LocationLookup for LocationEnricher {
    async fn fetch_location(&self) -> LocationData {
        if let Some(location) = self.try_primary().await {
            return location;
        }
        tracing::debug!("primary geolocation provider unavailable, trying fallback");
        if let Some(location) = self.try_fallback().await {
            return location;
        }
        tracing::debug!("all geolocation providers failed");
        LocationData::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(primary: &str, fallback: &str) -> GeoSettings {
        GeoSettings {
            primary_url: primary.to_string(),
            fallback_url: fallback.to_string(),
            timeout_seconds: 2,
        }
    }

    #[tokio::test]
    async fn primary_payload_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "city": "Pune",
                "country_name": "India",
                "region": "Maharashtra",
                "ip": "1.2.3.4"
            })))
            .mount(&server)
            .await;

        let enricher = LocationEnricher::new(settings(
            &format!("{}/json/", server.uri()),
            &format!("{}/ip", server.uri()),
        ));
        let location = enricher.fetch_location().await;
        assert_eq!(location.city.as_deref(), Some("Pune"));
        assert_eq!(location.country.as_deref(), Some("India"));
        assert_eq!(location.ip.as_deref(), Some("1.2.3.4"));
    }

    #[tokio::test]
    async fn error_body_falls_through_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": true,
                "reason": "RateLimited"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ip": "5.6.7.8"})),
            )
            .mount(&server)
            .await;

        let enricher = LocationEnricher::new(settings(
            &format!("{}/json/", server.uri()),
            &format!("{}/ip", server.uri()),
        ));
        let location = enricher.fetch_location().await;
        assert_eq!(location.ip.as_deref(), Some("5.6.7.8"));
        assert!(location.city.is_none());
    }

    #[tokio::test]
    async fn all_providers_failing_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let enricher = LocationEnricher::new(settings(
            &format!("{}/json/", server.uri()),
            &format!("{}/ip", server.uri()),
        ));
        assert!(enricher.fetch_location().await.is_empty());
    }
}
