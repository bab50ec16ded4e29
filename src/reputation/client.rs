//! IP reputation client with timeout and error handling.
//!
//! # Responsibilities
//! - Query the geolocation service for one IP per request
//! - Bound every lookup by the configured timeout
//! - Classify failures (timeout, transport, status, payload)
//!
//! No caching: each call is a fresh outbound request.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::timeout;

use crate::config::ReputationConfig;
use crate::observability::metrics;
use crate::reputation::types::{LookupError, Reputation, ReputationResult};

/// Resolves a client IP to reputation data.
#[async_trait]
pub trait ReputationLookup: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> ReputationResult;
}

/// Client for an ip-api compatible service (`GET {base}/json/{ip}`).
#[derive(Clone)]
pub struct IpApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout_duration: Duration,
}

impl IpApiClient {
    pub fn new(config: &ReputationConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_duration: Duration::from_millis(config.timeout_ms),
        })
    }

    async fn fetch(&self, ip: IpAddr) -> ReputationResult {
        let url = format!("{}/json/{}", self.base_url, ip);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        if !body.is_object() {
            return Err(LookupError::Malformed("expected a JSON object".to_string()));
        }

        Ok(Reputation::from_payload(body))
    }
}

#[async_trait]
impl ReputationLookup for IpApiClient {
    async fn lookup(&self, ip: IpAddr) -> ReputationResult {
        let start = Instant::now();
        let result = match timeout(self.timeout_duration, self.fetch(ip)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout(self.timeout_duration.as_millis() as u64)),
        };

        match &result {
            Ok(rep) => {
                metrics::record_lookup("ok", start);
                tracing::debug!(
                    client_ip = %ip,
                    country = %rep.location.country,
                    complete = rep.location.is_complete(),
                    "Reputation lookup succeeded"
                );
            }
            Err(e) => {
                metrics::record_lookup(e.outcome(), start);
                tracing::warn!(client_ip = %ip, error = %e, "Reputation lookup failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout_ms: u64) -> IpApiClient {
        IpApiClient::new(&ReputationConfig {
            base_url: server.uri(),
            timeout_ms,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/1.2.3.4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "country": "Japan",
                "regionName": "Tokyo",
                "city": "Chiyoda",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rep = client_for(&server, 1000)
            .lookup("1.2.3.4".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(rep.location.city, "Chiyoda");
        assert_eq!(rep.raw["regionName"], "Tokyo");
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, 1000)
            .lookup("1.2.3.4".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Status(503)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, 1000)
            .lookup("1.2.3.4".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "country": "Japan" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, 50)
            .lookup("1.2.3.4".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Timeout(50)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_failure() {
        let client = IpApiClient::new(&ReputationConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 1000,
        })
        .unwrap();

        let err = client.lookup("1.2.3.4".parse().unwrap()).await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
    }
}
