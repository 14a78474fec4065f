//! Remote sync client for babylog.
//!
//! A thin contract over the hosted profile/event store: create profile,
//! fetch profile, fetch events, append events, health check. All calls are
//! unauthenticated JSON over HTTP with no retry and no timeout; any failure
//! surfaces immediately to the caller.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Payload for profile creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    /// Child name.
    pub name: String,
    /// Birth date as entered (`YYYY-MM-DD`).
    pub birth_date: String,
}

/// A profile as the remote returns it.
///
/// The server assigns the identifier under either `id` or `_id` depending on
/// deployment; [`RemoteProfile::id`] coalesces the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteProfile {
    /// Identifier under the `id` key, if present.
    #[serde(default)]
    pub id: Option<String>,
    /// Identifier under the `_id` key, if present.
    #[serde(default, rename = "_id")]
    pub fallback_id: Option<String>,
    /// Profile name, if present.
    #[serde(default)]
    pub name: Option<String>,
}

impl RemoteProfile {
    /// The profile identifier, whichever key carried it.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().or(self.fallback_id.as_deref())
    }
}

/// The remote operations the engine consumes.
///
/// The HTTP implementation is [`HttpApi`]; tests substitute scripted doubles.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Create a profile; the response carries the assigned id.
    async fn create_profile(&self, request: &CreateProfileRequest) -> Result<RemoteProfile>;

    /// Fetch a single profile.
    async fn fetch_profile(&self, profile_id: &str) -> Result<RemoteProfile>;

    /// Fetch all raw event-note strings for a profile.
    async fn fetch_events(&self, profile_id: &str) -> Result<Vec<String>>;

    /// Append event-note strings to a profile.
    async fn add_events(&self, profile_id: &str, events: &[String]) -> Result<Value>;

    /// Probe the API liveness endpoint.
    async fn health_check(&self) -> Result<Value>;
}

/// reqwest-backed implementation of [`RemoteApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    health_url: String,
}

impl HttpApi {
    /// Build a client against the configured endpoints.
    ///
    /// Deliberately no timeout and no retry: a hung request blocks its
    /// operation until the transport gives up.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_url: config.health_url.trim_end_matches('/').to_string(),
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("request failed with status {}", status.as_u16())
            } else {
                body
            };
            return Err(Error::request_failed(message));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn create_profile(&self, request: &CreateProfileRequest) -> Result<RemoteProfile> {
        debug!("creating profile for {}", request.name);
        let response = self.http.post(&self.base_url).json(request).send().await?;
        Self::decode(response).await
    }

    async fn fetch_profile(&self, profile_id: &str) -> Result<RemoteProfile> {
        let url = format!("{}/{profile_id}", self.base_url);
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn fetch_events(&self, profile_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/{profile_id}/events", self.base_url);
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn add_events(&self, profile_id: &str, events: &[String]) -> Result<Value> {
        debug!("appending {} event(s) to {profile_id}", events.len());
        let url = format!("{}/{profile_id}/events", self.base_url);
        let response = self.http.post(url).json(&events).send().await?;
        Self::decode(response).await
    }

    async fn health_check(&self) -> Result<Value> {
        let url = format!("{}/health", self.health_url);
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_against(server: &MockServer) -> HttpApi {
        HttpApi::new(&ApiConfig {
            base_url: format!("{}/v1/babies", server.uri()),
            health_url: server.uri(),
        })
    }

    #[test]
    fn test_remote_profile_id_coalesces() {
        let direct = RemoteProfile {
            id: Some("abc".to_string()),
            ..RemoteProfile::default()
        };
        assert_eq!(direct.id(), Some("abc"));

        let underscored: RemoteProfile =
            serde_json::from_str(r#"{"_id": "xyz", "name": "Ava"}"#).unwrap();
        assert_eq!(underscored.id(), Some("xyz"));

        assert_eq!(RemoteProfile::default().id(), None);
    }

    #[tokio::test]
    async fn test_create_profile_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/babies"))
            .and(body_json(json!({"name": "Ava", "birthDate": "2025-11-02"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "_id": "abc123",
                "name": "Ava",
                "birthDate": "2025-11-02"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_against(&server);
        let profile = api
            .create_profile(&CreateProfileRequest {
                name: "Ava".to_string(),
                birth_date: "2025-11-02".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(profile.id(), Some("abc123"));
        assert_eq!(profile.name.as_deref(), Some("Ava"));
    }

    #[tokio::test]
    async fn test_fetch_events_returns_note_strings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/babies/abc123/events"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!(["Feeding", "Nap started"])),
            )
            .mount(&server)
            .await;

        let api = api_against(&server);
        let events = api.fetch_events("abc123").await.unwrap();
        assert_eq!(events, vec!["Feeding", "Nap started"]);
    }

    #[tokio::test]
    async fn test_add_events_posts_note_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/babies/abc123/events"))
            .and(body_json(json!(["[Feeding] @ 14:05 • Mood: calm"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_against(&server);
        let ack = api
            .add_events("abc123", &["[Feeding] @ 14:05 • Mood: calm".to_string()])
            .await
            .unwrap();
        assert_eq!(ack["ok"], json!(true));
    }

    #[tokio::test]
    async fn test_non_success_carries_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/babies/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such baby"))
            .mount(&server)
            .await;

        let api = api_against(&server);
        let err = api.fetch_profile("missing").await.unwrap_err();

        assert!(err.is_remote_failure());
        assert!(err.to_string().contains("no such baby"));
    }

    #[tokio::test]
    async fn test_non_success_empty_body_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/babies/broken/events"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = api_against(&server);
        let err = api.fetch_events("broken").await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_health_check_hits_health_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_against(&server);
        let payload = api.health_check().await.unwrap();
        assert_eq!(payload["status"], json!("ok"));
    }
}
