//! Marketplace client: capability trait and HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::MarketplaceError;
use crate::types::{Assignment, Balance, CreatedHit, Environment, Hit, HitRequest};

/// Default timeout for marketplace API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("hitdesk/", env!("CARGO_PKG_VERSION"));

/// Capability contract the shell consumes. Every call is synchronous from
/// the shell's point of view: one round-trip, no client-side state.
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// Publish a new HIT in the request's environment.
    async fn create_hit(&self, request: &HitRequest) -> Result<CreatedHit, MarketplaceError>;

    /// All currently active HITs in `env`.
    async fn get_active_hits(&self, env: Environment) -> Result<Vec<Hit>, MarketplaceError>;

    /// Submitted assignments awaiting review in `env`.
    async fn get_workers(&self, env: Environment) -> Result<Vec<Assignment>, MarketplaceError>;

    /// Approve one assignment. `Ok(false)` means the marketplace refused.
    async fn approve_worker(
        &self,
        env: Environment,
        assignment_id: &str,
    ) -> Result<bool, MarketplaceError>;

    /// Reject one assignment. `Ok(false)` means the marketplace refused.
    async fn reject_worker(
        &self,
        env: Environment,
        assignment_id: &str,
    ) -> Result<bool, MarketplaceError>;

    /// Account balance for `env`.
    async fn check_balance(&self, env: Environment) -> Result<Balance, MarketplaceError>;

    /// Add assignments and/or hours to a published HIT.
    async fn extend_hit(
        &self,
        env: Environment,
        hit_id: &str,
        assignments: Option<u32>,
        expiration_hours: Option<u32>,
    ) -> Result<(), MarketplaceError>;

    /// Expire a published HIT immediately.
    async fn expire_hit(&self, env: Environment, hit_id: &str) -> Result<(), MarketplaceError>;
}

/// Endpoint and credential configuration for [`HttpMarketplaceClient`].
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    pub sandbox_endpoint: String,
    pub live_endpoint: String,
    pub api_token: String,
}

/// REST implementation of [`MarketplaceClient`].
pub struct HttpMarketplaceClient {
    http: Client,
    config: MarketplaceConfig,
}

#[derive(Deserialize)]
struct ReviewOutcome {
    ok: bool,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

impl HttpMarketplaceClient {
    pub fn new(config: MarketplaceConfig) -> Result<Self, MarketplaceError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .tcp_nodelay(true)
            .build()?;
        Ok(Self { http, config })
    }

    fn base_url(&self, env: Environment) -> &str {
        match env {
            Environment::Sandbox => &self.config.sandbox_endpoint,
            Environment::Live => &self.config.live_endpoint,
        }
    }

    fn url(&self, env: Environment, path: &str) -> String {
        format!("{}{}", self.base_url(env).trim_end_matches('/'), path)
    }

    /// Turn a non-success response into a typed API error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MarketplaceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(MarketplaceError::MissingToken);
        }
        let message = response
            .json::<ApiMessage>()
            .await
            .map(|m| m.message)
            .unwrap_or_default();
        Err(MarketplaceError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.config.api_token)
    }
}

#[async_trait]
impl MarketplaceClient for HttpMarketplaceClient {
    async fn create_hit(&self, request: &HitRequest) -> Result<CreatedHit, MarketplaceError> {
        let url = self.url(request.environment, "/hits");
        debug!(%url, workers = request.max_assignments, "creating HIT");
        let response = self
            .authorized(self.http.post(&url))
            .json(&json!({
                "max_assignments": request.max_assignments,
                "reward": request.reward,
                "duration_hours": request.duration_hours,
            }))
            .send()
            .await?;
        let created = Self::check(response).await?.json::<CreatedHit>().await?;
        Ok(created)
    }

    async fn get_active_hits(&self, env: Environment) -> Result<Vec<Hit>, MarketplaceError> {
        let url = self.url(env, "/hits?status=active");
        let response = self.authorized(self.http.get(&url)).send().await?;
        let hits = Self::check(response).await?.json::<Vec<Hit>>().await?;
        Ok(hits)
    }

    async fn get_workers(&self, env: Environment) -> Result<Vec<Assignment>, MarketplaceError> {
        let url = self.url(env, "/assignments?status=submitted");
        let response = self.authorized(self.http.get(&url)).send().await?;
        let workers = Self::check(response)
            .await?
            .json::<Vec<Assignment>>()
            .await?;
        Ok(workers)
    }

    async fn approve_worker(
        &self,
        env: Environment,
        assignment_id: &str,
    ) -> Result<bool, MarketplaceError> {
        let url = self.url(env, &format!("/assignments/{assignment_id}/approve"));
        let response = self.authorized(self.http.post(&url)).send().await?;
        let outcome = Self::check(response).await?.json::<ReviewOutcome>().await?;
        Ok(outcome.ok)
    }

    async fn reject_worker(
        &self,
        env: Environment,
        assignment_id: &str,
    ) -> Result<bool, MarketplaceError> {
        let url = self.url(env, &format!("/assignments/{assignment_id}/reject"));
        let response = self.authorized(self.http.post(&url)).send().await?;
        let outcome = Self::check(response).await?.json::<ReviewOutcome>().await?;
        Ok(outcome.ok)
    }

    async fn check_balance(&self, env: Environment) -> Result<Balance, MarketplaceError> {
        let url = self.url(env, "/balance");
        let response = self.authorized(self.http.get(&url)).send().await?;
        let balance = Self::check(response).await?.json::<Balance>().await?;
        Ok(balance)
    }

    async fn extend_hit(
        &self,
        env: Environment,
        hit_id: &str,
        assignments: Option<u32>,
        expiration_hours: Option<u32>,
    ) -> Result<(), MarketplaceError> {
        let url = self.url(env, &format!("/hits/{hit_id}/extend"));
        let response = self
            .authorized(self.http.post(&url))
            .json(&json!({
                "assignments": assignments,
                "expiration_hours": expiration_hours,
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn expire_hit(&self, env: Environment, hit_id: &str) -> Result<(), MarketplaceError> {
        let url = self.url(env, &format!("/hits/{hit_id}/expire"));
        let response = self.authorized(self.http.post(&url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpMarketplaceClient {
        HttpMarketplaceClient::new(MarketplaceConfig {
            sandbox_endpoint: server.uri(),
            live_endpoint: "http://live.invalid".to_string(),
            api_token: "test-token".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn create_hit_posts_request_and_decodes_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hit_id": "HIT123"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created = client
            .create_hit(&HitRequest {
                environment: Environment::Sandbox,
                max_assignments: 5,
                reward: "2.00".to_string(),
                duration_hours: 1,
            })
            .await
            .unwrap();
        assert_eq!(created.hit_id, "HIT123");
    }

    #[tokio::test]
    async fn get_active_hits_decodes_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hits"))
            .and(query_param("status", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "hit_id": "HIT1",
                    "title": "survey",
                    "max_assignments": 3,
                    "reward": "1.50",
                    "duration_hours": 2,
                    "expiration": null,
                    "status": "active"
                }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let hits = client.get_active_hits(Environment::Sandbox).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hit_id, "HIT1");
    }

    #[tokio::test]
    async fn approve_worker_reports_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assignments/A9/approve"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": false })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let approved = client
            .approve_worker(Environment::Sandbox, "A9")
            .await
            .unwrap();
        assert!(!approved);
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hits/HIT1/expire"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "no such HIT"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .expire_hit(Environment::Sandbox, "HIT1")
            .await
            .unwrap_err();
        match err {
            MarketplaceError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such HIT");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_maps_to_missing_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/balance"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.check_balance(Environment::Sandbox).await.unwrap_err();
        assert!(matches!(err, MarketplaceError::MissingToken));
    }
}
