use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{
    AgentStats, Chief, ChiefStats, Digitador, Leader, LeaderStats, PagedResult, StatusCounts,
    Voter,
};
use crate::domain::errors::ApiError;
use crate::domain::ports::{
    AuthApi, ChiefInput, DashboardApi, DigitadorInput, LeaderInput, RecordsApi, ReportKind,
    SessionStorage, VoterInput, VoterLogQuery,
};
use crate::interface_adapters::envelope::{normalize_failure, unwrap_envelope};
use crate::interface_adapters::protocol::{LoginRequest, LoginResponse, ReportQuery};
use crate::use_cases::session::TOKEN_KEY;

/// reqwest client for the console backend.
///
/// Every response goes through the envelope normalizer, so callers only see
/// the bare payload or an [`ApiError`]. The bearer token is read from session
/// storage on each request.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.get(TOKEN_KEY) {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(err) => {
                tracing::warn!(error = %err, "could not read session token; sending anonymously.");
                request
            }
        }
    }

    // Sends the request and turns every non-2xx outcome into a normalized error.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await.map_err(|err| {
            tracing::debug!(error = %err, "request failed before a response.");
            normalize_failure(None, None)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Keep the upstream body so envelope messages reach the user.
        let body = response.json::<Value>().await.ok();
        tracing::debug!(status = status.as_u16(), "backend returned an error status.");
        Err(normalize_failure(Some(status.as_u16()), body))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|_| normalize_failure(None, None))?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice::<Value>(&bytes).map_err(|err| {
                tracing::warn!(status, error = %err, "response body is not json.");
                ApiError::decode(status)
            })?
        };

        serde_json::from_value(unwrap_envelope(body)).map_err(|err| {
            tracing::warn!(status, error = %err, "response payload has an unexpected shape.");
            ApiError::decode(status)
        })
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch(self.http.get(self.url(path))).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    #[tracing::instrument(name = "api_login", skip_all, fields(username = %username))]
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .http
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password });
        let response: LoginResponse = self.fetch(request).await?;
        Ok(response.access_token)
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn status_counts(&self) -> Result<StatusCounts, ApiError> {
        self.get("/dashboard/stats").await
    }

    async fn agent_stats(&self) -> Result<Vec<AgentStats>, ApiError> {
        self.get("/dashboard/digitadores").await
    }

    async fn leader_stats(&self) -> Result<Vec<LeaderStats>, ApiError> {
        self.get("/dashboard/leaders").await
    }

    async fn chief_stats(&self) -> Result<Vec<ChiefStats>, ApiError> {
        self.get("/dashboard/chiefs").await
    }

    async fn leaders(&self) -> Result<Vec<Leader>, ApiError> {
        self.get("/leaders").await
    }

    async fn chiefs(&self) -> Result<Vec<Chief>, ApiError> {
        self.get("/chiefs").await
    }

    async fn voter_log(&self, query: &VoterLogQuery) -> Result<PagedResult<Voter>, ApiError> {
        let request = self
            .http
            .get(self.url("/voters/my-records"))
            .query(query);
        let page: PagedResult<Voter> = self.fetch(request).await?;
        Ok(page.normalized(query.limit))
    }
}

#[async_trait]
impl RecordsApi for ApiClient {
    async fn register_voter(&self, input: &VoterInput) -> Result<Voter, ApiError> {
        self.fetch(self.http.post(self.url("/voters")).json(input))
            .await
    }

    async fn update_voter(&self, id: &str, input: &VoterInput) -> Result<Voter, ApiError> {
        self.fetch(self.http.patch(self.url(&format!("/voters/{id}"))).json(input))
            .await
    }

    async fn create_leader(&self, input: &LeaderInput) -> Result<Leader, ApiError> {
        self.fetch(self.http.post(self.url("/leaders")).json(input))
            .await
    }

    async fn update_leader(&self, id: &str, input: &LeaderInput) -> Result<Leader, ApiError> {
        self.fetch(self.http.patch(self.url(&format!("/leaders/{id}"))).json(input))
            .await
    }

    async fn delete_leader(&self, id: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(&format!("/leaders/{id}"))))
            .await
    }

    async fn create_chief(&self, input: &ChiefInput) -> Result<Chief, ApiError> {
        self.fetch(self.http.post(self.url("/chiefs")).json(input))
            .await
    }

    async fn update_chief(&self, id: &str, input: &ChiefInput) -> Result<Chief, ApiError> {
        self.fetch(self.http.patch(self.url(&format!("/chiefs/{id}"))).json(input))
            .await
    }

    async fn delete_chief(&self, id: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(&format!("/chiefs/{id}"))))
            .await
    }

    async fn digitadors(&self) -> Result<Vec<Digitador>, ApiError> {
        self.get("/users/digitators").await
    }

    async fn create_digitador(&self, input: &DigitadorInput) -> Result<Digitador, ApiError> {
        self.fetch(self.http.post(self.url("/users")).json(input))
            .await
    }

    async fn update_digitador(
        &self,
        id: &str,
        input: &DigitadorInput,
    ) -> Result<Digitador, ApiError> {
        self.fetch(self.http.patch(self.url(&format!("/users/{id}"))).json(input))
            .await
    }

    async fn delete_digitador(&self, id: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(&format!("/users/{id}"))))
            .await
    }

    // Binary body; never passed through the envelope parser.
    async fn report(&self, kind: ReportKind, filter_id: Option<&str>) -> Result<Vec<u8>, ApiError> {
        let (path, query) = match kind {
            ReportKind::ByLeader => (
                "/reports/leader",
                ReportQuery {
                    leader_id: filter_id,
                    ..Default::default()
                },
            ),
            ReportKind::ByChief => (
                "/reports/chief",
                ReportQuery {
                    chief_id: filter_id,
                    ..Default::default()
                },
            ),
        };
        let response = self
            .send(self.http.get(self.url(path)).query(&query))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|_| normalize_failure(None, None))?;
        Ok(bytes.to_vec())
    }
}
