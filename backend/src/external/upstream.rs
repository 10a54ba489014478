//! Client for the upstream business API
//!
//! The console never owns data: clients, vehicles and service records live
//! behind this API. Every call forwards the caller's bearer token.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::EntityId;

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::BearerToken;

/// Upstream API client
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a new UpstreamClient from configuration
    pub fn new(config: &UpstreamConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET /clientes/:id/dashboard`
    pub async fn client_dashboard(
        &self,
        token: &BearerToken,
        client_id: EntityId,
    ) -> AppResult<Value> {
        self.get_json(token, &format!("clientes/{}/dashboard", client_id), "Client")
            .await
    }

    /// `GET /atendimentos/:id`
    pub async fn service_record(&self, token: &BearerToken, id: EntityId) -> AppResult<Value> {
        self.get_json(token, &format!("atendimentos/{}", id), "Service record")
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json(&self, token: &BearerToken, path: &str, resource: &str) -> AppResult<Value> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, resource, &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid JSON from {}: {}", path, e)))
    }
}

fn map_status(status: StatusCode, resource: &str, body: &str) -> AppError {
    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(resource.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::Unauthorized(format!("upstream rejected the token ({})", status))
        }
        _ => AppError::Upstream(format!("{} - {}", status, body)),
    }
}
