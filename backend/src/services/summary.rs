//! Client summary service for the client details page

use shared::normalize::client_summary;
use shared::{ClientSummary, EntityId};

use crate::error::AppResult;
use crate::external::UpstreamClient;
use crate::middleware::BearerToken;

/// Client summary service
#[derive(Clone)]
pub struct SummaryService {
    upstream: UpstreamClient,
}

impl SummaryService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Sales total, counts and status of a client
    pub async fn client_summary(
        &self,
        token: &BearerToken,
        client_id: EntityId,
    ) -> AppResult<ClientSummary> {
        let dashboard = self.upstream.client_dashboard(token, client_id).await?;
        let summary = client_summary(&dashboard);
        tracing::debug!(
            "Client {} summary: {} services, status {:?}",
            client_id,
            summary.service_count,
            summary.status
        );
        Ok(summary)
    }
}
