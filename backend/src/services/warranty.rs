//! Warranty service for a client's purchased batteries
//! Collects purchased items from the upstream API and evaluates them

use serde_json::Value;
use shared::normalize::{
    dashboard_service_records, items_from_dashboard, items_from_service_record,
    needs_detail_fetch, service_record_id,
};
use shared::{export_csv, warranty_report, EntityId, PurchasedItem, Timestamp, WarrantyReport};

use crate::error::AppResult;
use crate::external::UpstreamClient;
use crate::middleware::BearerToken;

/// Warranty service
#[derive(Clone)]
pub struct WarrantyService {
    upstream: UpstreamClient,
}

impl WarrantyService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Every purchased item of a client
    ///
    /// Uses the dashboard's pre-computed `warranty_items` when present.
    /// Otherwise walks the embedded service records, fetching the full record
    /// for those listed without item details.
    pub async fn client_warranty_items(
        &self,
        token: &BearerToken,
        client_id: EntityId,
    ) -> AppResult<Vec<PurchasedItem>> {
        let dashboard = self.upstream.client_dashboard(token, client_id).await?;

        if let Some(items) = items_from_dashboard(&dashboard) {
            tracing::debug!(
                "Client {}: {} warranty items from dashboard",
                client_id,
                items.len()
            );
            return Ok(items);
        }

        let mut items = Vec::new();
        for record in dashboard_service_records(&dashboard) {
            let detailed = self.with_details(token, record).await;
            items.extend(items_from_service_record(&detailed));
        }

        tracing::debug!(
            "Client {}: {} warranty items from service records",
            client_id,
            items.len()
        );
        Ok(items)
    }

    /// Evaluated items and valid/expired vehicle groups at `now`
    pub async fn client_report(
        &self,
        token: &BearerToken,
        client_id: EntityId,
        now: Timestamp,
    ) -> AppResult<WarrantyReport> {
        let items = self.client_warranty_items(token, client_id).await?;
        Ok(warranty_report(&items, now))
    }

    /// CSV export of every item at `now`
    pub async fn client_export(
        &self,
        token: &BearerToken,
        client_id: EntityId,
        now: Timestamp,
    ) -> AppResult<String> {
        let items = self.client_warranty_items(token, client_id).await?;
        Ok(export_csv(&items, now)?)
    }

    /// The full record when `record` is only a summary; the summary itself if
    /// the fetch fails or the record has no id
    async fn with_details(&self, token: &BearerToken, record: &Value) -> Value {
        if !needs_detail_fetch(record) {
            return record.clone();
        }
        let Some(id) = service_record_id(record) else {
            return record.clone();
        };

        match self.upstream.service_record(token, id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::debug!("Service record {} details unavailable: {}", id, e);
                record.clone()
            }
        }
    }
}
