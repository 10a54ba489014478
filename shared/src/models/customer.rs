//! Client and vehicle models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Client create/edit form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientForm {
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
}

/// Vehicle create/edit form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleForm {
    pub placa: String,
    pub modelo: String,
    pub marca: Option<String>,
    /// Kept as a float so non-integer input can be reported instead of rejected
    pub ano: Option<f64>,
}

/// Engagement status shown on the client dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClientStatus {
    Active,
    AtRisk,
    #[default]
    Dormant,
}

impl ClientStatus {
    /// Map the free-text `summary.status` returned by the dashboard endpoint
    pub fn from_summary(status: Option<&str>) -> Self {
        match status.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("ativo") => ClientStatus::Active,
            Some("at-risk" | "em risco" | "risco") => ClientStatus::AtRisk,
            _ => ClientStatus::Dormant,
        }
    }
}

/// Headline numbers of the client details page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSummary {
    /// Value of every item attended for this client
    pub sales_total: Decimal,
    pub service_count: usize,
    pub vehicle_count: usize,
    pub status: ClientStatus,
}
