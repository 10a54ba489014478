//! Service record ("atendimento") models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Payload sent to the upstream API when recording a service/sale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRecordPayload {
    pub id_cliente: Option<EntityId>,
    pub id_veiculo: Option<EntityId>,
    /// `YYYY-MM-DD HH:MM:SS` once normalised
    pub data_atendimento: Option<String>,
    pub observacoes: Option<String>,
    pub itens: Vec<ServiceItemPayload>,
}

/// One battery line of a service record payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItemPayload {
    pub id_bateria: EntityId,
    pub quantidade: i32,
    pub valor_unitario: Decimal,
}

/// Monetary fields of a recorded line item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineAmounts {
    pub valor_total: Option<Decimal>,
    pub valor_unitario: Option<Decimal>,
    pub quantidade: Option<Decimal>,
}

impl LineAmounts {
    /// `valor_total` when recorded, otherwise unit price times quantity
    /// (quantity defaults to one). `None` when the product overflows.
    pub fn line_total(&self) -> Option<Decimal> {
        match (self.valor_total, self.valor_unitario) {
            (Some(total), _) => Some(total),
            (None, Some(unit)) => unit.checked_mul(self.quantidade.unwrap_or(Decimal::ONE)),
            (None, None) => Some(Decimal::ZERO),
        }
    }
}

/// Convert the date picker's `YYYY-MM-DDTHH:MM` value into the
/// `YYYY-MM-DD HH:MM:SS` format the upstream API expects
pub fn format_service_date(raw: &str) -> String {
    match raw.split_once('T') {
        Some((date, time)) if !time.is_empty() => format!("{} {}:00", date, time),
        _ => raw.to_string(),
    }
}
