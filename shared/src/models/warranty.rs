//! Warranty models
//!
//! `PurchasedItem` is the strict shape the evaluator consumes. Everything else
//! in this module is derived from it and never persisted.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize::parse_timestamp;
use crate::types::{EntityId, Timestamp};

/// Vehicle a purchased item was installed on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleRef {
    pub id: EntityId,
    #[serde(default)]
    pub plate: Option<String>,
}

/// A battery line item sold or fitted during a service record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PurchasedItem {
    pub item_id: Option<EntityId>,
    pub battery_id: Option<EntityId>,
    pub battery_code: Option<String>,
    pub battery_model: Option<String>,
    /// Coverage start. Malformed values deserialize to `None`.
    #[serde(deserialize_with = "lenient_timestamp")]
    pub purchase_date: Option<Timestamp>,
    /// Zero or absent means no warranty is tracked
    pub warranty_months: Option<i32>,
    /// Remaining months supplied directly by the upstream record
    pub remaining_months_hint: Option<f64>,
    pub vehicle: Option<VehicleRef>,
    pub service_record_id: Option<EntityId>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse_timestamp))
}

/// Remaining coverage of a purchased item at a given instant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarrantyEvaluation {
    /// Negative once coverage has ended, `None` when unknown
    pub days_remaining: Option<i64>,
    pub months_remaining: Option<i64>,
    pub expiry: Option<Timestamp>,
    pub is_expired: bool,
    pub is_unknown: bool,
}

impl WarrantyEvaluation {
    /// No basis for computation
    pub fn unknown() -> Self {
        Self {
            days_remaining: None,
            months_remaining: None,
            expiry: None,
            is_expired: false,
            is_unknown: true,
        }
    }

    pub fn from_days(days_remaining: i64, expiry: Timestamp) -> Self {
        Self {
            days_remaining: Some(days_remaining),
            months_remaining: Some(days_remaining.div_euclid(30).max(0)),
            expiry: Some(expiry),
            is_expired: days_remaining <= 0,
            is_unknown: false,
        }
    }

    pub fn status(&self) -> CoverageStatus {
        match self.days_remaining {
            None => CoverageStatus::Unknown,
            Some(days) if days > 0 => CoverageStatus::Valid,
            Some(_) => CoverageStatus::Expired,
        }
    }
}

/// Display state of a single item's coverage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Valid,
    Expired,
    /// Rendered as "no information", never as expired
    Unknown,
}

impl std::fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageStatus::Valid => write!(f, "Vigente"),
            CoverageStatus::Expired => write!(f, "Expirada"),
            CoverageStatus::Unknown => write!(f, "Sem informação"),
        }
    }
}

/// A purchased item paired with its evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluatedItem {
    pub item: PurchasedItem,
    pub evaluation: WarrantyEvaluation,
}

/// What a warranty group is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GroupKey {
    Vehicle(EntityId),
    /// Items without a vehicle, grouped by their owning service record
    ServiceRecord(EntityId),
    /// Items with neither a vehicle nor a service record
    Unassigned,
}

impl GroupKey {
    pub fn for_item(item: &PurchasedItem) -> Self {
        match (&item.vehicle, item.service_record_id) {
            (Some(vehicle), _) => GroupKey::Vehicle(vehicle.id),
            (None, Some(record)) => GroupKey::ServiceRecord(record),
            (None, None) => GroupKey::Unassigned,
        }
    }
}

/// All purchased items sharing a group key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleWarrantyGroup {
    pub key: GroupKey,
    pub plate: Option<String>,
    pub items: Vec<EvaluatedItem>,
}

impl VehicleWarrantyGroup {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            plate: None,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: PurchasedItem, evaluation: WarrantyEvaluation) {
        if self.plate.is_none() {
            self.plate = item.vehicle.as_ref().and_then(|v| v.plate.clone());
        }
        self.items.push(EvaluatedItem { item, evaluation });
    }

    /// At least one item still has days of coverage left
    pub fn has_valid_coverage(&self) -> bool {
        self.items
            .iter()
            .any(|i| i.evaluation.status() == CoverageStatus::Valid)
    }

    /// Every item is known to be expired; unknown items block this
    pub fn is_fully_expired(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|i| i.evaluation.status() == CoverageStatus::Expired)
    }

    /// Earliest expiry among the group's items, `None` if nothing is dated
    pub fn earliest_expiry(&self) -> Option<Timestamp> {
        self.items.iter().filter_map(|i| i.evaluation.expiry).min()
    }

    /// Order items by ascending expiry, undated items last; ties keep
    /// their current order
    pub fn sort_items(&mut self) {
        self.items
            .sort_by(|a, b| cmp_expiry(a.evaluation.expiry, b.evaluation.expiry));
    }
}

/// Ascending expiry order where a missing expiry behaves as +infinity
pub fn cmp_expiry(a: Option<Timestamp>, b: Option<Timestamp>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Groups split for display
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WarrantyPartition {
    /// Groups with at least one item still covered
    pub valid: Vec<VehicleWarrantyGroup>,
    /// Groups whose items are all known to be expired
    pub expired: Vec<VehicleWarrantyGroup>,
}

/// Everything the client warranty view renders
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WarrantyReport {
    /// Input order, one entry per purchased item
    pub items: Vec<EvaluatedItem>,
    pub valid: Vec<VehicleWarrantyGroup>,
    pub expired: Vec<VehicleWarrantyGroup>,
}
