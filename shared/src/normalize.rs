//! Normalization of upstream JSON
//!
//! The upstream API is inconsistent about field names and types (`id` vs
//! `id_item`, numbers sent as strings, dates with or without a zone). This
//! module is the only place that knows about those variants; it maps raw
//! records into [`PurchasedItem`] and friends so the evaluator never has to
//! guess.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{ClientStatus, ClientSummary, LineAmounts, PurchasedItem, VehicleRef};
use crate::types::{EntityId, Timestamp};

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse an upstream date string
///
/// Accepts RFC 3339, zone-less date-times (read as UTC) and bare dates (UTC
/// midnight). Anything else is `None`, never an error.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Purchased items of a service record (`GET /atendimentos/:id` shape)
pub fn items_from_service_record(record: &Value) -> Vec<PurchasedItem> {
    let service_record_id = service_record_id(record);
    let vehicle = vehicle_ref(record);
    let record_date = timestamp_field(record, &["data_atendimento", "dataAtendimento"]);

    item_entries(record)
        .map(|item| {
            let battery = item.get("bateria").filter(|b| b.is_object());
            PurchasedItem {
                item_id: int_field(item, &["id_item", "id"]),
                battery_id: int_field(item, &["id_bateria"])
                    .or_else(|| battery.and_then(|b| int_field(b, &["id_bateria", "id"]))),
                battery_code: battery
                    .and_then(|b| text_field(b, &["codigo"]))
                    .or_else(|| text_field(item, &["codigo"])),
                battery_model: battery
                    .and_then(|b| text_field(b, &["modelo"]))
                    .or_else(|| text_field(item, &["modelo"])),
                purchase_date: timestamp_field(item, &["created_at", "createdAt"]).or(record_date),
                warranty_months: battery
                    .and_then(|b| months_field(b, &["garantia_meses", "garantiaMeses"]))
                    .or_else(|| months_field(item, &["garantia_meses"])),
                remaining_months_hint: float_field(
                    item,
                    &["garantia_restante_meses", "garantia_restante_mes"],
                ),
                vehicle: vehicle.clone(),
                service_record_id,
            }
        })
        .collect()
}

/// A pre-computed entry of the dashboard's `warranty_items` list
///
/// When the dashboard supplies `days_remaining` it wins over any remaining
/// months; it is carried as a hint of `days / 30` months, which the
/// evaluator turns back into the same day count.
pub fn item_from_dashboard_warranty(entry: &Value) -> PurchasedItem {
    let battery = entry.get("bateria").filter(|b| b.is_object());
    let remaining_months_hint = float_field(entry, &["days_remaining"])
        .map(|days| days / 30.0)
        .or_else(|| float_field(entry, &["garantia_restante_meses", "garantia_restante_mes"]));

    PurchasedItem {
        item_id: int_field(entry, &["id_item", "id"]),
        battery_id: int_field(entry, &["id_bateria"]),
        battery_code: text_field(entry, &["codigo"])
            .or_else(|| battery.and_then(|b| text_field(b, &["codigo"]))),
        battery_model: text_field(entry, &["modelo"])
            .or_else(|| battery.and_then(|b| text_field(b, &["modelo"]))),
        purchase_date: timestamp_field(entry, &["purchase_date", "created_at"]),
        warranty_months: months_field(entry, &["garantia_meses"]),
        remaining_months_hint,
        vehicle: entry.get("veiculo").and_then(vehicle_from_object),
        service_record_id: int_field(entry, &["id_atendimento", "atendimentoId"]),
    }
}

/// Non-empty `warranty_items` of a client dashboard, if the API returned any
pub fn items_from_dashboard(dashboard: &Value) -> Option<Vec<PurchasedItem>> {
    dashboard
        .get("warranty_items")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .map(|entries| entries.iter().map(item_from_dashboard_warranty).collect())
}

/// Service records embedded in a client dashboard
pub fn dashboard_service_records(dashboard: &Value) -> &[Value] {
    dashboard
        .get("atendimentos")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// True when no item of `record` carries battery or warranty data, meaning
/// the full record has to be fetched before it can be evaluated
pub fn needs_detail_fetch(record: &Value) -> bool {
    !item_entries(record).any(|item| {
        ["bateria", "garantia_restante_meses", "garantia_meses"]
            .iter()
            .any(|key| item.get(*key).is_some_and(|v| !v.is_null()))
    })
}

/// `id_atendimento` or `id` of a service record
pub fn service_record_id(record: &Value) -> Option<EntityId> {
    int_field(record, &["id_atendimento", "id"])
}

/// Monetary fields of a recorded line item
pub fn line_amounts(item: &Value) -> LineAmounts {
    LineAmounts {
        valor_total: decimal_field(item, &["valor_total"]),
        valor_unitario: decimal_field(item, &["valor_unitario"]),
        quantidade: decimal_field(item, &["quantidade"]),
    }
}

/// Sum of every line total across `records`
///
/// A line whose total cannot be represented, or that would overflow the
/// running sum, is left out.
pub fn sales_total(records: &[Value]) -> Decimal {
    records
        .iter()
        .flat_map(item_entries)
        .filter_map(|item| line_amounts(item).line_total())
        .fold(Decimal::ZERO, |total, line| {
            total.checked_add(line).unwrap_or(total)
        })
}

/// Headline numbers of a client dashboard
///
/// `summary.total_revenue` is used when present; otherwise the total is
/// derived from the embedded service records.
pub fn client_summary(dashboard: &Value) -> ClientSummary {
    let summary = dashboard.get("summary").filter(|s| s.is_object());
    let records = dashboard_service_records(dashboard);
    let vehicle_count = dashboard
        .get("veiculos")
        .and_then(Value::as_array)
        .map(Vec::len)
        .or_else(|| {
            summary
                .and_then(|s| int_field(s, &["veiculos_count"]))
                .and_then(|n| usize::try_from(n).ok())
        })
        .unwrap_or(0);

    ClientSummary {
        sales_total: summary
            .and_then(|s| decimal_field(s, &["total_revenue"]))
            .unwrap_or_else(|| sales_total(records)),
        service_count: records.len(),
        vehicle_count,
        status: ClientStatus::from_summary(
            summary
                .and_then(|s| s.get("status"))
                .and_then(Value::as_str),
        ),
    }
}

fn item_entries(record: &Value) -> impl Iterator<Item = &Value> {
    record
        .get("itens")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}

fn vehicle_ref(record: &Value) -> Option<VehicleRef> {
    let nested = record.get("veiculo").filter(|v| v.is_object());
    nested.and_then(vehicle_from_object).or_else(|| {
        int_field(record, &["id_veiculo"]).map(|id| VehicleRef {
            id,
            plate: nested.and_then(|v| text_field(v, &["placa"])),
        })
    })
}

fn vehicle_from_object(vehicle: &Value) -> Option<VehicleRef> {
    int_field(vehicle, &["id_veiculo", "id"]).map(|id| VehicleRef {
        id,
        plate: text_field(vehicle, &["placa"]),
    })
}

/// First of `keys` holding a usable value
fn first<'a, T>(
    value: &'a Value,
    keys: &[&str],
    convert: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(convert)
}

fn int_field(value: &Value, keys: &[&str]) -> Option<i64> {
    first(value, keys, |v| match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn float_field(value: &Value, keys: &[&str]) -> Option<f64> {
    first(value, keys, |v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

fn months_field(value: &Value, keys: &[&str]) -> Option<i32> {
    int_field(value, keys).and_then(|m| i32::try_from(m).ok())
}

fn decimal_field(value: &Value, keys: &[&str]) -> Option<Decimal> {
    first(value, keys, |v| match v {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    })
}

fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    first(value, keys, |v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn timestamp_field(value: &Value, keys: &[&str]) -> Option<Timestamp> {
    first(value, keys, |v| v.as_str().and_then(parse_timestamp))
}
