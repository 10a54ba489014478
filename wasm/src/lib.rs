//! WebAssembly module for the Battery Service Console
//!
//! Provides client-side computation for:
//! - Warranty evaluation, grouping and CSV export
//! - Normalisation of upstream service records
//! - Client, vehicle and battery form validation
//!
//! Instants cross the boundary as milliseconds since the Unix epoch. Call
//! [`current_time_ms`] once per render and pass the value to every function
//! so the whole page agrees on "now".

use serde::Serialize;
use shared::normalize::items_from_service_record;
use shared::{
    evaluate, export_csv, export_file_name, render_partition, timestamp_from_millis, validation,
    BatteryForm, ClientForm, EntityId, FieldErrors, PurchasedItem, Timestamp, VehicleForm,
};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("Battery Service Console WASM loaded"));
}

/// Milliseconds since the Unix epoch, from the browser clock
#[wasm_bindgen]
pub fn current_time_ms() -> f64 {
    js_sys::Date::now()
}

/// Evaluate a single purchased item
#[wasm_bindgen]
pub fn evaluate_warranty(item_json: &str, now_ms: f64) -> Result<String, JsValue> {
    evaluate_json(item_json, now_ms).map_err(to_js)
}

/// Group items by vehicle and split them into valid and expired groups,
/// items in each group soonest expiry first
#[wasm_bindgen]
pub fn group_warranties(items_json: &str, now_ms: f64) -> Result<String, JsValue> {
    group_json(items_json, now_ms).map_err(to_js)
}

/// CSV export of the items, one row each, in input order
#[wasm_bindgen]
pub fn export_warranties_csv(items_json: &str, now_ms: f64) -> Result<String, JsValue> {
    export_json(items_json, now_ms).map_err(to_js)
}

/// Download name of a client's warranty export
#[wasm_bindgen]
pub fn warranty_export_file_name(client_id: f64) -> String {
    export_file_name(client_id as EntityId)
}

/// Purchased items of an upstream service record (`GET /atendimentos/:id`)
#[wasm_bindgen]
pub fn service_record_items(record_json: &str) -> Result<String, JsValue> {
    service_record_items_json(record_json).map_err(to_js)
}

/// Field → message map of the client form; `{}` when valid
#[wasm_bindgen]
pub fn validate_client_form(form_json: &str) -> Result<String, JsValue> {
    form_errors_json(form_json, |form: &ClientForm| {
        validation::validate_client_form(form)
    })
    .map_err(to_js)
}

/// Field → message map of the vehicle form; `{}` when valid
#[wasm_bindgen]
pub fn validate_vehicle_form(form_json: &str, current_year: i32) -> Result<String, JsValue> {
    form_errors_json(form_json, |form: &VehicleForm| {
        validation::validate_vehicle_form(form, current_year)
    })
    .map_err(to_js)
}

/// Field → message map of the battery form; `{}` when valid
#[wasm_bindgen]
pub fn validate_battery_form(form_json: &str) -> Result<String, JsValue> {
    form_errors_json(form_json, |form: &BatteryForm| {
        validation::validate_battery_form(form)
    })
    .map_err(to_js)
}

#[derive(Serialize)]
struct GroupedWarranties {
    valid: Vec<shared::VehicleWarrantyGroup>,
    expired: Vec<shared::VehicleWarrantyGroup>,
}

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn instant(now_ms: f64) -> Result<Timestamp, String> {
    if !now_ms.is_finite() {
        return Err(format!("Invalid timestamp: {}", now_ms));
    }
    timestamp_from_millis(now_ms as i64).ok_or_else(|| format!("Invalid timestamp: {}", now_ms))
}

fn parse_items(items_json: &str) -> Result<Vec<PurchasedItem>, String> {
    serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))
}

fn evaluate_json(item_json: &str, now_ms: f64) -> Result<String, String> {
    let item: PurchasedItem =
        serde_json::from_str(item_json).map_err(|e| format!("Invalid item JSON: {}", e))?;
    let evaluation = evaluate(&item, instant(now_ms)?);
    serde_json::to_string(&evaluation).map_err(|e| e.to_string())
}

fn group_json(items_json: &str, now_ms: f64) -> Result<String, String> {
    let items = parse_items(items_json)?;
    let partition = render_partition(&items, instant(now_ms)?);
    serde_json::to_string(&GroupedWarranties {
        valid: partition.valid,
        expired: partition.expired,
    })
    .map_err(|e| e.to_string())
}

fn export_json(items_json: &str, now_ms: f64) -> Result<String, String> {
    let items = parse_items(items_json)?;
    export_csv(&items, instant(now_ms)?).map_err(|e| e.to_string())
}

fn service_record_items_json(record_json: &str) -> Result<String, String> {
    let record: serde_json::Value =
        serde_json::from_str(record_json).map_err(|e| format!("Invalid record JSON: {}", e))?;
    serde_json::to_string(&items_from_service_record(&record)).map_err(|e| e.to_string())
}

fn form_errors_json<F, V>(form_json: &str, validate: V) -> Result<String, String>
where
    F: serde::de::DeserializeOwned,
    V: FnOnce(&F) -> Result<(), FieldErrors>,
{
    let form: F =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid form JSON: {}", e))?;
    let errors = validate(&form).err().unwrap_or_default();
    serde_json::to_string(&errors).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-02-01T00:00:00Z
    const FEB_1_2024: f64 = 1_706_745_600_000.0;

    #[test]
    fn test_evaluate_leap_year_purchase() {
        let item = r#"{"purchase_date": "2024-01-31T00:00:00Z", "warranty_months": 1}"#;
        let json: serde_json::Value =
            serde_json::from_str(&evaluate_json(item, FEB_1_2024).unwrap()).unwrap();
        assert_eq!(json["days_remaining"], 28);
        assert_eq!(json["months_remaining"], 0);
        assert_eq!(json["is_expired"], false);
    }

    #[test]
    fn test_evaluate_rejects_bad_input() {
        assert!(evaluate_json("not json", FEB_1_2024).is_err());
        assert!(evaluate_json("{}", f64::NAN).is_err());
    }

    #[test]
    fn test_group_splits_valid_and_expired() {
        let items = r#"[
            {"purchase_date": "2024-01-31T00:00:00Z", "warranty_months": 1, "vehicle": {"id": 1, "plate": "ABC1D23"}},
            {"purchase_date": "2020-01-01T00:00:00Z", "warranty_months": 12, "vehicle": {"id": 2, "plate": null}},
            {}
        ]"#;
        let json: serde_json::Value =
            serde_json::from_str(&group_json(items, FEB_1_2024).unwrap()).unwrap();
        assert_eq!(json["valid"].as_array().unwrap().len(), 1);
        assert_eq!(json["expired"].as_array().unwrap().len(), 1);
        assert_eq!(json["valid"][0]["plate"], "ABC1D23");
    }

    #[test]
    fn test_group_items_soonest_expiry_first() {
        let items = r#"[
            {"remaining_months_hint": 13.333333333333334, "vehicle": {"id": 1}},
            {"vehicle": {"id": 1}, "purchase_date": "2024-01-01T00:00:00Z", "warranty_months": 12},
            {"vehicle": {"id": 1}},
            {"remaining_months_hint": 0.16666666666666666, "vehicle": {"id": 1}}
        ]"#;
        let json: serde_json::Value =
            serde_json::from_str(&group_json(items, FEB_1_2024).unwrap()).unwrap();
        let days: Vec<_> = json["valid"][0]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["evaluation"]["days_remaining"].as_i64())
            .collect();
        assert_eq!(days, vec![Some(5), Some(335), Some(400), None]);
    }

    #[test]
    fn test_export_header_only() {
        let csv = export_json("[]", FEB_1_2024).unwrap();
        assert!(csv.starts_with("veiculo_id,placa,"));
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(warranty_export_file_name(42.0), "garantias_cliente_42.csv");
    }

    #[test]
    fn test_service_record_items() {
        let record = r#"{"id": 5, "itens": [{"id_item": 1, "garantia_meses": 12}]}"#;
        let json: serde_json::Value =
            serde_json::from_str(&service_record_items_json(record).unwrap()).unwrap();
        assert_eq!(json[0]["warranty_months"], 12);
        assert_eq!(json[0]["service_record_id"], 5);
    }

    #[test]
    fn test_form_validation_json() {
        let valid = form_errors_json(r#"{"nome": "Maria Souza"}"#, |f: &ClientForm| {
            validation::validate_client_form(f)
        })
        .unwrap();
        assert_eq!(valid, "{}");

        let invalid = form_errors_json(
            r#"{"placa": "AB", "modelo": "Gol", "ano": 2030}"#,
            |f: &VehicleForm| validation::validate_vehicle_form(f, 2024),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&invalid).unwrap();
        assert_eq!(json["ano"], "Ano inválido");
        assert!(json["placa"].is_string());
    }
}
