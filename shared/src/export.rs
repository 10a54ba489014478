//! CSV export of a client's warranty items

use chrono::SecondsFormat;

use crate::error::WarrantyError;
use crate::models::{PurchasedItem, WarrantyEvaluation};
use crate::types::{EntityId, Timestamp};
use crate::warranty::evaluate;

/// Column names of the export, in order
pub const WARRANTY_CSV_HEADER: [&str; 10] = [
    "veiculo_id",
    "placa",
    "atendimento_id",
    "id_item",
    "id_bateria",
    "modelo",
    "codigo",
    "daysRemaining",
    "monthsRemaining",
    "expiryDate",
];

/// Export one row per item, in the order given
///
/// The header is written bare; every value is quoted with embedded quotes
/// doubled. Rows are joined with `\n` and the text has no trailing newline.
pub fn export_csv(items: &[PurchasedItem], now: Timestamp) -> Result<String, WarrantyError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    for item in items {
        writer.write_record(csv_row(item, &evaluate(item, now)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| WarrantyError::Writer(e.to_string()))?;
    let body = String::from_utf8(bytes)?;

    let mut out = WARRANTY_CSV_HEADER.join(",");
    let body = body.strip_suffix('\n').unwrap_or(&body);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    Ok(out)
}

/// Download name offered by the client details page
pub fn export_file_name(client_id: EntityId) -> String {
    format!("garantias_cliente_{}.csv", client_id)
}

fn csv_row(item: &PurchasedItem, evaluation: &WarrantyEvaluation) -> [String; 10] {
    [
        opt(item.vehicle.as_ref().map(|v| v.id)),
        item.vehicle
            .as_ref()
            .and_then(|v| v.plate.clone())
            .unwrap_or_default(),
        opt(item.service_record_id),
        opt(item.item_id),
        opt(item.battery_id),
        item.battery_model.clone().unwrap_or_default(),
        item.battery_code.clone().unwrap_or_default(),
        opt(evaluation.days_remaining),
        opt(evaluation.months_remaining),
        evaluation
            .expiry
            .map(|e| e.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default(),
    ]
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleRef;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_export_is_header_only() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let csv = export_csv(&[], now).unwrap();
        assert_eq!(
            csv,
            "veiculo_id,placa,atendimento_id,id_item,id_bateria,modelo,codigo,daysRemaining,monthsRemaining,expiryDate"
        );
    }

    #[test]
    fn test_row_layout() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let item = PurchasedItem {
            item_id: Some(31),
            battery_id: Some(4),
            battery_code: Some("M60GD".to_string()),
            battery_model: Some("Moura 60Ah \"Premium\"".to_string()),
            purchase_date: Some(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()),
            warranty_months: Some(1),
            remaining_months_hint: None,
            vehicle: Some(VehicleRef {
                id: 9,
                plate: Some("RIO2A19".to_string()),
            }),
            service_record_id: Some(120),
        };

        let csv = export_csv(&[item], now).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            r#""9","RIO2A19","120","31","4","Moura 60Ah ""Premium""","M60GD","28","0","2024-02-29T00:00:00.000Z""#
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_unknown_item_has_empty_cells() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let csv = export_csv(&[PurchasedItem::default()], now).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            r#""","","","","","","","","","""#
        );
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(42), "garantias_cliente_42.csv");
    }
}
