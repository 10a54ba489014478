//! Warranty evaluation
//!
//! Turns purchase/warranty facts into remaining coverage. Every function here
//! takes `now` from the caller and never reads the system clock, so a whole
//! rendering pass (or a test) observes a single instant.

use std::collections::HashMap;

use chrono::{Duration, Months};

use crate::models::{
    cmp_expiry, EvaluatedItem, GroupKey, PurchasedItem, VehicleWarrantyGroup, WarrantyEvaluation,
    WarrantyPartition, WarrantyReport,
};
use crate::types::Timestamp;

/// Length of a month when the upstream record supplies remaining months
pub const DAYS_PER_MONTH: i64 = 30;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Evaluate the remaining coverage of `item` at `now`
///
/// In priority order: an upstream remaining-months hint (30-day months), then
/// purchase date plus calendar warranty months. Anything else is unknown.
pub fn evaluate(item: &PurchasedItem, now: Timestamp) -> WarrantyEvaluation {
    if let Some(hint) = item.remaining_months_hint.filter(|h| h.is_finite()) {
        let days = round_half_up(hint * DAYS_PER_MONTH as f64);
        return Duration::try_days(days)
            .and_then(|span| now.checked_add_signed(span))
            .map(|expiry| WarrantyEvaluation::from_days(days, expiry))
            .unwrap_or_else(WarrantyEvaluation::unknown);
    }

    let months = item.warranty_months.filter(|m| *m > 0);
    match (item.purchase_date, months) {
        (Some(purchased), Some(months)) => add_calendar_months(purchased, months.unsigned_abs())
            .map(|expiry| WarrantyEvaluation::from_days(ceil_days(expiry - now), expiry))
            .unwrap_or_else(WarrantyEvaluation::unknown),
        _ => WarrantyEvaluation::unknown(),
    }
}

/// Advance `date` by `months` calendar months
///
/// A day that does not exist in the target month is clamped to that month's
/// last day (Jan 31 + 1 month is Feb 29 in a leap year, Feb 28 otherwise).
/// The time of day is preserved. Returns `None` past the representable range.
pub fn add_calendar_months(date: Timestamp, months: u32) -> Option<Timestamp> {
    date.checked_add_months(Months::new(months))
}

/// Group items by vehicle, falling back to the owning service record and then
/// to a single unassigned bucket
///
/// Groups are ordered by their earliest expiry; groups without any dated item
/// go last. Ties keep first-seen order. Items inside a group keep input order;
/// [`warranty_report`] sorts them for rendering.
pub fn group_by_vehicle(items: &[PurchasedItem], now: Timestamp) -> Vec<VehicleWarrantyGroup> {
    let mut groups: Vec<VehicleWarrantyGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for item in items {
        let key = GroupKey::for_item(item);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(VehicleWarrantyGroup::new(key));
            groups.len() - 1
        });
        groups[slot].push(item.clone(), evaluate(item, now));
    }

    groups.sort_by(|a, b| cmp_expiry(a.earliest_expiry(), b.earliest_expiry()));
    groups
}

/// Split groups into those with valid coverage and those fully expired
///
/// A group with no valid item and at least one unknown item lands in neither
/// list.
pub fn partition_by_coverage(groups: Vec<VehicleWarrantyGroup>) -> WarrantyPartition {
    let mut partition = WarrantyPartition::default();
    for group in groups {
        if group.has_valid_coverage() {
            partition.valid.push(group);
        } else if group.is_fully_expired() {
            partition.expired.push(group);
        }
    }
    partition
}

/// Partition `items` for display, each group's items sorted by
/// [`VehicleWarrantyGroup::sort_items`]
pub fn render_partition(items: &[PurchasedItem], now: Timestamp) -> WarrantyPartition {
    let mut partition = partition_by_coverage(group_by_vehicle(items, now));
    for group in partition.valid.iter_mut().chain(partition.expired.iter_mut()) {
        group.sort_items();
    }
    partition
}

/// Evaluate, group and partition in one pass for the client warranty view
pub fn warranty_report(items: &[PurchasedItem], now: Timestamp) -> WarrantyReport {
    let evaluated = items
        .iter()
        .map(|item| EvaluatedItem {
            item: item.clone(),
            evaluation: evaluate(item, now),
        })
        .collect();
    let partition = render_partition(items, now);

    WarrantyReport {
        items: evaluated,
        valid: partition.valid,
        expired: partition.expired,
    }
}

/// Whole days in `span`, rounded towards positive infinity
fn ceil_days(span: Duration) -> i64 {
    let millis = span.num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoverageStatus, VehicleRef};
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn bought(date: Timestamp, months: i32) -> PurchasedItem {
        PurchasedItem {
            purchase_date: Some(date),
            warranty_months: Some(months),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_of_month_clamps_in_leap_year() {
        assert_eq!(add_calendar_months(at(2024, 1, 31), 1), Some(at(2024, 2, 29)));
    }

    #[test]
    fn test_end_of_month_clamps_in_common_year() {
        assert_eq!(add_calendar_months(at(2023, 1, 31), 1), Some(at(2023, 2, 28)));
    }

    #[test]
    fn test_add_months_crosses_year_and_keeps_time() {
        let purchased = Utc.with_ymd_and_hms(2023, 11, 30, 15, 45, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 2, 29, 15, 45, 0).unwrap();
        assert_eq!(add_calendar_months(purchased, 3), Some(expected));
    }

    #[test]
    fn test_leap_year_purchase_within_coverage() {
        let evaluation = evaluate(&bought(at(2024, 1, 31), 1), at(2024, 2, 1));
        assert_eq!(evaluation.expiry, Some(at(2024, 2, 29)));
        assert_eq!(evaluation.days_remaining, Some(28));
        assert_eq!(evaluation.months_remaining, Some(0));
        assert!(!evaluation.is_expired);
        assert!(!evaluation.is_unknown);
    }

    #[test]
    fn test_common_year_purchase_expired() {
        let evaluation = evaluate(&bought(at(2023, 1, 31), 1), at(2023, 3, 1));
        assert_eq!(evaluation.expiry, Some(at(2023, 2, 28)));
        assert_eq!(evaluation.days_remaining, Some(-1));
        assert!(evaluation.is_expired);
        assert_eq!(evaluation.status(), CoverageStatus::Expired);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap();
        let evaluation = evaluate(&bought(at(2024, 1, 31), 1), now);
        assert_eq!(evaluation.days_remaining, Some(1));
    }

    #[test]
    fn test_expiring_right_now_is_expired() {
        let evaluation = evaluate(&bought(at(2024, 1, 31), 1), at(2024, 2, 29));
        assert_eq!(evaluation.days_remaining, Some(0));
        assert!(evaluation.is_expired);
    }

    #[test]
    fn test_hint_takes_priority() {
        let item = PurchasedItem {
            remaining_months_hint: Some(2.0),
            ..bought(at(2020, 1, 1), 12)
        };
        let now = at(2024, 6, 15);
        let evaluation = evaluate(&item, now);
        assert_eq!(evaluation.days_remaining, Some(60));
        assert_eq!(evaluation.months_remaining, Some(2));
        assert_eq!(evaluation.expiry, Some(at(2024, 8, 14)));
    }

    #[test]
    fn test_fractional_hint_rounds_half_up() {
        let item = PurchasedItem {
            remaining_months_hint: Some(0.05),
            ..Default::default()
        };
        assert_eq!(evaluate(&item, at(2024, 1, 1)).days_remaining, Some(2));
    }

    #[test]
    fn test_non_finite_hint_falls_through() {
        let item = PurchasedItem {
            remaining_months_hint: Some(f64::NAN),
            ..Default::default()
        };
        assert!(evaluate(&item, at(2024, 1, 1)).is_unknown);
    }

    #[test]
    fn test_missing_data_is_unknown_not_expired() {
        let now = at(2024, 1, 1);
        for item in [
            PurchasedItem::default(),
            bought(at(2023, 1, 1), 0),
            bought(at(2023, 1, 1), -3),
            PurchasedItem {
                warranty_months: Some(12),
                ..Default::default()
            },
        ] {
            let evaluation = evaluate(&item, now);
            assert!(evaluation.is_unknown);
            assert!(!evaluation.is_expired);
            assert_eq!(evaluation.months_remaining, None);
            assert_eq!(evaluation.expiry, None);
        }
    }

    #[test]
    fn test_grouping_splits_vehicles_and_orders_by_expiry() {
        let now = at(2024, 1, 1);
        let car = |id, plate: &str| {
            Some(VehicleRef {
                id,
                plate: Some(plate.to_string()),
            })
        };
        let items = vec![
            PurchasedItem {
                vehicle: car(1, "AAA1111"),
                ..bought(at(2023, 6, 1), 24)
            },
            PurchasedItem {
                vehicle: car(2, "BBB2222"),
                ..bought(at(2023, 6, 1), 12)
            },
            PurchasedItem {
                service_record_id: Some(1),
                ..Default::default()
            },
        ];

        let groups = group_by_vehicle(&items, now);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, GroupKey::Vehicle(2));
        assert_eq!(groups[0].plate.as_deref(), Some("BBB2222"));
        assert_eq!(groups[1].key, GroupKey::Vehicle(1));
        assert_eq!(groups[2].key, GroupKey::ServiceRecord(1));
    }

    #[test]
    fn test_partition_excludes_unknown_groups() {
        let now = at(2024, 1, 1);
        let items = vec![
            PurchasedItem {
                service_record_id: Some(10),
                ..bought(at(2023, 12, 1), 12)
            },
            PurchasedItem {
                service_record_id: Some(11),
                ..bought(at(2020, 1, 1), 12)
            },
            PurchasedItem {
                service_record_id: Some(12),
                ..Default::default()
            },
            PurchasedItem {
                service_record_id: Some(13),
                ..bought(at(2020, 1, 1), 12)
            },
            PurchasedItem {
                service_record_id: Some(13),
                ..Default::default()
            },
        ];

        let partition = partition_by_coverage(group_by_vehicle(&items, now));
        let valid: Vec<_> = partition.valid.iter().map(|g| g.key.clone()).collect();
        let expired: Vec<_> = partition.expired.iter().map(|g| g.key.clone()).collect();
        assert_eq!(valid, vec![GroupKey::ServiceRecord(10)]);
        assert_eq!(expired, vec![GroupKey::ServiceRecord(11)]);
    }

    #[test]
    fn test_report_keeps_input_order() {
        let now = at(2024, 1, 1);
        let items = vec![bought(at(2023, 12, 1), 24), bought(at(2023, 12, 1), 1)];
        let report = warranty_report(&items, now);
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].item.warranty_months, Some(24));
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.valid[0].key, GroupKey::Unassigned);
        let months: Vec<_> = report.valid[0]
            .items
            .iter()
            .map(|entry| entry.item.warranty_months)
            .collect();
        assert_eq!(months, vec![Some(1), Some(24)]);
    }
}
