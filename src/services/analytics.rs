use std::collections::{BTreeMap, HashSet};

use crate::date_utils::ResolvedFilter;
use crate::models::{trend_key, MonthlyTrendEntry, Receipt, Summary, RESERVED_TREND_KEYS};

/// Receipts that pass the resolved filter, in input order.
pub fn filter_receipts<'a>(receipts: &'a [Receipt], filter: &ResolvedFilter) -> Vec<&'a Receipt> {
    receipts.iter().filter(|r| filter.matches(r)).collect()
}

pub fn summarize(receipts: &[&Receipt]) -> Summary {
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    let mut total_amount = 0.0;

    for receipt in receipts {
        let amount = receipt.amount();
        total_amount += amount;
        *by_category
            .entry(receipt.category_name().to_string())
            .or_insert(0.0) += amount;
    }

    Summary {
        total_amount,
        total_receipts: receipts.len(),
        by_category,
        budget: None,
        budget_used: None,
    }
}

/// Per-month totals in chronological order.
///
/// Receipts without a readable purchase date have no month and are left out.
pub fn monthly_trends(receipts: &[&Receipt]) -> Vec<MonthlyTrendEntry> {
    let mut months: BTreeMap<String, MonthlyTrendEntry> = BTreeMap::new();

    for receipt in receipts {
        let Some(month) = receipt.month() else {
            continue;
        };
        let amount = receipt.amount();

        let entry = months
            .entry(month.clone())
            .or_insert_with(|| MonthlyTrendEntry {
                month,
                ..Default::default()
            });
        entry.total_amount += amount;
        entry.receipt_count += 1;
        *entry
            .category_amounts
            .entry(trend_key(receipt.category_name()))
            .or_insert(0.0) += amount;
    }

    // "YYYY-MM" keys sort chronologically
    months.into_values().collect()
}

/// Union of the category keys across all months, in first-seen order.
///
/// The result holds trend keys as produced by [`trend_key`], ready to index the
/// flattened entries.
pub fn category_universe(entries: &[MonthlyTrendEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for entry in entries {
        for category in entry.category_amounts.keys() {
            if RESERVED_TREND_KEYS.contains(&category.as_str()) {
                continue;
            }
            if seen.insert(category.as_str()) {
                categories.push(category.clone());
            }
        }
    }

    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn sample() -> Vec<Receipt> {
        vec![
            Receipt::new("1", "Rewe", "2024-01-05", "10,00", "grocery"),
            Receipt::new("2", "Trattoria", "2024-01-10", "20.00", "restaurant"),
            Receipt::new("3", "Rewe", "2024-02-01", "5", "grocery"),
        ]
    }

    #[test]
    fn test_summary_totals_and_categories() {
        let receipts = sample();
        let all = filter_receipts(&receipts, &ResolvedFilter::default());
        let summary = summarize(&all);

        assert_eq!(summary.total_receipts, 3);
        assert!((summary.total_amount - 35.0).abs() < EPSILON);
        assert_eq!(summary.by_category.len(), 2);
        assert!((summary.by_category["grocery"] - 15.0).abs() < EPSILON);
        assert!((summary.by_category["restaurant"] - 20.0).abs() < EPSILON);
        assert_eq!(summary.budget, None);
    }

    #[test]
    fn test_monthly_trends_are_sparse_and_ordered() {
        let receipts = sample();
        let all = filter_receipts(&receipts, &ResolvedFilter::default());
        let trends = monthly_trends(&all);

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].month, "2024-01");
        assert!((trends[0].total_amount - 30.0).abs() < EPSILON);
        assert_eq!(trends[0].receipt_count, 2);
        assert!((trends[0].category_amount("grocery") - 10.0).abs() < EPSILON);
        assert!((trends[0].category_amount("restaurant") - 20.0).abs() < EPSILON);

        assert_eq!(trends[1].month, "2024-02");
        assert!((trends[1].total_amount - 5.0).abs() < EPSILON);
        assert!(!trends[1].category_amounts.contains_key("restaurant"));
        assert_eq!(trends[1].category_amount("restaurant"), 0.0);

        assert_eq!(category_universe(&trends), vec!["grocery", "restaurant"]);
    }

    #[test]
    fn test_missing_category_defaults_to_other() {
        let mut receipt = Receipt::new("1", "Kiosk", "2024-03-01", "2,50", "");
        let summary = summarize(&[&receipt]);
        assert!((summary.by_category["other"] - 2.5).abs() < EPSILON);

        receipt.category = None;
        let trends = monthly_trends(&[&receipt]);
        assert!((trends[0].category_amount("other") - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_unparsable_amounts_count_as_zero() {
        let receipts = vec![
            Receipt::new("1", "A", "2024-01-01", "garbage", "grocery"),
            Receipt::new("2", "B", "2024-01-02", "3,00", "grocery"),
        ];
        let refs: Vec<&Receipt> = receipts.iter().collect();
        let summary = summarize(&refs);
        assert_eq!(summary.total_receipts, 2);
        assert!((summary.total_amount - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_undated_receipts_skip_monthly_buckets() {
        let receipts = vec![
            Receipt::new("1", "A", "", "4", "grocery"),
            Receipt::new("2", "B", "15.01.2024", "6", "grocery"),
        ];
        let refs: Vec<&Receipt> = receipts.iter().collect();
        assert_eq!(summarize(&refs).total_receipts, 2);

        let trends = monthly_trends(&refs);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].month, "2024-01");
        assert_eq!(trends[0].receipt_count, 1);
    }

    #[test]
    fn test_category_sums_match_totals() {
        let receipts: Vec<Receipt> = (0..40)
            .map(|i| {
                Receipt::new(
                    i.to_string(),
                    "Shop",
                    &format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                    &format!("{},{:02}", i * 3, i * 7 % 100),
                    ["grocery", "restaurant", "clothing", ""][i % 4],
                )
            })
            .collect();
        let refs: Vec<&Receipt> = receipts.iter().collect();

        let summary = summarize(&refs);
        let category_sum: f64 = summary.by_category.values().sum();
        assert!((category_sum - summary.total_amount).abs() < EPSILON);

        let trends = monthly_trends(&refs);
        for pair in trends.windows(2) {
            assert!(pair[0].month < pair[1].month);
        }
        for entry in &trends {
            let sum: f64 = entry.category_amounts.values().sum();
            assert!((sum - entry.total_amount).abs() < EPSILON);
        }
    }

    #[test]
    fn test_universe_ignores_reserved_keys() {
        let mut entry = MonthlyTrendEntry {
            month: "2024-01".into(),
            total_amount: 1.0,
            receipt_count: 1,
            ..Default::default()
        };
        entry.category_amounts.insert("grocery".into(), 1.0);
        entry.category_amounts.insert("receipt_count".into(), 0.0);
        assert_eq!(category_universe(&[entry]), vec!["grocery"]);
    }

    #[test]
    fn test_reserved_category_names_stay_distinct() {
        let receipts = vec![
            Receipt::new("1", "A", "2024-01-03", "10", "total_amount"),
            Receipt::new("2", "B", "2024-01-04", "5", "grocery"),
            Receipt::new("3", "C", "2024-01-05", "2", "~total_amount"),
            Receipt::new("4", "D", "2024-01-06", "1", "month"),
        ];
        let refs: Vec<&Receipt> = receipts.iter().collect();
        let trends = monthly_trends(&refs);
        let entry = &trends[0];

        assert_eq!(entry.total_amount, 18.0);
        assert_eq!(entry.category_amount("total_amount"), 10.0);
        assert_eq!(entry.category_amount("~total_amount"), 2.0);
        assert_eq!(entry.category_amount("month"), 1.0);
        assert_eq!(entry.category_amount("grocery"), 5.0);

        let universe = category_universe(&trends);
        assert_eq!(universe.len(), 4);
        let stacked: f64 = universe.iter().map(|key| entry.category_amounts[key]).sum();
        assert!((stacked - entry.total_amount).abs() < EPSILON);

        let wire = serde_json::to_value(entry).unwrap();
        assert_eq!(wire["total_amount"], 18.0);
        assert_eq!(wire["month"], "2024-01");
        assert_eq!(wire["~total_amount"], 10.0);
        assert_eq!(wire["~~total_amount"], 2.0);

        let text = serde_json::to_string(entry).unwrap();
        let decoded: MonthlyTrendEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(&decoded, entry);
    }
}
