use std::collections::HashMap;

use crate::date_utils::previous_month_key;
use crate::models::{FrequentMerchant, KeyMetrics, MonthComparison, MostExpensive, Receipt};

/// Headline metrics for the filtered set, or `None` when there is no data.
pub fn key_metrics(receipts: &[&Receipt]) -> Option<KeyMetrics> {
    let most_expensive = most_expensive(receipts)?;

    let total: f64 = receipts.iter().map(|r| r.amount()).sum();
    let average_spending = total / receipts.len() as f64;

    Some(KeyMetrics {
        average_spending,
        most_expensive,
        most_frequent_merchant: most_frequent_merchant(receipts),
        month_comparison: month_comparison(receipts),
    })
}

/// Only a strictly greater amount replaces the current maximum, so the first
/// receipt wins a tie.
fn most_expensive(receipts: &[&Receipt]) -> Option<MostExpensive> {
    let (&first, rest) = receipts.split_first()?;
    let mut top = first;
    let mut top_amount = first.amount();

    for &receipt in rest {
        let amount = receipt.amount();
        if amount > top_amount {
            top = receipt;
            top_amount = amount;
        }
    }

    Some(MostExpensive {
        amount: top_amount,
        merchant: top.merchant_name().to_string(),
        date: top.purchase_date.clone().unwrap_or_default(),
    })
}

fn most_frequent_merchant(receipts: &[&Receipt]) -> FrequentMerchant {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for receipt in receipts {
        let merchant = receipt.merchant_name();
        let slot = *index.entry(merchant).or_insert_with(|| {
            counts.push((merchant, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }

    // stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .first()
        .map(|(name, count)| FrequentMerchant {
            name: name.to_string(),
            count: *count,
        })
        .unwrap_or(FrequentMerchant {
            name: String::new(),
            count: 0,
        })
}

/// Latest month present in the set against the calendar month before it.
fn month_comparison(receipts: &[&Receipt]) -> MonthComparison {
    let mut by_month: HashMap<String, f64> = HashMap::new();
    for receipt in receipts {
        if let Some(month) = receipt.month() {
            *by_month.entry(month).or_insert(0.0) += receipt.amount();
        }
    }

    let Some(latest) = by_month.keys().max().cloned() else {
        return MonthComparison::default();
    };

    let current = by_month[&latest];
    let previous = previous_month_key(&latest)
        .and_then(|month| by_month.get(&month).copied())
        .unwrap_or(0.0);

    // A zero (or negative) baseline has no meaningful percentage; report 0.
    let change_percent = if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };

    MonthComparison {
        current,
        previous,
        change_percent,
    }
}
