use std::collections::HashMap;

use crate::models::{MerchantRankEntry, Receipt};

pub const TOP_MERCHANT_LIMIT: usize = 5;

/// Merchants ranked by total spend, highest first.
///
/// Merchants with equal totals keep the order in which they first appear in
/// `receipts`; this relies on `sort_by` being a stable sort.
pub fn top_merchants(receipts: &[&Receipt], limit: usize) -> Vec<MerchantRankEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranking: Vec<MerchantRankEntry> = Vec::new();

    for receipt in receipts {
        let merchant = receipt.merchant_name();
        let slot = *index.entry(merchant).or_insert_with(|| {
            ranking.push(MerchantRankEntry {
                merchant: merchant.to_string(),
                total_amount: 0.0,
            });
            ranking.len() - 1
        });
        ranking[slot].total_amount += receipt.amount();
    }

    ranking.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    ranking.truncate(limit);
    ranking
}
