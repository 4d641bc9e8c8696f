//! Budget utilization against the configured monthly budget.
//!
//! Two numeric tracks are kept apart: the unclamped ratio decides the status
//! label, the clamped percentage only sizes progress bars.

use crate::models::{
    BudgetStatus, BudgetStatusLabel, BudgetTracking, CategoryBudgetShare, Summary,
};

fn configured_budget(summary: &Summary) -> Option<f64> {
    summary
        .budget
        .filter(|budget| budget.is_finite() && *budget > 0.0)
}

pub fn track(summary: &Summary) -> BudgetTracking {
    let Some(budget) = configured_budget(summary) else {
        return BudgetTracking::Disabled;
    };

    let used = summary.budget_used.unwrap_or(summary.total_amount);
    let ratio_percentage = used * 100.0 / budget;

    BudgetTracking::Active(BudgetStatus {
        used,
        budget,
        remaining: (budget - used).max(0.0),
        overage: (used - budget).max(0.0),
        used_percentage: ratio_percentage.clamp(0.0, 100.0),
        ratio_percentage,
        status: BudgetStatusLabel::from_ratio(ratio_percentage),
    })
}

/// Each category's spend as a share of the whole budget. Empty when tracking
/// is disabled.
pub fn category_shares(summary: &Summary) -> Vec<CategoryBudgetShare> {
    let Some(budget) = configured_budget(summary) else {
        return Vec::new();
    };

    summary
        .by_category
        .iter()
        .map(|(category, amount)| {
            let percentage = amount * 100.0 / budget;
            CategoryBudgetShare {
                category: category.clone(),
                amount: *amount,
                percentage,
                bar_width: percentage.clamp(0.0, 100.0),
            }
        })
        .collect()
}
