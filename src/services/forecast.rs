use chrono::{Datelike, Weekday};

use crate::models::{ForecastResult, MonthlyTrendEntry, Receipt, WeekdayWeekendSplit};

/// Number of trailing months averaged into the forecast.
pub const FORECAST_WINDOW: usize = 3;

/// Naive moving-average forecast plus the weekday/weekend split.
///
/// `trends` must be in chronological order, as produced by
/// [`monthly_trends`](crate::services::analytics::monthly_trends).
pub fn forecast(trends: &[MonthlyTrendEntry], receipts: &[&Receipt]) -> ForecastResult {
    let totals: Vec<f64> = trends.iter().map(|entry| entry.total_amount).collect();
    let (next_period_forecast, based_on_months) = moving_average(&totals);

    ForecastResult {
        next_period_forecast,
        based_on_months,
        weekday_vs_weekend: weekday_vs_weekend(receipts),
    }
}

fn moving_average(monthly_totals: &[f64]) -> (f64, usize) {
    let months = monthly_totals.len().min(FORECAST_WINDOW);
    if months == 0 {
        return (0.0, 0);
    }

    let window = &monthly_totals[monthly_totals.len() - months..];
    (window.iter().sum::<f64>() / months as f64, months)
}

pub fn weekday_vs_weekend(receipts: &[&Receipt]) -> WeekdayWeekendSplit {
    let mut weekday = (0.0, 0usize);
    let mut weekend = (0.0, 0usize);

    for receipt in receipts {
        let Some(day) = receipt.purchase_day() else {
            continue;
        };
        let bucket = match day.weekday() {
            Weekday::Sat | Weekday::Sun => &mut weekend,
            _ => &mut weekday,
        };
        bucket.0 += receipt.amount();
        bucket.1 += 1;
    }

    let mean = |(total, count): (f64, usize)| {
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    };

    WeekdayWeekendSplit {
        weekday_total: weekday.0,
        weekday_avg: mean(weekday),
        weekend_total: weekend.0,
        weekend_avg: mean(weekend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(key: &str, total: f64) -> MonthlyTrendEntry {
        MonthlyTrendEntry {
            month: key.into(),
            total_amount: total,
            receipt_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_months() {
        let result = forecast(&[], &[]);
        assert_eq!(result.next_period_forecast, 0.0);
        assert_eq!(result.based_on_months, 0);
    }

    #[test]
    fn test_fewer_than_three_months() {
        let trends = vec![month("2024-01", 100.0), month("2024-02", 50.0)];
        let result = forecast(&trends, &[]);
        assert_eq!(result.based_on_months, 2);
        assert_eq!(result.next_period_forecast, 75.0);
    }

    #[test]
    fn test_uses_last_three_months() {
        let trends = vec![
            month("2023-10", 1000.0),
            month("2023-11", 30.0),
            month("2023-12", 60.0),
            month("2024-01", 90.0),
        ];
        let result = forecast(&trends, &[]);
        assert_eq!(result.based_on_months, 3);
        assert_eq!(result.next_period_forecast, 60.0);
    }

    #[test]
    fn test_weekday_vs_weekend() {
        let receipts = vec![
            // Friday, Saturday, Sunday, Monday
            Receipt::new("1", "A", "2024-03-08", "10", "grocery"),
            Receipt::new("2", "A", "2024-03-09", "30", "grocery"),
            Receipt::new("3", "A", "10.03.2024", "50", "grocery"),
            Receipt::new("4", "A", "2024-03-11", "20", "grocery"),
            Receipt::new("5", "A", "undated", "99", "grocery"),
        ];
        let refs: Vec<&Receipt> = receipts.iter().collect();
        let split = weekday_vs_weekend(&refs);

        assert_eq!(split.weekday_total, 30.0);
        assert_eq!(split.weekday_avg, 15.0);
        assert_eq!(split.weekend_total, 80.0);
        assert_eq!(split.weekend_avg, 40.0);
    }

    #[test]
    fn test_empty_bucket_average_is_zero() {
        let receipt = Receipt::new("1", "A", "2024-03-09", "12", "grocery");
        let split = weekday_vs_weekend(&[&receipt]);
        assert_eq!(split.weekday_total, 0.0);
        assert_eq!(split.weekday_avg, 0.0);
        assert_eq!(split.weekend_avg, 12.0);
    }
}
