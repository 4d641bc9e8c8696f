pub mod dashboard;
pub mod profile;
pub mod receipt;
pub mod report;

pub use dashboard::{DashboardOutcome, DashboardReport, MetricsOrigin};
pub use profile::{AuthSession, Credentials, Profile, Registration};
pub use receipt::{Receipt, DEFAULT_CATEGORY, UNKNOWN_MERCHANT};
pub use report::{
    BudgetStatus, BudgetStatusLabel, BudgetTracking, CategoryBudgetShare, ForecastResult,
    FrequentMerchant, KeyMetrics, MerchantRankEntry, MonthComparison, MonthlyTrendEntry,
    MostExpensive, Summary, WeekdayWeekendSplit, RESERVED_TREND_KEYS,
    trend_key,
};
