pub mod amount;
pub mod analytics;
pub mod api_client;
pub mod budget;
pub mod dashboard;
pub mod forecast;
pub mod loader;
pub mod merchants;
pub mod metrics;
