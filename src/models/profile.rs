use serde::{Deserialize, Serialize};

use super::report::lenient_amount;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_budget: f64,
}

impl Profile {
    /// The budget to track against, if one is configured.
    pub fn budget(&self) -> Option<f64> {
        (self.monthly_budget.is_finite() && self.monthly_budget > 0.0)
            .then_some(self.monthly_budget)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Bearer credential issued by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(alias = "token", alias = "IdToken")]
    pub id_token: String,
}
