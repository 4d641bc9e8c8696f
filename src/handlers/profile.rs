use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;

use super::credential;
use crate::error::{AppError, AppResult};
use crate::models::Profile;
use crate::state::AppState;

/// Current profile. With an upstream source the server copy is fetched and
/// remembered locally.
pub async fn show(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<Profile>> {
    if let Some(client) = state.source.client() {
        let profile = client.profile(credential(&headers).as_ref()).await?;
        state.set_profile(profile.clone())?;
        return Ok(Json(profile));
    }

    Ok(Json(state.profile()?))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(profile): Json<Profile>,
) -> AppResult<Json<Profile>> {
    if !profile.monthly_budget.is_finite() || profile.monthly_budget < 0.0 {
        return Err(AppError::Validation(
            "Monthly budget must be zero or a positive number".into(),
        ));
    }

    if let Some(client) = state.source.client() {
        client
            .update_profile(&profile, credential(&headers).as_ref())
            .await?;
    }

    tracing::info!(budget = profile.monthly_budget, "Profile updated");
    state.set_profile(profile.clone())?;
    Ok(Json(profile))
}
