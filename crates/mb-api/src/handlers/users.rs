//! User profile lookup and bio updates.

use axum::{
    extract::{Path, State},
    Json,
};
use mb_core::UserProfile;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::ApiError, extract::ApiJson, AppState};

pub async fn get_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.profiles.get(&uid).await?))
}

/// `bio` stays untyped so a non-string value is reported with a clear message.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub bio: Value,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let Value::String(bio) = req.bio else {
        return Err(ApiError::bad_request("Invalid bio format."));
    };
    Ok(Json(state.profiles.update_bio(&uid, &bio).await?))
}
