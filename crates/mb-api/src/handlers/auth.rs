//! Account registration.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extract::ApiJson, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct Registered {
    pub uid: String,
    pub message: &'static str,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Registered>), ApiError> {
    let profile = state
        .profiles
        .register(req.email.trim(), &req.password, req.username.trim())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Registered {
            uid: profile.uid,
            message: "User created and profile saved.",
        }),
    ))
}
