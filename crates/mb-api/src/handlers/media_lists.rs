//! Per-user media list endpoints.

use axum::{extract::State, Json};
use mb_core::{MediaListEntry, UpsertOutcome, UserListItem};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::{
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default, deserialize_with = "lenient::media_id")]
    pub media_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub added: bool,
}

pub async fn toggle(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let added = state
        .media_lists
        .toggle_membership(&req.uid, req.media_id.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(ToggleResponse { added }))
}

/// Query strings carry every value as text, so media_id needs no coercion here.
#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub media_id: String,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<MediaListEntry>,
}

pub async fn get_entry(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EntryQuery>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = state
        .media_lists
        .get_entry(&query.uid, &query.media_id)
        .await?;
    Ok(Json(EntryResponse {
        exists: entry.is_some(),
        entry,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default, deserialize_with = "lenient::media_id")]
    pub media_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::score")]
    pub score: Option<f64>,
    pub favourited: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
}

impl From<UpsertOutcome> for UpdateResponse {
    fn from(outcome: UpsertOutcome) -> Self {
        let created = outcome == UpsertOutcome::Created;
        Self {
            success: true,
            created: created.then_some(true),
            updated: (!created).then_some(true),
        }
    }
}

pub async fn update_entry(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UpdateRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let outcome = state
        .media_lists
        .update_entry(
            &req.uid,
            req.media_id.as_deref().unwrap_or_default(),
            req.score,
            req.favourited,
        )
        .await?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub uid: String,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    #[serde(rename = "mediaList")]
    pub media_list: Vec<UserListItem>,
}

pub async fn user_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let media_list = state.media_lists.get_user_list(&query.uid).await?;
    Ok(Json(UserListResponse { media_list }))
}
