//! Forum creation and listing.

use axum::{extract::State, Json};
use mb_core::Forum;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extract::ApiJson, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateForumRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ForumCreated {
    pub success: bool,
    pub forum: Forum,
}

pub async fn create_forum(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateForumRequest>,
) -> Result<Json<ForumCreated>, ApiError> {
    let forum = state
        .forums
        .create_forum(&req.name, &req.description, &req.role, req.category.as_deref())
        .await?;
    Ok(Json(ForumCreated {
        success: true,
        forum,
    }))
}

pub async fn list_forums(State(state): State<AppState>) -> Result<Json<Vec<Forum>>, ApiError> {
    Ok(Json(state.forums.list_forums().await?))
}
