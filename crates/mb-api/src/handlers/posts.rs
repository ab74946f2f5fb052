//! Replies: creation and per-topic listing.

use axum::{
    extract::{Path, State},
    Json,
};
use mb_core::{Post, Propagation, WithAuthor};
use serde::{Deserialize, Serialize};

use super::{lenient, parse_id};
use crate::{error::ApiError, extract::ApiJson, AppState};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default, deserialize_with = "lenient::record_id")]
    pub topic_id: Option<i64>,
    #[serde(default)]
    pub author_uid: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PostCreated {
    pub success: bool,
    pub post: Post,
    pub counters: Propagation,
}

pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> Result<Json<PostCreated>, ApiError> {
    let created = state
        .forums
        .create_post(req.topic_id.unwrap_or_default(), &req.author_uid, &req.content)
        .await?;
    Ok(Json(PostCreated {
        success: true,
        post: created.record,
        counters: created.propagation,
    }))
}

/// Posts of a topic, oldest first. Counts as one view of the topic.
pub async fn list_posts(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<Json<Vec<WithAuthor<Post>>>, ApiError> {
    let topic_id = parse_id(&topic_id, "Topic ID is required and must be a number.")?;
    Ok(Json(state.forums.list_posts(topic_id).await?))
}
