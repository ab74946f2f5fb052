//! Topic creation and per-forum listing.

use axum::{
    extract::{Path, State},
    Json,
};
use mb_core::{Propagation, Topic, WithAuthor};
use serde::{Deserialize, Serialize};

use super::{lenient, parse_id};
use crate::{error::ApiError, extract::ApiJson, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateTopicRequest {
    #[serde(default, deserialize_with = "lenient::record_id")]
    pub forum_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_uid: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TopicCreated {
    pub success: bool,
    pub topic: Topic,
    pub counters: Propagation,
}

pub async fn create_topic(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTopicRequest>,
) -> Result<Json<TopicCreated>, ApiError> {
    let created = state
        .forums
        .create_topic(
            req.forum_id.unwrap_or_default(),
            &req.title,
            &req.author_uid,
            &req.content,
        )
        .await?;
    Ok(Json(TopicCreated {
        success: true,
        topic: created.record,
        counters: created.propagation,
    }))
}

/// Topics of a forum, newest first.
pub async fn list_topics(
    State(state): State<AppState>,
    Path(forum_id): Path<String>,
) -> Result<Json<Vec<WithAuthor<Topic>>>, ApiError> {
    let forum_id = parse_id(&forum_id, "Forum ID is required and must be a number.")?;
    Ok(Json(state.forums.list_topics(forum_id).await?))
}
