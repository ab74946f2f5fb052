//! Media catalog search and details.

use axum::{
    extract::{Path, State},
    Json,
};
use mb_core::{MediaTitle, MediaTitleSummary};

use crate::{error::ApiError, AppState};

pub async fn search(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> Result<Json<Vec<MediaTitleSummary>>, ApiError> {
    Ok(Json(state.catalog.search(&term).await?))
}

pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MediaTitle>, ApiError> {
    Ok(Json(state.catalog.details(id.trim()).await?))
}
