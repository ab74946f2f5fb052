//! Media catalog lookups.

use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{MediaTitle, MediaTitleSummary};
use crate::traits::MediaCatalogRepo;

pub struct CatalogService {
    catalog: Arc<dyn MediaCatalogRepo>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn MediaCatalogRepo>) -> Self {
        Self { catalog }
    }

    /// Titles whose name, English name, Japanese name or synonyms contain `term`.
    pub async fn search(&self, term: &str) -> Result<Vec<MediaTitleSummary>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::validation("Search term is required"));
        }

        let hits = self.catalog.search_titles(term).await?;
        if hits.is_empty() {
            return Err(AppError::not_found("Media matching", term));
        }
        Ok(hits.into_iter().map(MediaTitleSummary::from).collect())
    }

    pub async fn details(&self, media_id: &str) -> Result<MediaTitle> {
        if media_id.trim().is_empty() {
            return Err(AppError::validation("Invalid media id"));
        }
        self.catalog
            .get_title(media_id)
            .await?
            .ok_or_else(|| AppError::not_found("Media", media_id))
    }

    /// Loads catalog documents in bulk (startup seeding).
    pub async fn import(&self, titles: Vec<MediaTitle>) -> Result<usize> {
        let count = titles.len();
        for title in titles {
            self.catalog.put_title(title).await?;
        }
        info!(count, "catalog titles imported");
        Ok(count)
    }
}
