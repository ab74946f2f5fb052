//! # Media-List Aggregation Engine
//!
//! Owns every mutation of a user's media list and keeps the catalog's derived
//! statistics (`score`, `scored_by`, `members`, `favourites`) consistent with
//! the full cross-user set of entries.
//!
//! Each mutation of an entry for media `X` and the recomputation that follows
//! run under a lock keyed by `X`. Two concurrent updates for the same title
//! therefore cannot interleave so that the older recomputation is written last.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::{
    MediaAggregate, MediaListEntry, ToggleOutcome, UpsertOutcome, UserListItem,
};
use crate::traits::{MediaCatalogRepo, MediaListRepo};

pub const MAX_SCORE: f64 = 10.0;
const UNKNOWN_TITLE: &str = "Unknown";

/// Async mutexes handed out per key. An entry lives only while someone holds
/// or waits on it.
#[derive(Default)]
struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    async fn lock(&self, key: &str) -> KeyedGuard<'_> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        KeyedGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }
}

struct KeyedGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // The map's own reference is the last one: nobody holds or awaits it.
        self.locks
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct MediaListService {
    lists: Arc<dyn MediaListRepo>,
    catalog: Arc<dyn MediaCatalogRepo>,
    locks: KeyedLocks,
}

impl MediaListService {
    pub fn new(lists: Arc<dyn MediaListRepo>, catalog: Arc<dyn MediaCatalogRepo>) -> Self {
        Self {
            lists,
            catalog,
            locks: KeyedLocks::default(),
        }
    }

    /// Adds the title to the user's list, or removes it if already present.
    /// Returns true when the title ended up in the list.
    pub async fn toggle_membership(&self, uid: &str, media_id: &str) -> Result<bool> {
        let (uid, media_id) = require_ids(uid, media_id)?;

        let _guard = self.locks.lock(media_id).await;
        let outcome = self.lists.toggle_entry(uid, media_id).await?;
        self.recompute_locked(media_id).await?;

        debug!(uid, media_id, ?outcome, "media list toggled");
        Ok(outcome == ToggleOutcome::Added)
    }

    /// The user's entry for one title, if any.
    pub async fn get_entry(&self, uid: &str, media_id: &str) -> Result<Option<MediaListEntry>> {
        let (uid, media_id) = require_ids(uid, media_id)?;
        let list = self.lists.get_list(uid).await?;
        Ok(list.and_then(|l| l.entry(media_id).cloned()))
    }

    /// Creates or overwrites the user's rating/favourite for one title.
    pub async fn update_entry(
        &self,
        uid: &str,
        media_id: &str,
        score: Option<f64>,
        favourited: Option<bool>,
    ) -> Result<UpsertOutcome> {
        let (uid, media_id) = require_ids(uid, media_id)?;
        if let Some(score) = score {
            if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) {
                return Err(AppError::validation(format!(
                    "score must be between 0 and {MAX_SCORE}"
                )));
            }
        }

        let entry = MediaListEntry {
            media_id: media_id.to_string(),
            score,
            favourited: favourited.unwrap_or(false),
        };

        let _guard = self.locks.lock(media_id).await;
        let outcome = self.lists.upsert_entry(uid, entry).await?;
        self.recompute_locked(media_id).await?;

        info!(uid, media_id, ?outcome, "media list entry saved");
        Ok(outcome)
    }

    /// Rebuilds the catalog statistics of one title from every user's list.
    pub async fn recompute_aggregate(&self, media_id: &str) -> Result<MediaAggregate> {
        let media_id = media_id.trim();
        if media_id.is_empty() {
            return Err(AppError::validation("Missing media_id"));
        }
        let _guard = self.locks.lock(media_id).await;
        self.recompute_locked(media_id).await
    }

    async fn recompute_locked(&self, media_id: &str) -> Result<MediaAggregate> {
        let entries = self.lists.entries_for_media(media_id).await?;
        let aggregate = MediaAggregate::from_entries(&entries);
        self.catalog.store_aggregate(media_id, aggregate).await?;

        debug!(
            media_id,
            members = aggregate.members,
            scored_by = aggregate.scored_by,
            score = aggregate.score,
            "aggregate recomputed"
        );
        Ok(aggregate)
    }

    /// The user's list in its stored order, joined with catalog titles.
    pub async fn get_user_list(&self, uid: &str) -> Result<Vec<UserListItem>> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(AppError::validation("Missing uid"));
        }

        let Some(list) = self.lists.get_list(uid).await? else {
            return Ok(Vec::new());
        };
        if list.media.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = list.media.iter().map(|e| e.media_id.clone()).collect();
        let titles: HashMap<String, _> = self
            .catalog
            .get_titles(&ids)
            .await?
            .into_iter()
            .map(|t| (t.media_id.clone(), t))
            .collect();

        Ok(list
            .media
            .into_iter()
            .map(|entry| {
                let title = titles.get(&entry.media_id);
                UserListItem {
                    title: title
                        .and_then(|t| t.title.clone())
                        .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                    main_picture: title
                        .and_then(|t| t.main_picture.clone())
                        .unwrap_or_default(),
                    media_id: entry.media_id,
                    score: entry.score,
                    favourited: entry.favourited,
                }
            })
            .collect())
    }
}

/// Trims both ids; either one blank is a validation error.
fn require_ids<'a>(uid: &'a str, media_id: &'a str) -> Result<(&'a str, &'a str)> {
    let (uid, media_id) = (uid.trim(), media_id.trim());
    if uid.is_empty() || media_id.is_empty() {
        return Err(AppError::validation("Missing uid or media_id"));
    }
    Ok((uid, media_id))
}
