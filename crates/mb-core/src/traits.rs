//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.
//! Every single method is one atomic store operation; the services compose them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Forum, ForumId, IdentityUser, MediaAggregate, MediaList, MediaListEntry, MediaTitle, NewForum,
    NewPost, NewTopic, Post, Topic, TopicId, ToggleOutcome, UpsertOutcome, UserProfile,
};

/// Persistence contract for the forum → topic → post hierarchy.
///
/// `insert_*` allocate the next sequential id (max + 1, starting at 1) as
/// part of the insert, so concurrent creations never share an id.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ForumRepo: Send + Sync {
    // Forum Operations
    async fn insert_forum(&self, forum: NewForum) -> anyhow::Result<Forum>;
    async fn list_forums(&self) -> anyhow::Result<Vec<Forum>>;
    /// Adds to a forum's counters. Returns false when no forum matched.
    async fn bump_forum_counters(
        &self,
        forum_id: ForumId,
        topics: i64,
        posts: i64,
    ) -> anyhow::Result<bool>;

    // Topic Operations
    async fn insert_topic(&self, topic: NewTopic) -> anyhow::Result<Topic>;
    /// Topics of one forum, newest first.
    async fn list_topics_by_forum(&self, forum_id: ForumId) -> anyhow::Result<Vec<Topic>>;
    /// Increments `posts_count` and sets `updated_at`, returning the updated topic.
    async fn record_reply(
        &self,
        topic_id: TopicId,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Topic>>;
    /// Increments `views`. Returns false when no topic matched.
    async fn increment_views(&self, topic_id: TopicId) -> anyhow::Result<bool>;

    // Post Operations
    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post>;
    /// Posts of one topic, oldest first.
    async fn list_posts_by_topic(&self, topic_id: TopicId) -> anyhow::Result<Vec<Post>>;
}

/// Persistence contract for per-user media lists.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaListRepo: Send + Sync {
    async fn get_list(&self, uid: &str) -> anyhow::Result<Option<MediaList>>;

    /// Removes the entry when present, otherwise appends an unrated one
    /// (creating the list document if needed).
    async fn toggle_entry(&self, uid: &str, media_id: &str) -> anyhow::Result<ToggleOutcome>;

    /// Overwrites the entry with the same media_id in place, or appends it
    /// (creating the list document if needed).
    async fn upsert_entry(&self, uid: &str, entry: MediaListEntry)
        -> anyhow::Result<UpsertOutcome>;

    /// Every entry across all users that references `media_id`.
    async fn entries_for_media(&self, media_id: &str) -> anyhow::Result<Vec<MediaListEntry>>;
}

/// The media catalog collection.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaCatalogRepo: Send + Sync {
    async fn get_title(&self, media_id: &str) -> anyhow::Result<Option<MediaTitle>>;
    /// Batched lookup; ids with no document are simply absent from the result.
    async fn get_titles(&self, media_ids: &[String]) -> anyhow::Result<Vec<MediaTitle>>;
    /// Case-insensitive substring search across all title fields.
    async fn search_titles(&self, term: &str) -> anyhow::Result<Vec<MediaTitle>>;
    /// Inserts or updates the descriptive fields of a catalog document.
    /// The aggregate fields are left untouched; only `store_aggregate` writes them.
    async fn put_title(&self, title: MediaTitle) -> anyhow::Result<()>;
    /// Writes the four aggregate fields, creating a bare document if needed.
    async fn store_aggregate(
        &self,
        media_id: &str,
        aggregate: MediaAggregate,
    ) -> anyhow::Result<()>;
}

/// User-profile store contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, uid: &str) -> anyhow::Result<Option<UserProfile>>;
    /// Case-insensitive lookup by email.
    async fn find_profile_by_email(&self, email: &str) -> anyhow::Result<Option<UserProfile>>;
    async fn put_profile(&self, profile: UserProfile) -> anyhow::Result<()>;
    /// Returns the updated profile, or None when no profile exists for `uid`.
    async fn update_bio(&self, uid: &str, bio: &str) -> anyhow::Result<Option<UserProfile>>;
}

/// Failures the identity provider reports to its callers.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("an account already exists for {0}")]
    EmailTaken(String),
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// External identity provider contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<IdentityUser, IdentityError>;
}
