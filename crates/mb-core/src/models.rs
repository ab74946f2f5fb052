//! # Domain Models
//!
//! These structs represent the core entities of media-board.
//! Forum, topic and post identifiers are sequential integers allocated by the
//! store; media ids are opaque strings owned by the media catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ForumId = i64;
pub type TopicId = i64;
pub type PostId = i64;

pub const DEFAULT_CATEGORY: &str = "General";

/// A discussion area grouping topics (e.g., "Anime Talk").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forum {
    pub forum_id: ForumId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Number of topics created under this forum
    pub topics_count: i64,
    /// Number of posts created under any topic of this forum
    pub posts_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Forum fields supplied by the caller; the store allocates `forum_id`.
#[derive(Debug, Clone)]
pub struct NewForum {
    pub name: String,
    pub description: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_id: TopicId,
    pub forum_id: ForumId,
    pub title: String,
    pub author_uid: String,
    pub content: String,
    pub posts_count: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every reply
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTopic {
    pub forum_id: ForumId,
    pub title: String,
    pub author_uid: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A reply under a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    pub topic_id: TopicId,
    pub author_uid: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub topic_id: TopicId,
    pub author_uid: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Records written by a user, resolvable to a display name at read time.
pub trait Authored {
    fn author_uid(&self) -> &str;
}

impl Authored for Topic {
    fn author_uid(&self) -> &str {
        &self.author_uid
    }
}

impl Authored for Post {
    fn author_uid(&self) -> &str {
        &self.author_uid
    }
}

/// A stored record enriched with its author's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithAuthor<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(rename = "author_displayName")]
    pub author_display_name: String,
}

/// How far a child creation propagated into the parents' denormalized counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Every parent counter was incremented
    Complete,
    /// The child exists but its forum did not, so no forum counter moved
    ForumMissing,
    /// The post exists but its topic did not, so neither topic nor forum counters moved
    TopicMissing,
}

impl Propagation {
    pub fn is_complete(self) -> bool {
        matches!(self, Propagation::Complete)
    }
}

/// Result of a child creation: the new record and its counter propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct Created<T> {
    pub record: T,
    pub propagation: Propagation,
}

/// A single user's rating/favourite record for one media title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaListEntry {
    pub media_id: String,
    pub score: Option<f64>,
    pub favourited: bool,
}

impl MediaListEntry {
    /// A membership-only entry, as created by a toggle.
    pub fn unrated(media_id: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            score: None,
            favourited: false,
        }
    }
}

/// The per-user list document. `media_id` is unique within `media`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaList {
    pub uid: String,
    pub media: Vec<MediaListEntry>,
}

impl MediaList {
    pub fn entry(&self, media_id: &str) -> Option<&MediaListEntry> {
        self.media.iter().find(|e| e.media_id == media_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new entry was inserted (new list document or appended)
    Created,
    /// An existing entry was overwritten in place
    Updated,
}

/// Derived statistics for one media title. Never authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaAggregate {
    /// Mean of non-null scores, 0 when nobody scored
    pub score: f64,
    pub scored_by: i64,
    pub members: i64,
    pub favourites: i64,
}

impl MediaAggregate {
    /// Folds every list entry that references one media title.
    ///
    /// An empty input yields the all-zero aggregate.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a MediaListEntry>,
    {
        let mut members = 0;
        let mut scored_by = 0;
        let mut favourites = 0;
        let mut total = 0.0;

        for entry in entries {
            members += 1;
            if let Some(score) = entry.score {
                scored_by += 1;
                total += score;
            }
            if entry.favourited {
                favourites += 1;
            }
        }

        let score = if scored_by > 0 {
            total / scored_by as f64
        } else {
            0.0
        };

        Self {
            score,
            scored_by,
            members,
            favourites,
        }
    }
}

/// A media catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTitle {
    pub media_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_synonyms: Vec<String>,
    #[serde(default)]
    pub main_picture: Option<String>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub premiered_season: Option<String>,
    #[serde(default)]
    pub aired_from: Option<String>,
    #[serde(default)]
    pub published_from: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(flatten)]
    pub aggregate: MediaAggregate,
}

impl MediaTitle {
    /// A bare catalog document, as created when an aggregate is upserted
    /// for an id the catalog has never seen.
    pub fn bare(media_id: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            title: None,
            title_english: None,
            title_japanese: None,
            title_synonyms: Vec::new(),
            main_picture: None,
            media_type: None,
            premiered_season: None,
            aired_from: None,
            published_from: None,
            synopsis: None,
            aggregate: MediaAggregate::default(),
        }
    }

    /// Every name the title is searchable by: main, English and Japanese
    /// titles, then the synonyms.
    pub fn search_terms(&self) -> impl Iterator<Item = &str> {
        [&self.title, &self.title_english, &self.title_japanese]
            .into_iter()
            .flatten()
            .chain(&self.title_synonyms)
            .map(String::as_str)
    }

    /// Case-insensitive substring match over every search term.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.search_terms()
            .any(|term| term.to_lowercase().contains(needle_lower))
    }
}

/// Search-result projection of a catalog document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaTitleSummary {
    pub media_id: String,
    pub main_picture: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub premiered_season: Option<String>,
    pub aired_from: Option<String>,
    pub published_from: Option<String>,
    pub synopsis: Option<String>,
}

impl From<MediaTitle> for MediaTitleSummary {
    fn from(title: MediaTitle) -> Self {
        Self {
            media_id: title.media_id,
            main_picture: title.main_picture,
            title: title.title,
            media_type: title.media_type,
            premiered_season: title.premiered_season,
            aired_from: title.aired_from,
            published_from: title.published_from,
            synopsis: title.synopsis,
        }
    }
}

/// A list entry joined with its catalog title and picture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListItem {
    pub media_id: String,
    pub score: Option<f64>,
    pub favourited: bool,
    pub title: String,
    pub main_picture: String,
}

/// Profile document kept alongside the identity provider's user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default = "default_role")]
    pub website_role: String,
    pub created_at: DateTime<Utc>,
}

fn default_role() -> String {
    "user".to_string()
}

impl UserProfile {
    /// The profile written on registration.
    pub fn new_member(uid: String, email: String, username: String) -> Self {
        Self {
            uid,
            email,
            username,
            bio: String::new(),
            profile_picture: String::new(),
            website_role: default_role(),
            created_at: Utc::now(),
        }
    }
}

/// The identity provider's view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}
