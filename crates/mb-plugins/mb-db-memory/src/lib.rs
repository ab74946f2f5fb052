//! # mb-db-memory
//!
//! In-process document store implementing every mb-core store port.
//! Forum tables live behind one async `RwLock`, so id allocation and counter
//! updates are atomic with respect to each other. Media lists, catalog
//! documents and profiles are sharded in `DashMap`s keyed by their document id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use mb_core::models::{
    Forum, ForumId, MediaAggregate, MediaList, MediaListEntry, MediaTitle, NewForum, NewPost,
    NewTopic, Post, Topic, TopicId, ToggleOutcome, UpsertOutcome, UserProfile,
};
use mb_core::traits::{ForumRepo, MediaCatalogRepo, MediaListRepo, ProfileStore};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct ForumTables {
    forums: Vec<Forum>,
    topics: Vec<Topic>,
    posts: Vec<Post>,
}

/// Next id for a collection: highest existing id + 1, or 1 when empty.
fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

#[derive(Default)]
pub struct MemoryStore {
    forums: RwLock<ForumTables>,
    lists: DashMap<String, Vec<MediaListEntry>>,
    titles: DashMap<String, MediaTitle>,
    profiles: DashMap<String, UserProfile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForumRepo for MemoryStore {
    async fn insert_forum(&self, forum: NewForum) -> anyhow::Result<Forum> {
        let mut tables = self.forums.write().await;
        let forum = Forum {
            forum_id: next_id(tables.forums.iter().map(|f| f.forum_id)),
            name: forum.name,
            description: forum.description,
            category: forum.category,
            topics_count: 0,
            posts_count: 0,
            created_at: forum.created_at,
            updated_at: forum.created_at,
        };
        tables.forums.push(forum.clone());
        Ok(forum)
    }

    async fn list_forums(&self) -> anyhow::Result<Vec<Forum>> {
        Ok(self.forums.read().await.forums.clone())
    }

    async fn bump_forum_counters(
        &self,
        forum_id: ForumId,
        topics: i64,
        posts: i64,
    ) -> anyhow::Result<bool> {
        let mut tables = self.forums.write().await;
        match tables.forums.iter_mut().find(|f| f.forum_id == forum_id) {
            Some(forum) => {
                forum.topics_count += topics;
                forum.posts_count += posts;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_topic(&self, topic: NewTopic) -> anyhow::Result<Topic> {
        let mut tables = self.forums.write().await;
        let topic = Topic {
            topic_id: next_id(tables.topics.iter().map(|t| t.topic_id)),
            forum_id: topic.forum_id,
            title: topic.title,
            author_uid: topic.author_uid,
            content: topic.content,
            posts_count: 0,
            views: 0,
            created_at: topic.created_at,
            updated_at: topic.created_at,
        };
        tables.topics.push(topic.clone());
        Ok(topic)
    }

    async fn list_topics_by_forum(&self, forum_id: ForumId) -> anyhow::Result<Vec<Topic>> {
        let tables = self.forums.read().await;
        let mut topics: Vec<Topic> = tables
            .topics
            .iter()
            .filter(|t| t.forum_id == forum_id)
            .cloned()
            .collect();
        topics.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.topic_id.cmp(&a.topic_id))
        });
        Ok(topics)
    }

    async fn record_reply(
        &self,
        topic_id: TopicId,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Topic>> {
        let mut tables = self.forums.write().await;
        Ok(tables
            .topics
            .iter_mut()
            .find(|t| t.topic_id == topic_id)
            .map(|topic| {
                topic.posts_count += 1;
                topic.updated_at = at;
                topic.clone()
            }))
    }

    async fn increment_views(&self, topic_id: TopicId) -> anyhow::Result<bool> {
        let mut tables = self.forums.write().await;
        match tables.topics.iter_mut().find(|t| t.topic_id == topic_id) {
            Some(topic) => {
                topic.views += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post> {
        let mut tables = self.forums.write().await;
        let post = Post {
            post_id: next_id(tables.posts.iter().map(|p| p.post_id)),
            topic_id: post.topic_id,
            author_uid: post.author_uid,
            content: post.content,
            created_at: post.created_at,
            edited_at: None,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts_by_topic(&self, topic_id: TopicId) -> anyhow::Result<Vec<Post>> {
        let tables = self.forums.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.topic_id == topic_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.post_id.cmp(&b.post_id)));
        Ok(posts)
    }
}

#[async_trait]
impl MediaListRepo for MemoryStore {
    async fn get_list(&self, uid: &str) -> anyhow::Result<Option<MediaList>> {
        Ok(self.lists.get(uid).map(|media| MediaList {
            uid: uid.to_string(),
            media: media.clone(),
        }))
    }

    async fn toggle_entry(&self, uid: &str, media_id: &str) -> anyhow::Result<ToggleOutcome> {
        let mut media = self.lists.entry(uid.to_string()).or_default();
        match media.iter().position(|e| e.media_id == media_id) {
            Some(idx) => {
                media.remove(idx);
                Ok(ToggleOutcome::Removed)
            }
            None => {
                media.push(MediaListEntry::unrated(media_id));
                Ok(ToggleOutcome::Added)
            }
        }
    }

    async fn upsert_entry(
        &self,
        uid: &str,
        entry: MediaListEntry,
    ) -> anyhow::Result<UpsertOutcome> {
        let mut media = self.lists.entry(uid.to_string()).or_default();
        match media.iter_mut().find(|e| e.media_id == entry.media_id) {
            Some(existing) => {
                *existing = entry;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                media.push(entry);
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn entries_for_media(&self, media_id: &str) -> anyhow::Result<Vec<MediaListEntry>> {
        Ok(self
            .lists
            .iter()
            .flat_map(|list| {
                list.value()
                    .iter()
                    .filter(|e| e.media_id == media_id)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect())
    }
}

#[async_trait]
impl MediaCatalogRepo for MemoryStore {
    async fn get_title(&self, media_id: &str) -> anyhow::Result<Option<MediaTitle>> {
        Ok(self.titles.get(media_id).map(|t| t.clone()))
    }

    async fn get_titles(&self, media_ids: &[String]) -> anyhow::Result<Vec<MediaTitle>> {
        Ok(media_ids
            .iter()
            .filter_map(|id| self.titles.get(id).map(|t| t.clone()))
            .collect())
    }

    async fn search_titles(&self, term: &str) -> anyhow::Result<Vec<MediaTitle>> {
        let needle = term.to_lowercase();
        let mut hits: Vec<MediaTitle> = self
            .titles
            .iter()
            .filter(|t| t.matches(&needle))
            .map(|t| t.clone())
            .collect();
        hits.sort_by(|a, b| a.media_id.cmp(&b.media_id));
        Ok(hits)
    }

    async fn put_title(&self, mut title: MediaTitle) -> anyhow::Result<()> {
        match self.titles.entry(title.media_id.clone()) {
            Entry::Occupied(mut existing) => {
                title.aggregate = existing.get().aggregate;
                existing.insert(title);
            }
            Entry::Vacant(slot) => {
                title.aggregate = MediaAggregate::default();
                slot.insert(title);
            }
        }
        Ok(())
    }

    async fn store_aggregate(
        &self,
        media_id: &str,
        aggregate: MediaAggregate,
    ) -> anyhow::Result<()> {
        let mut title = self.titles.entry(media_id.to_string()).or_insert_with(|| {
            debug!(media_id, "creating bare catalog document");
            MediaTitle::bare(media_id)
        });
        title.aggregate = aggregate;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, uid: &str) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.profiles.get(uid).map(|p| p.clone()))
    }

    async fn find_profile_by_email(&self, email: &str) -> anyhow::Result<Option<UserProfile>> {
        let email = email.to_lowercase();
        Ok(self
            .profiles
            .iter()
            .find(|p| p.email.to_lowercase() == email)
            .map(|p| p.clone()))
    }

    async fn put_profile(&self, profile: UserProfile) -> anyhow::Result<()> {
        self.profiles.insert(profile.uid.clone(), profile);
        Ok(())
    }

    async fn update_bio(&self, uid: &str, bio: &str) -> anyhow::Result<Option<UserProfile>> {
        Ok(self.profiles.get_mut(uid).map(|mut p| {
            p.bio = bio.to_string();
            p.clone()
        }))
    }
}
