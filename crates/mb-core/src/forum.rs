//! # Forum Hierarchy Manager
//!
//! Creates forums, topics and posts and keeps the parents' denormalized
//! counters in step with their children.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{
    Authored, Created, Forum, ForumId, NewForum, NewPost, NewTopic, Post, Propagation, Topic,
    TopicId, WithAuthor, DEFAULT_CATEGORY,
};
use crate::traits::{ForumRepo, ProfileStore};

pub const ADMINISTRATOR_ROLE: &str = "administrator";

pub struct ForumService {
    repo: Arc<dyn ForumRepo>,
    profiles: Arc<dyn ProfileStore>,
}

impl ForumService {
    pub fn new(repo: Arc<dyn ForumRepo>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { repo, profiles }
    }

    /// Creates a forum. Only administrators may do so.
    pub async fn create_forum(
        &self,
        name: &str,
        description: &str,
        role: &str,
        category: Option<&str>,
    ) -> Result<Forum> {
        if name.trim().is_empty() || description.trim().is_empty() {
            return Err(AppError::validation("Name and description are required"));
        }
        if role != ADMINISTRATOR_ROLE {
            return Err(AppError::PermissionDenied(
                "You do not have permission to create a forum".into(),
            ));
        }

        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let forum = self
            .repo
            .insert_forum(NewForum {
                name: name.to_string(),
                description: description.to_string(),
                category: category.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        info!(forum_id = forum.forum_id, name = %forum.name, "forum created");
        Ok(forum)
    }

    pub async fn list_forums(&self) -> Result<Vec<Forum>> {
        Ok(self.repo.list_forums().await?)
    }

    /// Creates a topic and bumps its forum's `topics_count`.
    pub async fn create_topic(
        &self,
        forum_id: ForumId,
        title: &str,
        author_uid: &str,
        content: &str,
    ) -> Result<Created<Topic>> {
        if forum_id <= 0 || [title, author_uid, content].iter().any(|s| s.is_empty()) {
            return Err(AppError::validation("Missing required fields."));
        }

        let topic = self
            .repo
            .insert_topic(NewTopic {
                forum_id,
                title: title.to_string(),
                author_uid: author_uid.to_string(),
                content: content.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        let propagation = if self.repo.bump_forum_counters(forum_id, 1, 0).await? {
            Propagation::Complete
        } else {
            warn!(topic_id = topic.topic_id, forum_id, "topic created under unknown forum");
            Propagation::ForumMissing
        };

        info!(topic_id = topic.topic_id, forum_id, "topic created");
        Ok(Created {
            record: topic,
            propagation,
        })
    }

    /// Topics of a forum, newest first, with author display names.
    pub async fn list_topics(&self, forum_id: ForumId) -> Result<Vec<WithAuthor<Topic>>> {
        if forum_id <= 0 {
            return Err(AppError::validation(
                "Forum ID is required and must be a number.",
            ));
        }
        let topics = self.repo.list_topics_by_forum(forum_id).await?;
        Ok(self.with_authors(topics).await)
    }

    /// Creates a reply, then propagates it to the topic and forum counters.
    pub async fn create_post(
        &self,
        topic_id: TopicId,
        author_uid: &str,
        content: &str,
    ) -> Result<Created<Post>> {
        if topic_id <= 0 || author_uid.is_empty() || content.is_empty() {
            return Err(AppError::validation("Missing required fields."));
        }

        let now = Utc::now();
        let post = self
            .repo
            .insert_post(NewPost {
                topic_id,
                author_uid: author_uid.to_string(),
                content: content.to_string(),
                created_at: now,
            })
            .await?;

        let propagation = match self.repo.record_reply(topic_id, now).await? {
            None => Propagation::TopicMissing,
            Some(topic) => {
                if self.repo.bump_forum_counters(topic.forum_id, 0, 1).await? {
                    Propagation::Complete
                } else {
                    Propagation::ForumMissing
                }
            }
        };
        if !propagation.is_complete() {
            warn!(post_id = post.post_id, topic_id, ?propagation, "post counters not fully propagated");
        }

        info!(post_id = post.post_id, topic_id, "post created");
        Ok(Created {
            record: post,
            propagation,
        })
    }

    /// Posts of a topic, oldest first, with author display names.
    ///
    /// Counts as a view of the topic whether or not it has any posts.
    pub async fn list_posts(&self, topic_id: TopicId) -> Result<Vec<WithAuthor<Post>>> {
        if topic_id <= 0 {
            return Err(AppError::validation(
                "Topic ID is required and must be a number.",
            ));
        }
        self.repo.increment_views(topic_id).await?;
        let posts = self.repo.list_posts_by_topic(topic_id).await?;
        Ok(self.with_authors(posts).await)
    }

    async fn with_authors<T: Authored>(&self, records: Vec<T>) -> Vec<WithAuthor<T>> {
        let names = join_all(
            records
                .iter()
                .map(|r| self.display_name(r.author_uid())),
        )
        .await;

        records
            .into_iter()
            .zip(names)
            .map(|(record, author_display_name)| WithAuthor {
                record,
                author_display_name,
            })
            .collect()
    }

    /// Never fails: a missing profile or a lookup error falls back to the uid.
    async fn display_name(&self, uid: &str) -> String {
        match self.profiles.get_profile(uid).await {
            Ok(Some(profile)) if !profile.username.is_empty() => profile.username,
            Ok(_) => uid.to_string(),
            Err(e) => {
                warn!(uid, error = %e, "profile lookup failed, using uid as display name");
                uid.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use crate::traits::{MockForumRepo, MockProfileStore};
    use chrono::Utc;

    fn forum(forum_id: ForumId) -> Forum {
        Forum {
            forum_id,
            name: "Anime Talk".into(),
            description: "General anime discussion".into(),
            category: DEFAULT_CATEGORY.into(),
            topics_count: 0,
            posts_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn topic(topic_id: TopicId, forum_id: ForumId, author: &str) -> Topic {
        Topic {
            topic_id,
            forum_id,
            title: "Welcome".into(),
            author_uid: author.into(),
            content: "Hello all".into(),
            posts_count: 0,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(repo: MockForumRepo, profiles: MockProfileStore) -> ForumService {
        ForumService::new(Arc::new(repo), Arc::new(profiles))
    }

    #[tokio::test]
    async fn create_forum_requires_administrator() {
        let mut repo = MockForumRepo::new();
        repo.expect_insert_forum().never();

        let err = service(repo, MockProfileStore::new())
            .create_forum("Anime Talk", "General anime discussion", "user", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn create_forum_rejects_blank_fields_before_role() {
        let err = service(MockForumRepo::new(), MockProfileStore::new())
            .create_forum("", "desc", "user", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_category_defaults_to_general() {
        let mut repo = MockForumRepo::new();
        repo.expect_insert_forum()
            .withf(|f| f.category == DEFAULT_CATEGORY)
            .returning(|_| Ok(forum(1)));

        let created = service(repo, MockProfileStore::new())
            .create_forum("Anime Talk", "General anime discussion", ADMINISTRATOR_ROLE, Some("  "))
            .await
            .unwrap();
        assert_eq!(created.forum_id, 1);
    }

    #[tokio::test]
    async fn topic_under_unknown_forum_is_partial() {
        let mut repo = MockForumRepo::new();
        repo.expect_insert_topic().returning(|t| Ok(topic(1, t.forum_id, &t.author_uid)));
        repo.expect_bump_forum_counters()
            .withf(|id, topics, posts| *id == 42 && *topics == 1 && *posts == 0)
            .returning(|_, _, _| Ok(false));

        let created = service(repo, MockProfileStore::new())
            .create_topic(42, "Welcome", "user1", "Hello all")
            .await
            .unwrap();
        assert_eq!(created.propagation, Propagation::ForumMissing);
        assert_eq!(created.record.topic_id, 1);
    }

    #[tokio::test]
    async fn post_on_missing_topic_skips_forum_increment() {
        let mut repo = MockForumRepo::new();
        repo.expect_insert_post().returning(|p| {
            Ok(Post {
                post_id: 7,
                topic_id: p.topic_id,
                author_uid: p.author_uid,
                content: p.content,
                created_at: p.created_at,
                edited_at: None,
            })
        });
        repo.expect_record_reply().returning(|_, _| Ok(None));
        repo.expect_bump_forum_counters().never();

        let created = service(repo, MockProfileStore::new())
            .create_post(99, "user2", "Hi there!")
            .await
            .unwrap();
        assert_eq!(created.propagation, Propagation::TopicMissing);
        assert_eq!(created.record.edited_at, None);
    }

    #[tokio::test]
    async fn enrichment_falls_back_to_uid_on_lookup_failure() {
        let mut repo = MockForumRepo::new();
        repo.expect_list_topics_by_forum()
            .returning(|forum_id| Ok(vec![topic(2, forum_id, "known"), topic(1, forum_id, "broken")]));

        let mut profiles = MockProfileStore::new();
        profiles.expect_get_profile().returning(|uid| match uid {
            "known" => Ok(Some(UserProfile::new_member(
                "known".into(),
                "k@example.com".into(),
                "Known User".into(),
            ))),
            _ => Err(anyhow::anyhow!("profile backend unavailable")),
        });

        let topics = service(repo, profiles).list_topics(1).await.unwrap();
        assert_eq!(topics[0].author_display_name, "Known User");
        assert_eq!(topics[1].author_display_name, "broken");
    }

    #[tokio::test]
    async fn listing_posts_counts_a_view_even_without_posts() {
        let mut repo = MockForumRepo::new();
        repo.expect_increment_views()
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_list_posts_by_topic().returning(|_| Ok(vec![]));

        let posts = service(repo, MockProfileStore::new())
            .list_posts(5)
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn non_positive_ids_are_rejected() {
        let svc = service(MockForumRepo::new(), MockProfileStore::new());
        assert!(matches!(svc.list_topics(0).await, Err(AppError::Validation(_))));
        assert!(matches!(svc.list_posts(-3).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn store_failure_maps_to_store_error() {
        let mut repo = MockForumRepo::new();
        repo.expect_list_forums()
            .returning(|| Err(anyhow::anyhow!("connection reset")));

        let err = service(repo, MockProfileStore::new())
            .list_forums()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }
}
