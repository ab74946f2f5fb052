//! # mb-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `mb-core` document models. Every port method is a single statement
//! or a single transaction, so id allocation, counter increments and list
//! mutations are atomic.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mb_core::models::{
    Forum, ForumId, MediaAggregate, MediaList, MediaListEntry, MediaTitle, NewForum, NewPost,
    NewTopic, Post, Topic, TopicId, ToggleOutcome, UpsertOutcome, UserProfile,
};
use mb_core::traits::{ForumRepo, MediaCatalogRepo, MediaListRepo, ProfileStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;

const FORUM_COLUMNS: &str =
    "forum_id, name, description, category, topics_count, posts_count, created_at, updated_at";
const TOPIC_COLUMNS: &str =
    "topic_id, forum_id, title, author_uid, content, posts_count, views, created_at, updated_at";
const POST_COLUMNS: &str = "post_id, topic_id, author_uid, content, created_at, edited_at";
const CATALOG_COLUMNS: &str = "media_id, title, title_english, title_japanese, title_synonyms, \
     main_picture, media_type, premiered_season, aired_from, published_from, synopsis";
const TITLE_COLUMNS: &str = "media_id, title, title_english, title_japanese, title_synonyms, \
     main_picture, media_type, premiered_season, aired_from, published_from, synopsis, \
     score, scored_by, members, favourites";
const PROFILE_COLUMNS: &str =
    "uid, email, username, bio, profile_picture, website_role, created_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database and applies migrations.
    ///
    /// In-memory databases are private to a connection, so they get a
    /// single-connection pool.
    pub async fn new(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let max_connections = if url.contains(":memory:") {
            1
        } else {
            max_connections.max(1)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(url, max_connections, "sqlite store ready");

        Ok(Self { pool })
    }
}

fn forum_from_row(row: &SqliteRow) -> Result<Forum, sqlx::Error> {
    Ok(Forum {
        forum_id: row.try_get("forum_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        topics_count: row.try_get("topics_count")?,
        posts_count: row.try_get("posts_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn topic_from_row(row: &SqliteRow) -> Result<Topic, sqlx::Error> {
    Ok(Topic {
        topic_id: row.try_get("topic_id")?,
        forum_id: row.try_get("forum_id")?,
        title: row.try_get("title")?,
        author_uid: row.try_get("author_uid")?,
        content: row.try_get("content")?,
        posts_count: row.try_get("posts_count")?,
        views: row.try_get("views")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn post_from_row(row: &SqliteRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        post_id: row.try_get("post_id")?,
        topic_id: row.try_get("topic_id")?,
        author_uid: row.try_get("author_uid")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        edited_at: row.try_get("edited_at")?,
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<MediaListEntry, sqlx::Error> {
    Ok(MediaListEntry {
        media_id: row.try_get("media_id")?,
        score: row.try_get("score")?,
        favourited: row.try_get("favourited")?,
    })
}

fn title_from_row(row: &SqliteRow) -> anyhow::Result<MediaTitle> {
    let synonyms: String = row.try_get("title_synonyms")?;
    Ok(MediaTitle {
        media_id: row.try_get("media_id")?,
        title: row.try_get("title")?,
        title_english: row.try_get("title_english")?,
        title_japanese: row.try_get("title_japanese")?,
        title_synonyms: serde_json::from_str(&synonyms)?,
        main_picture: row.try_get("main_picture")?,
        media_type: row.try_get("media_type")?,
        premiered_season: row.try_get("premiered_season")?,
        aired_from: row.try_get("aired_from")?,
        published_from: row.try_get("published_from")?,
        synopsis: row.try_get("synopsis")?,
        aggregate: MediaAggregate {
            score: row.try_get("score")?,
            scored_by: row.try_get("scored_by")?,
            members: row.try_get("members")?,
            favourites: row.try_get("favourites")?,
        },
    })
}

fn profile_from_row(row: &SqliteRow) -> Result<UserProfile, sqlx::Error> {
    Ok(UserProfile {
        uid: row.try_get("uid")?,
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        bio: row.try_get("bio")?,
        profile_picture: row.try_get("profile_picture")?,
        website_role: row.try_get("website_role")?,
        created_at: row.try_get("created_at")?,
    })
}

/// `%term%` with LIKE wildcards in the term escaped by `\`.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ForumRepo for SqliteStore {
    async fn insert_forum(&self, forum: NewForum) -> anyhow::Result<Forum> {
        let row = sqlx::query(&format!(
            "INSERT INTO forums (name, description, category, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {FORUM_COLUMNS}"
        ))
        .bind(forum.name)
        .bind(forum.description)
        .bind(forum.category)
        .bind(forum.created_at)
        .bind(forum.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(forum_from_row(&row)?)
    }

    async fn list_forums(&self) -> anyhow::Result<Vec<Forum>> {
        let rows = sqlx::query(&format!("SELECT {FORUM_COLUMNS} FROM forums ORDER BY forum_id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(forum_from_row).collect::<Result<_, _>>()?)
    }

    async fn bump_forum_counters(
        &self,
        forum_id: ForumId,
        topics: i64,
        posts: i64,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE forums SET topics_count = topics_count + ?, posts_count = posts_count + ? \
             WHERE forum_id = ?",
        )
        .bind(topics)
        .bind(posts)
        .bind(forum_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_topic(&self, topic: NewTopic) -> anyhow::Result<Topic> {
        let row = sqlx::query(&format!(
            "INSERT INTO topics (forum_id, title, author_uid, content, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {TOPIC_COLUMNS}"
        ))
        .bind(topic.forum_id)
        .bind(topic.title)
        .bind(topic.author_uid)
        .bind(topic.content)
        .bind(topic.created_at)
        .bind(topic.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(topic_from_row(&row)?)
    }

    async fn list_topics_by_forum(&self, forum_id: ForumId) -> anyhow::Result<Vec<Topic>> {
        let rows = sqlx::query(&format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE forum_id = ? \
             ORDER BY created_at DESC, topic_id DESC"
        ))
        .bind(forum_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(topic_from_row).collect::<Result<_, _>>()?)
    }

    async fn record_reply(
        &self,
        topic_id: TopicId,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Topic>> {
        let row = sqlx::query(&format!(
            "UPDATE topics SET posts_count = posts_count + 1, updated_at = ? \
             WHERE topic_id = ? RETURNING {TOPIC_COLUMNS}"
        ))
        .bind(at)
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(topic_from_row).transpose()?)
    }

    async fn increment_views(&self, topic_id: TopicId) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE topics SET views = views + 1 WHERE topic_id = ?")
            .bind(topic_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (topic_id, author_uid, content, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.topic_id)
        .bind(post.author_uid)
        .bind(post.content)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(post_from_row(&row)?)
    }

    async fn list_posts_by_topic(&self, topic_id: TopicId) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE topic_id = ? ORDER BY created_at ASC, post_id ASC"
        ))
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(post_from_row).collect::<Result<_, _>>()?)
    }
}

#[async_trait]
impl MediaListRepo for SqliteStore {
    async fn get_list(&self, uid: &str) -> anyhow::Result<Option<MediaList>> {
        let rows = sqlx::query(
            "SELECT media_id, score, favourited FROM media_list_entries \
             WHERE uid = ? ORDER BY position",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(MediaList {
            uid: uid.to_string(),
            media: rows.iter().map(entry_from_row).collect::<Result<_, _>>()?,
        }))
    }

    /// Starts with a write so the transaction takes SQLite's write lock up front.
    async fn toggle_entry(&self, uid: &str, media_id: &str) -> anyhow::Result<ToggleOutcome> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM media_list_entries WHERE uid = ? AND media_id = ?")
            .bind(uid)
            .bind(media_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let outcome = if removed > 0 {
            ToggleOutcome::Removed
        } else {
            append_entry(&mut tx, uid, &MediaListEntry::unrated(media_id)).await?;
            ToggleOutcome::Added
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn upsert_entry(
        &self,
        uid: &str,
        entry: MediaListEntry,
    ) -> anyhow::Result<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE media_list_entries SET score = ?, favourited = ? WHERE uid = ? AND media_id = ?",
        )
        .bind(entry.score)
        .bind(entry.favourited)
        .bind(uid)
        .bind(&entry.media_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let outcome = if updated > 0 {
            UpsertOutcome::Updated
        } else {
            append_entry(&mut tx, uid, &entry).await?;
            UpsertOutcome::Created
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn entries_for_media(&self, media_id: &str) -> anyhow::Result<Vec<MediaListEntry>> {
        let rows = sqlx::query(
            "SELECT media_id, score, favourited FROM media_list_entries WHERE media_id = ?",
        )
        .bind(media_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(entry_from_row).collect::<Result<_, _>>()?)
    }
}

async fn append_entry(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    uid: &str,
    entry: &MediaListEntry,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO media_list_entries (uid, media_id, score, favourited, position) \
         VALUES (?, ?, ?, ?, \
            (SELECT COALESCE(MAX(position), 0) + 1 FROM media_list_entries WHERE uid = ?))",
    )
    .bind(uid)
    .bind(&entry.media_id)
    .bind(entry.score)
    .bind(entry.favourited)
    .bind(uid)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl MediaCatalogRepo for SqliteStore {
    async fn get_title(&self, media_id: &str) -> anyhow::Result<Option<MediaTitle>> {
        let row = sqlx::query(&format!(
            "SELECT {TITLE_COLUMNS} FROM media_titles WHERE media_id = ?"
        ))
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(title_from_row).transpose()
    }

    async fn get_titles(&self, media_ids: &[String]) -> anyhow::Result<Vec<MediaTitle>> {
        if media_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {TITLE_COLUMNS} FROM media_titles WHERE media_id IN ("
        ));
        let mut ids = query.separated(", ");
        for id in media_ids {
            ids.push_bind(id);
        }
        ids.push_unseparated(")");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(title_from_row).collect()
    }

    /// Terms are lowercased in Rust on write and the pattern is lowercased the
    /// same way, so non-ASCII names match exactly as in `MediaTitle::matches`.
    async fn search_titles(&self, term: &str) -> anyhow::Result<Vec<MediaTitle>> {
        let rows = sqlx::query(&format!(
            "SELECT {TITLE_COLUMNS} FROM media_titles WHERE media_id IN \
                (SELECT media_id FROM media_title_terms WHERE term LIKE ? ESCAPE '\\') \
             ORDER BY media_id"
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(title_from_row).collect()
    }

    async fn put_title(&self, title: MediaTitle) -> anyhow::Result<()> {
        let terms: Vec<String> = title.search_terms().map(str::to_lowercase).collect();
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO media_titles ({CATALOG_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (media_id) DO UPDATE SET \
                title = excluded.title, title_english = excluded.title_english, \
                title_japanese = excluded.title_japanese, \
                title_synonyms = excluded.title_synonyms, \
                main_picture = excluded.main_picture, media_type = excluded.media_type, \
                premiered_season = excluded.premiered_season, \
                aired_from = excluded.aired_from, published_from = excluded.published_from, \
                synopsis = excluded.synopsis"
        ))
        .bind(&title.media_id)
        .bind(title.title)
        .bind(title.title_english)
        .bind(title.title_japanese)
        .bind(serde_json::to_string(&title.title_synonyms)?)
        .bind(title.main_picture)
        .bind(title.media_type)
        .bind(title.premiered_season)
        .bind(title.aired_from)
        .bind(title.published_from)
        .bind(title.synopsis)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM media_title_terms WHERE media_id = ?")
            .bind(&title.media_id)
            .execute(&mut *tx)
            .await?;
        for term in terms {
            sqlx::query("INSERT INTO media_title_terms (media_id, term) VALUES (?, ?)")
                .bind(&title.media_id)
                .bind(term)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn store_aggregate(
        &self,
        media_id: &str,
        aggregate: MediaAggregate,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO media_titles (media_id, score, scored_by, members, favourites) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (media_id) DO UPDATE SET \
                score = excluded.score, scored_by = excluded.scored_by, \
                members = excluded.members, favourites = excluded.favourites",
        )
        .bind(media_id)
        .bind(aggregate.score)
        .bind(aggregate.scored_by)
        .bind(aggregate.members)
        .bind(aggregate.favourites)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn get_profile(&self, uid: &str) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE uid = ?"
        ))
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(profile_from_row).transpose()?)
    }

    async fn find_profile_by_email(&self, email: &str) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE email_lower = ?"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(profile_from_row).transpose()?)
    }

    async fn put_profile(&self, profile: UserProfile) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT OR REPLACE INTO user_profiles ({PROFILE_COLUMNS}, email_lower) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(profile.uid)
        .bind(&profile.email)
        .bind(profile.username)
        .bind(profile.bio)
        .bind(profile.profile_picture)
        .bind(profile.website_role)
        .bind(profile.created_at)
        .bind(profile.email.to_lowercase())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_bio(&self, uid: &str, bio: &str) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            "UPDATE user_profiles SET bio = ? WHERE uid = ? RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(bio)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(profile_from_row).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:", 1)
            .await
            .expect("Failed to init SQLite")
    }

    fn new_topic(forum_id: ForumId) -> NewTopic {
        NewTopic {
            forum_id,
            title: "Welcome".into(),
            author_uid: "user1".into(),
            content: "Hello all".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ids_allocate_from_one() {
        let repo = store().await;
        for expected in 1..=3 {
            let forum = repo
                .insert_forum(NewForum {
                    name: "Anime Talk".into(),
                    description: "General anime discussion".into(),
                    category: "General".into(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
            assert_eq!(forum.forum_id, expected);
            assert_eq!(forum.topics_count, 0);
        }
    }

    #[tokio::test]
    async fn test_reply_and_counters() {
        let repo = store().await;
        let forum = repo
            .insert_forum(NewForum {
                name: "f".into(),
                description: "d".into(),
                category: "General".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let topic = repo.insert_topic(new_topic(forum.forum_id)).await.unwrap();
        assert!(repo.bump_forum_counters(forum.forum_id, 1, 0).await.unwrap());
        assert!(!repo.bump_forum_counters(404, 1, 0).await.unwrap());

        let at = Utc::now();
        let replied = repo.record_reply(topic.topic_id, at).await.unwrap().unwrap();
        assert_eq!(replied.posts_count, 1);
        assert!(repo.record_reply(999, at).await.unwrap().is_none());

        assert!(repo.increment_views(topic.topic_id).await.unwrap());
        let topics = repo.list_topics_by_forum(forum.forum_id).await.unwrap();
        assert_eq!(topics[0].views, 1);

        let forums = repo.list_forums().await.unwrap();
        assert_eq!(forums[0].topics_count, 1);
    }

    #[tokio::test]
    async fn test_list_order_and_toggle() {
        let repo = store().await;
        repo.toggle_entry("u1", "b").await.unwrap();
        repo.toggle_entry("u1", "a").await.unwrap();
        repo.upsert_entry(
            "u1",
            MediaListEntry {
                media_id: "b".into(),
                score: Some(7.5),
                favourited: true,
            },
        )
        .await
        .unwrap();

        let list = repo.get_list("u1").await.unwrap().unwrap();
        let ids: Vec<_> = list.media.iter().map(|e| e.media_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(list.media[0].score, Some(7.5));

        assert_eq!(repo.toggle_entry("u1", "b").await.unwrap(), ToggleOutcome::Removed);
        assert_eq!(repo.entries_for_media("b").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_catalog_roundtrip_and_search() {
        let repo = store().await;
        let mut title = MediaTitle::bare("m1");
        title.title = Some("Shingeki no Kyojin".into());
        title.title_synonyms = vec!["Attack on Titan".into()];
        repo.put_title(title).await.unwrap();

        repo.store_aggregate(
            "m1",
            MediaAggregate {
                score: 8.0,
                scored_by: 2,
                members: 2,
                favourites: 1,
            },
        )
        .await
        .unwrap();

        let hits = repo.search_titles("titan").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].aggregate.members, 2);
        assert_eq!(hits[0].title_synonyms, vec!["Attack on Titan".to_string()]);
        assert!(repo.search_titles("100%").await.unwrap().is_empty());

        let batch = repo
            .get_titles(&["m1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn test_reseeding_keeps_aggregate() {
        let repo = store().await;
        let agg = MediaAggregate {
            score: 8.0,
            scored_by: 2,
            members: 2,
            favourites: 1,
        };
        repo.store_aggregate("m1", agg).await.unwrap();

        let mut seeded = MediaTitle::bare("m1");
        seeded.title = Some("Mushishi".into());
        repo.put_title(seeded.clone()).await.unwrap();
        repo.put_title(seeded).await.unwrap();

        let title = repo.get_title("m1").await.unwrap().unwrap();
        assert_eq!(title.title.as_deref(), Some("Mushishi"));
        assert_eq!(title.aggregate, agg);
    }

    #[tokio::test]
    async fn test_search_ignores_json_and_folds_unicode() {
        let repo = store().await;
        for (id, name) in [("1", "Cowboy Bebop"), ("2", "École Story")] {
            let mut title = MediaTitle::bare(id);
            title.title = Some(name.into());
            repo.put_title(title).await.unwrap();
        }

        assert!(repo.search_titles("[").await.unwrap().is_empty());
        assert!(repo.search_titles("\"").await.unwrap().is_empty());

        let hits = repo.search_titles("école").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].media_id, "2");
    }

    #[tokio::test]
    async fn test_renamed_title_drops_old_terms() {
        let repo = store().await;
        let mut title = MediaTitle::bare("m1");
        title.title_synonyms = vec!["Old Name".into()];
        repo.put_title(title.clone()).await.unwrap();

        title.title_synonyms = vec!["New Name".into()];
        repo.put_title(title).await.unwrap();

        assert!(repo.search_titles("old").await.unwrap().is_empty());
        assert_eq!(repo.search_titles("new").await.unwrap().len(), 1);
    }
}
