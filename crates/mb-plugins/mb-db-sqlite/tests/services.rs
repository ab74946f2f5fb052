//! The core services driven over a real SQLite store.

use std::sync::Arc;

use mb_auth_simple::SimpleIdentityProvider;
use mb_core::{
    AppError, CatalogService, ForumService, MediaCatalogRepo, MediaListService, MediaTitle,
    MediaTitleSummary, ProfileService, Propagation, ADMINISTRATOR_ROLE,
};
use mb_db_memory::MemoryStore;
use mb_db_sqlite::SqliteStore;
use secrecy::SecretString;

async fn store() -> Arc<SqliteStore> {
    Arc::new(
        SqliteStore::new("sqlite::memory:", 1)
            .await
            .expect("Failed to init SQLite"),
    )
}

fn identity() -> Arc<SimpleIdentityProvider> {
    Arc::new(SimpleIdentityProvider::new(SecretString::from(
        "test-pepper".to_string(),
    )))
}

fn titles() -> Vec<MediaTitle> {
    let mut bebop = MediaTitle::bare("1");
    bebop.title = Some("Cowboy Bebop".into());
    bebop.title_japanese = Some("カウボーイビバップ".into());

    let mut ecole = MediaTitle::bare("2");
    ecole.title = Some("École Story".into());
    ecole.title_synonyms = vec!["The School".into(), "Gakkou".into()];

    let mut aot = MediaTitle::bare("3");
    aot.title = Some("Shingeki no Kyojin".into());
    aot.title_english = Some("Attack on Titan".into());

    vec![bebop, ecole, aot]
}

#[tokio::test]
async fn forum_topic_post_counters_propagate() {
    let db = store().await;
    let forums = ForumService::new(db.clone(), db.clone());

    let forum = forums
        .create_forum("Anime Talk", "General anime discussion", ADMINISTRATOR_ROLE, None)
        .await
        .unwrap();
    assert_eq!(forum.forum_id, 1);
    assert_eq!((forum.topics_count, forum.posts_count), (0, 0));

    let topic = forums
        .create_topic(1, "Welcome", "user1", "Hello all")
        .await
        .unwrap();
    assert_eq!(topic.record.topic_id, 1);
    assert_eq!(topic.propagation, Propagation::Complete);

    let post = forums.create_post(1, "user2", "Hi there!").await.unwrap();
    assert_eq!(post.record.post_id, 1);
    assert_eq!(post.propagation, Propagation::Complete);

    let forum = &forums.list_forums().await.unwrap()[0];
    assert_eq!((forum.topics_count, forum.posts_count), (1, 1));

    let posts = forums.list_posts(1).await.unwrap();
    assert_eq!(posts[0].author_display_name, "user2");
    let topics = forums.list_topics(1).await.unwrap();
    assert_eq!(topics[0].record.posts_count, 1);
    assert_eq!(topics[0].record.views, 1);
}

#[tokio::test]
async fn two_users_scores_average_into_the_catalog() {
    let db = store().await;
    let lists = MediaListService::new(db.clone(), db.clone());

    lists.update_entry("u1", "m1", Some(10.0), None).await.unwrap();
    lists.update_entry("u2", "m1", Some(6.0), None).await.unwrap();

    let title = db.get_title("m1").await.unwrap().unwrap();
    assert_eq!(title.aggregate.score, 8.0);
    assert_eq!(title.aggregate.scored_by, 2);
    assert_eq!(title.aggregate.members, 2);
    assert_eq!(title.aggregate.favourites, 0);

    assert!(!lists.toggle_membership("u1", "m1").await.unwrap());
    assert!(!lists.toggle_membership("u2", "m1").await.unwrap());
    let title = db.get_title("m1").await.unwrap().unwrap();
    assert_eq!(title.aggregate.members, 0);
    assert_eq!(title.aggregate.score, 0.0);
}

#[tokio::test]
async fn concurrent_updates_leave_a_consistent_aggregate() {
    let db = store().await;
    let lists = Arc::new(MediaListService::new(db.clone(), db.clone()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let lists = lists.clone();
            tokio::spawn(async move {
                lists
                    .update_entry(&format!("u{i}"), "m1", Some(f64::from(i % 5)), Some(i % 2 == 0))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let title = db.get_title("m1").await.unwrap().unwrap();
    let expected = (0..16).map(|i| f64::from(i % 5)).sum::<f64>() / 16.0;
    assert_eq!(title.aggregate.members, 16);
    assert_eq!(title.aggregate.scored_by, 16);
    assert_eq!(title.aggregate.favourites, 8);
    assert!((title.aggregate.score - expected).abs() < 1e-9);
}

#[tokio::test]
async fn reseeding_the_catalog_keeps_aggregates() {
    let db = store().await;
    let catalog = CatalogService::new(db.clone());
    let lists = MediaListService::new(db.clone(), db.clone());

    catalog.import(titles()).await.unwrap();
    lists.update_entry("u1", "1", Some(10.0), Some(true)).await.unwrap();
    lists.update_entry("u2", "1", Some(6.0), None).await.unwrap();

    catalog.import(titles()).await.unwrap();

    let title = catalog.details("1").await.unwrap();
    assert_eq!(title.title.as_deref(), Some("Cowboy Bebop"));
    assert_eq!(title.aggregate.score, 8.0);
    assert_eq!(title.aggregate.members, 2);
    assert_eq!(title.aggregate.favourites, 1);
}

#[tokio::test]
async fn search_agrees_with_the_memory_store() {
    let db = store().await;
    let sqlite = CatalogService::new(db);
    let memory = CatalogService::new(Arc::new(MemoryStore::new()));
    sqlite.import(titles()).await.unwrap();
    memory.import(titles()).await.unwrap();

    for term in ["bebop", "BEBOP", "école", "ÉCOLE", "school", "titan", "ビバップ", "o", "[", "\"", "%", "zzz"] {
        let ids = |hits: Result<Vec<MediaTitleSummary>, AppError>| match hits {
            Ok(hits) => hits.into_iter().map(|h| h.media_id).collect::<Vec<_>>(),
            Err(AppError::NotFound(..)) => Vec::new(),
            Err(e) => panic!("search {term:?} failed: {e}"),
        };
        assert_eq!(
            ids(sqlite.search(term).await),
            ids(memory.search(term).await),
            "search {term:?}"
        );
    }

    assert!(matches!(sqlite.search("[").await, Err(AppError::NotFound(..))));
    assert_eq!(sqlite.search("école").await.unwrap().len(), 1);
}

#[tokio::test]
async fn registration_conflicts_survive_an_identity_restart() {
    let db = store().await;

    let first = ProfileService::new(identity(), db.clone());
    first
        .register("mio@example.com", "hunter22", "Mio")
        .await
        .unwrap();

    // A fresh provider has no memory of earlier accounts; the profile store does.
    let restarted = ProfileService::new(identity(), db.clone());
    let err = restarted
        .register("MIO@example.com", "other-pass", "Mio2")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
