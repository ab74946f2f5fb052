//! # mb-api
//!
//! The web routing and orchestration layer for media-board.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use mb_core::{
    CatalogService, ForumRepo, ForumService, IdentityProvider, MediaCatalogRepo, MediaListRepo,
    MediaListService, ProfileService, ProfileStore,
};

pub use error::ApiError;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub forums: Arc<ForumService>,
    pub media_lists: Arc<MediaListService>,
    pub catalog: Arc<CatalogService>,
    pub profiles: Arc<ProfileService>,
}

impl AppState {
    /// Wires the services over the given ports.
    pub fn new(
        forums: Arc<dyn ForumRepo>,
        lists: Arc<dyn MediaListRepo>,
        catalog: Arc<dyn MediaCatalogRepo>,
        profiles: Arc<dyn ProfileStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            forums: Arc::new(ForumService::new(forums, profiles.clone())),
            media_lists: Arc::new(MediaListService::new(lists, catalog.clone())),
            catalog: Arc::new(CatalogService::new(catalog)),
            profiles: Arc::new(ProfileService::new(identity, profiles)),
        }
    }
}

/// Every media-board route, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Forums
        .route("/forums", get(handlers::forums::list_forums))
        .route("/forums/", get(handlers::forums::list_forums))
        .route("/forums/create", post(handlers::forums::create_forum))
        // Topics
        .route("/topics/create", post(handlers::topics::create_topic))
        .route("/topics/{forum_id}", get(handlers::topics::list_topics))
        // Posts
        .route("/posts/create", post(handlers::posts::create_post))
        .route("/posts/{topic_id}", get(handlers::posts::list_posts))
        // Media lists
        .route("/medialist/toggle", post(handlers::media_lists::toggle))
        .route("/medialist/entry", get(handlers::media_lists::get_entry))
        .route("/medialist/update", post(handlers::media_lists::update_entry))
        .route("/medialist/user-list", get(handlers::media_lists::user_list))
        // Catalog
        .route("/media/search/{term}", get(handlers::media::search))
        .route("/media/details/{id}", get(handlers::media::details))
        // Users
        .route(
            "/users/{uid}",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route("/auth/register", post(handlers::auth::register))
        .with_state(state)
}

/// The router wrapped in request tracing and the CORS policy.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    router(state)
        .layer(middleware::cors_policy(allowed_origins))
        .layer(middleware::standard_middleware())
}
