//! media-board/crates/mb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for media-board.

pub mod catalog;
pub mod error;
pub mod forum;
pub mod media_list;
pub mod models;
pub mod profile;
pub mod traits;

// Re-exporting for easier access in other crates
pub use catalog::CatalogService;
pub use error::*;
pub use forum::{ForumService, ADMINISTRATOR_ROLE};
pub use media_list::MediaListService;
pub use models::*;
pub use profile::ProfileService;
pub use traits::*;
