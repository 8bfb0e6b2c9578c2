//! crates/stocktv_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a single video in the catalog.
///
/// Videos are created by the upload collaborator and are never mutated or
/// deleted by the feed engine. `created_at` is immutable once assigned.
#[derive(Debug, Clone)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub company_id: Uuid,
    pub company_name: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

/// The relationship between exactly one (user, video) pair.
///
/// At most one record exists per pair; this is the reconciliation key the
/// ranker relies on. `viewed_at` is set on first recorded view and never
/// cleared. `watch_percentage` is stored for display and analytics only.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub viewed_at: Option<DateTime<Utc>>,
    pub liked: bool,
    pub saved: bool,
    pub watch_percentage: u8,
}

/// A (user, company) follow relationship. Absence means "not following";
/// unfollowing removes the record outright rather than flagging it.
#[derive(Debug, Clone)]
pub struct Follow {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub followed_at: DateTime<Utc>,
}

/// Everything the ranker needs to know about one viewer, fetched as a single
/// point-in-time snapshot. A user with no history gets empty collections.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub interactions: Vec<Interaction>,
    pub followed_company_ids: Vec<Uuid>,
}

/// The priority class a video falls into for one viewer.
///
/// The variant order is the feed order: all unwatched content from followed
/// companies, then remaining unwatched content, then everything already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    UnwatchedFollowed,
    UnwatchedOther,
    Watched,
}

/// A video annotated with its per-viewer classification, derived at read time.
///
/// Exists only for the duration of a single ranking computation; the bucket
/// tag stays inside the core and is never exposed to callers of the facade.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub video: Video,
    pub bucket: Bucket,
    pub viewed_at: Option<DateTime<Utc>>,
    pub liked: bool,
    pub saved: bool,
}

/// Continuation metadata for one page of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: u32,
    pub has_more: bool,
}

/// One page of ranked feed entries plus its pagination metadata.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub items: Vec<FeedEntry>,
    pub pagination: Pagination,
}

/// Per-instance feed configuration, passed into the facade at construction
/// time so the core stays testable without process-wide state.
#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    pub default_page: u32,
    pub default_page_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        // Small page size suited to a swipe-per-video UI.
        Self {
            default_page: 1,
            default_page_size: 3,
        }
    }
}
