//! crates/stocktv_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Follow, Interaction, UserContext, Video};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read access to the full video catalog.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Returns every known video, unfiltered. Filtering of hidden or deleted
    /// content, if any, happens upstream of this port.
    async fn fetch_catalog(&self) -> PortResult<Vec<Video>>;

    async fn get_video_by_id(&self, video_id: Uuid) -> PortResult<Video>;
}

/// Read and write access to per-user interaction and follow state.
#[async_trait]
pub trait InteractionService: Send + Sync {
    /// Returns the viewer's interaction and follow snapshot. Must return empty
    /// collections, not an error, for a user with no history.
    async fn fetch_user_context(&self, user_id: Uuid) -> PortResult<UserContext>;

    // --- Write operations, invoked outside the feed path ---

    /// Records a view. Sets `viewed_at` on the first view and leaves it
    /// untouched thereafter; `watch_percentage`, if given, replaces the stored
    /// value.
    async fn record_view(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        watch_percentage: Option<u8>,
    ) -> PortResult<Interaction>;

    async fn set_liked(&self, user_id: Uuid, video_id: Uuid, liked: bool)
        -> PortResult<Interaction>;

    async fn set_saved(&self, user_id: Uuid, video_id: Uuid, saved: bool)
        -> PortResult<Interaction>;

    async fn follow_company(&self, user_id: Uuid, company_id: Uuid) -> PortResult<Follow>;

    /// Removes the follow record outright. Unfollowing a company that was
    /// never followed is a no-op, not an error.
    async fn unfollow_company(&self, user_id: Uuid, company_id: Uuid) -> PortResult<()>;

    async fn followed_companies(&self, user_id: Uuid) -> PortResult<Vec<Uuid>>;
}
