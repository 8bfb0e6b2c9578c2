//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use stocktv_core::feed::FeedService;
use stocktv_core::ports::{CatalogService, InteractionService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogService>,
    pub interactions: Arc<dyn InteractionService>,
    pub feed: Arc<FeedService>,
    pub config: Arc<Config>,
}
