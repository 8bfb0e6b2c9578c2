pub mod domain;
pub mod feed;
pub mod paginator;
pub mod ports;
pub mod ranker;

pub use domain::{
    Bucket, FeedConfig, FeedEntry, FeedPage, Follow, Interaction, Pagination, UserContext, Video,
};
pub use feed::FeedService;
pub use paginator::paginate;
pub use ports::{CatalogService, InteractionService, PortError, PortResult};
pub use ranker::rank;
