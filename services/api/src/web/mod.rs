pub mod rest;
pub mod state;

// Re-export the handlers so the binary that builds the router can reach them
// without digging through the module tree.
pub use rest::{
    follow_company_handler, get_feed_handler, get_video_handler, like_video_handler,
    list_following_handler, list_videos_handler, record_view_handler, save_video_handler,
    unfollow_company_handler, unlike_video_handler, unsave_video_handler,
};
