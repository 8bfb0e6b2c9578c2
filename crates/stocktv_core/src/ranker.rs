//! crates/stocktv_core/src/ranker.rs
//!
//! The feed ranking algorithm: classifies and orders the whole catalog for one
//! viewer into a single deterministic sequence.
//!
//! Algorithm:
//! 1. Unwatched videos from FOLLOWED companies (created_at DESC - newest first)
//! 2. Unwatched videos from OTHER companies (created_at DESC - newest first)
//! 3. Watched videos (viewed_at ASC - the video seen longest ago resurfaces
//!    first, while still ranking behind all unwatched content)
//!
//! Ties everywhere break by video id ascending, so repeated runs over the same
//! snapshot always agree. That determinism is what makes stateless per-page
//! recomputation safe (see the paginator).

use std::collections::{HashMap, HashSet};

use crate::domain::{Bucket, FeedEntry, UserContext, Video};

/// Ranks the full catalog for one viewer.
///
/// A `None` context selects the anonymous path: pure recency, newest first.
/// The output always contains every input video exactly once; the ranker
/// never drops or duplicates items.
///
/// This is a pure function of its arguments. It performs no I/O, reads no
/// clock, and holds no state between calls.
pub fn rank(videos: Vec<Video>, ctx: Option<&UserContext>) -> Vec<FeedEntry> {
    let ctx = match ctx {
        Some(ctx) => ctx,
        None => return rank_anonymous(videos),
    };

    let followed: HashSet<_> = ctx.followed_company_ids.iter().copied().collect();
    let interactions: HashMap<_, _> = ctx
        .interactions
        .iter()
        .map(|i| (i.video_id, i))
        .collect();

    let mut unwatched_followed = Vec::new();
    let mut unwatched_other = Vec::new();
    let mut watched = Vec::new();

    for video in videos {
        let interaction = interactions.get(&video.id);
        let viewed_at = interaction.and_then(|i| i.viewed_at);
        let entry = FeedEntry {
            bucket: classify(viewed_at.is_some(), followed.contains(&video.company_id)),
            viewed_at,
            liked: interaction.map(|i| i.liked).unwrap_or(false),
            saved: interaction.map(|i| i.saved).unwrap_or(false),
            video,
        };
        match entry.bucket {
            Bucket::UnwatchedFollowed => unwatched_followed.push(entry),
            Bucket::UnwatchedOther => unwatched_other.push(entry),
            Bucket::Watched => watched.push(entry),
        }
    }

    // Newest unseen content first within both unwatched tiers.
    unwatched_followed.sort_by(newest_first);
    unwatched_other.sort_by(newest_first);

    // Oldest view first: stale watched content resurfaces at the front of the
    // watched tier instead of being buried forever.
    watched.sort_by(|a, b| {
        a.viewed_at
            .cmp(&b.viewed_at)
            .then_with(|| a.video.id.cmp(&b.video.id))
    });

    let mut feed = unwatched_followed;
    feed.append(&mut unwatched_other);
    feed.append(&mut watched);
    feed
}

/// The anonymous path: strict recency, ties by id, no personalization.
fn rank_anonymous(videos: Vec<Video>) -> Vec<FeedEntry> {
    let mut feed: Vec<FeedEntry> = videos
        .into_iter()
        .map(|video| FeedEntry {
            bucket: Bucket::UnwatchedOther,
            viewed_at: None,
            liked: false,
            saved: false,
            video,
        })
        .collect();
    feed.sort_by(newest_first);
    feed
}

fn classify(watched: bool, followed: bool) -> Bucket {
    match (watched, followed) {
        // Follow status is irrelevant once a video has been seen.
        (true, _) => Bucket::Watched,
        (false, true) => Bucket::UnwatchedFollowed,
        (false, false) => Bucket::UnwatchedOther,
    }
}

fn newest_first(a: &FeedEntry, b: &FeedEntry) -> std::cmp::Ordering {
    b.video
        .created_at
        .cmp(&a.video.created_at)
        .then_with(|| a.video.id.cmp(&b.video.id))
}
