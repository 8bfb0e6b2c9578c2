//! crates/stocktv_core/src/paginator.rs
//!
//! Slices a ranked sequence into fixed-size pages.
//!
//! There is no server-side cursor: every page request re-ranks from a fresh
//! snapshot, and pages stay mutually consistent only because the ranker is
//! deterministic for unchanged input. If the user's interactions change
//! mid-scroll a video may shift buckets and show up twice or be skipped; that
//! anomaly is bounded and self-correcting on the next full reload, so it is
//! accepted rather than treated as an error.

use crate::domain::{FeedEntry, FeedPage, Pagination};
use crate::ports::{PortError, PortResult};

/// Returns the requested page of `entries` plus continuation metadata.
///
/// `page` is 1-indexed; values below 1 are clamped to 1. A `limit` of zero is
/// an input error. A page past the end yields empty items with
/// `has_more = false`, never an error.
pub fn paginate(entries: Vec<FeedEntry>, page: u32, limit: u32) -> PortResult<FeedPage> {
    if limit == 0 {
        return Err(PortError::InvalidInput(
            "limit must be a positive integer".to_string(),
        ));
    }
    let page = page.max(1);

    let total = entries.len();
    let total_pages = (total as u64).div_ceil(limit as u64) as u32;
    let has_more = page < total_pages;

    let start = (page as usize - 1).saturating_mul(limit as usize);
    let items: Vec<FeedEntry> = entries
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    Ok(FeedPage {
        items,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages,
            has_more,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bucket, Video};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn entries(n: usize) -> Vec<FeedEntry> {
        (0..n)
            .map(|i| FeedEntry {
                video: Video {
                    id: Uuid::from_u128(i as u128),
                    title: format!("video {}", i),
                    company_id: Uuid::from_u128(1000),
                    company_name: "acme".to_string(),
                    file_path: format!("/videos/{}.mp4", i),
                    created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                },
                bucket: Bucket::UnwatchedOther,
                viewed_at: None,
                liked: false,
                saved: false,
            })
            .collect()
    }

    #[test]
    fn slices_pages_with_metadata() {
        let page = paginate(entries(5), 1, 2).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(
            page.pagination,
            Pagination {
                page: 1,
                limit: 2,
                total: 5,
                total_pages: 3,
                has_more: true,
            }
        );

        let last = paginate(entries(5), 3, 2).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.pagination.has_more);
    }

    #[test]
    fn concatenated_pages_reproduce_the_sequence() {
        let all = entries(7);
        let expected: Vec<Uuid> = all.iter().map(|e| e.video.id).collect();

        let mut collected = Vec::new();
        let mut page = 1;
        loop {
            let result = paginate(all.clone(), page, 3).unwrap();
            collected.extend(result.items.iter().map(|e| e.video.id));
            if !result.pagination.has_more {
                break;
            }
            page += 1;
        }
        assert_eq!(collected, expected);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let page = paginate(entries(3), 9, 2).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.pagination.has_more);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[test]
    fn page_zero_clamps_to_one() {
        let page = paginate(entries(4), 0, 2).unwrap();
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.items[0].video.id, Uuid::from_u128(0));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = paginate(entries(4), 1, 0).unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
    }

    #[test]
    fn empty_input_yields_an_empty_single_page_universe() {
        let page = paginate(Vec::new(), 1, 5).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_more);
    }
}
