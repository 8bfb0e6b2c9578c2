//! crates/stocktv_core/src/feed.rs
//!
//! The feed service facade: orchestrates the ranker and paginator for one
//! request. Holds no state of its own beyond its configuration and port
//! handles, performs no writes, and re-derives its answer from fresh port
//! snapshots on every call, so concurrent requests need no synchronization.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{FeedConfig, FeedPage};
use crate::paginator::paginate;
use crate::ports::{CatalogService, InteractionService, PortResult};
use crate::ranker::rank;

/// Computes personalized (or anonymous) feed pages on demand.
pub struct FeedService {
    catalog: Arc<dyn CatalogService>,
    interactions: Arc<dyn InteractionService>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        interactions: Arc<dyn InteractionService>,
        config: FeedConfig,
    ) -> Self {
        Self {
            catalog,
            interactions,
            config,
        }
    }

    /// Returns one page of the viewer's feed.
    ///
    /// `user_id = None` selects the anonymous path, which skips the
    /// interaction port entirely. Missing `page`/`limit` fall back to the
    /// configured defaults. Port failures propagate unchanged; the facade
    /// never falls back to stale or partial data, since ranking over a
    /// partial snapshot would silently corrupt bucket assignment.
    pub async fn get_feed(
        &self,
        user_id: Option<Uuid>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> PortResult<FeedPage> {
        let page = page.unwrap_or(self.config.default_page);
        let limit = limit.unwrap_or(self.config.default_page_size);

        let videos = self.catalog.fetch_catalog().await?;

        let ranked = match user_id {
            None => rank(videos, None),
            Some(user_id) => {
                let ctx = self.interactions.fetch_user_context(user_id).await?;
                rank(videos, Some(&ctx))
            }
        };

        paginate(ranked, page, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Follow, Interaction, UserContext, Video};
    use crate::ports::PortError;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn vid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn t(offset_minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(offset_minutes)
    }

    fn video(n: u128, company: u128, created_at: DateTime<Utc>) -> Video {
        Video {
            id: vid(n),
            title: format!("video {}", n),
            company_id: vid(company),
            company_name: format!("company {}", company),
            file_path: format!("/videos/{}.mp4", n),
            created_at,
        }
    }

    /// Catalog = the worked five-video example: v1..v5 in chronological
    /// order, all from company 10 except v5 from company 11.
    fn catalog() -> Vec<Video> {
        vec![
            video(1, 10, t(1)),
            video(2, 10, t(2)),
            video(3, 10, t(3)),
            video(4, 10, t(4)),
            video(5, 11, t(5)),
        ]
    }

    struct FakeCatalog {
        videos: Vec<Video>,
        fail: bool,
    }

    #[async_trait]
    impl CatalogService for FakeCatalog {
        async fn fetch_catalog(&self) -> PortResult<Vec<Video>> {
            if self.fail {
                return Err(PortError::Unavailable("catalog store down".to_string()));
            }
            Ok(self.videos.clone())
        }

        async fn get_video_by_id(&self, video_id: Uuid) -> PortResult<Video> {
            self.videos
                .iter()
                .find(|v| v.id == video_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("video {}", video_id)))
        }
    }

    struct FakeInteractions {
        ctx: UserContext,
        touched: AtomicBool,
    }

    impl FakeInteractions {
        fn empty() -> Self {
            Self {
                ctx: UserContext::default(),
                touched: AtomicBool::new(false),
            }
        }

        fn with_ctx(ctx: UserContext) -> Self {
            Self {
                ctx,
                touched: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl InteractionService for FakeInteractions {
        async fn fetch_user_context(&self, _user_id: Uuid) -> PortResult<UserContext> {
            self.touched.store(true, Ordering::SeqCst);
            Ok(self.ctx.clone())
        }

        async fn record_view(
            &self,
            _user_id: Uuid,
            _video_id: Uuid,
            _watch_percentage: Option<u8>,
        ) -> PortResult<Interaction> {
            unimplemented!("not exercised by the feed path")
        }

        async fn set_liked(
            &self,
            _user_id: Uuid,
            _video_id: Uuid,
            _liked: bool,
        ) -> PortResult<Interaction> {
            unimplemented!("not exercised by the feed path")
        }

        async fn set_saved(
            &self,
            _user_id: Uuid,
            _video_id: Uuid,
            _saved: bool,
        ) -> PortResult<Interaction> {
            unimplemented!("not exercised by the feed path")
        }

        async fn follow_company(&self, _user_id: Uuid, _company_id: Uuid) -> PortResult<Follow> {
            unimplemented!("not exercised by the feed path")
        }

        async fn unfollow_company(&self, _user_id: Uuid, _company_id: Uuid) -> PortResult<()> {
            unimplemented!("not exercised by the feed path")
        }

        async fn followed_companies(&self, _user_id: Uuid) -> PortResult<Vec<Uuid>> {
            unimplemented!("not exercised by the feed path")
        }
    }

    fn service(catalog: FakeCatalog, interactions: FakeInteractions) -> (FeedService, Arc<FakeInteractions>) {
        let interactions = Arc::new(interactions);
        let svc = FeedService::new(
            Arc::new(catalog),
            interactions.clone(),
            FeedConfig {
                default_page: 1,
                default_page_size: 3,
            },
        );
        (svc, interactions)
    }

    fn item_ids(page: &FeedPage) -> Vec<Uuid> {
        page.items.iter().map(|e| e.video.id).collect()
    }

    #[tokio::test]
    async fn anonymous_requests_never_touch_the_interaction_port() {
        let (svc, interactions) = service(
            FakeCatalog {
                videos: catalog(),
                fail: false,
            },
            FakeInteractions::empty(),
        );

        let page = svc.get_feed(None, Some(1), Some(10)).await.unwrap();
        assert_eq!(
            item_ids(&page),
            vec![vid(5), vid(4), vid(3), vid(2), vid(1)]
        );
        assert!(!interactions.touched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn personalized_feed_pages_through_the_worked_example() {
        let ctx = UserContext {
            interactions: vec![
                Interaction {
                    user_id: vid(99),
                    video_id: vid(2),
                    viewed_at: Some(t(100)),
                    liked: true,
                    saved: false,
                    watch_percentage: 80,
                },
                Interaction {
                    user_id: vid(99),
                    video_id: vid(4),
                    viewed_at: Some(t(101)),
                    liked: false,
                    saved: false,
                    watch_percentage: 40,
                },
            ],
            followed_company_ids: vec![vid(10)],
        };
        let (svc, _) = service(
            FakeCatalog {
                videos: catalog(),
                fail: false,
            },
            FakeInteractions::with_ctx(ctx),
        );

        // Full order is [v3, v1, v5, v2, v4]; pages of two.
        let p1 = svc.get_feed(Some(vid(99)), Some(1), Some(2)).await.unwrap();
        assert_eq!(item_ids(&p1), vec![vid(3), vid(1)]);
        assert!(p1.pagination.has_more);

        let p2 = svc.get_feed(Some(vid(99)), Some(2), Some(2)).await.unwrap();
        assert_eq!(item_ids(&p2), vec![vid(5), vid(2)]);
        assert!(p2.pagination.has_more);
        // The liked annotation survives through to the returned entry.
        assert!(p2.items[1].liked);

        let p3 = svc.get_feed(Some(vid(99)), Some(3), Some(2)).await.unwrap();
        assert_eq!(item_ids(&p3), vec![vid(4)]);
        assert!(!p3.pagination.has_more);
        assert_eq!(p3.pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn user_with_no_history_gets_the_anonymous_ordering() {
        let (svc, interactions) = service(
            FakeCatalog {
                videos: catalog(),
                fail: false,
            },
            FakeInteractions::empty(),
        );

        let page = svc.get_feed(Some(vid(7)), Some(1), Some(10)).await.unwrap();
        assert_eq!(
            item_ids(&page),
            vec![vid(5), vid(4), vid(3), vid(2), vid(1)]
        );
        assert!(interactions.touched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn catalog_failure_propagates() {
        let (svc, _) = service(
            FakeCatalog {
                videos: Vec::new(),
                fail: true,
            },
            FakeInteractions::empty(),
        );

        let err = svc.get_feed(None, None, None).await.unwrap_err();
        assert!(matches!(err, PortError::Unavailable(_)));
    }

    #[tokio::test]
    async fn missing_page_and_limit_use_the_configured_defaults() {
        let (svc, _) = service(
            FakeCatalog {
                videos: catalog(),
                fail: false,
            },
            FakeInteractions::empty(),
        );

        let page = svc.get_feed(None, None, None).await.unwrap();
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.limit, 3);
        assert_eq!(page.items.len(), 3);
    }

    #[tokio::test]
    async fn zero_limit_is_rejected_before_slicing() {
        let (svc, _) = service(
            FakeCatalog {
                videos: catalog(),
                fail: false,
            },
            FakeInteractions::empty(),
        );

        let err = svc.get_feed(None, Some(1), Some(0)).await.unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
    }
}
