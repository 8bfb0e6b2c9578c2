//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CatalogService` and `InteractionService` ports from the `core` crate.
//! It handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use stocktv_core::domain::{Follow, Interaction, UserContext, Video};
use stocktv_core::ports::{CatalogService, InteractionService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the catalog and interaction ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a database error onto the port error taxonomy. Connection-level
/// failures are retryable collaborator unavailability; everything else is
/// unexpected.
fn map_sqlx_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound("row not found".to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            PortError::Unavailable(e.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct VideoRecord {
    id: Uuid,
    title: String,
    company_id: Uuid,
    company_name: String,
    file_path: String,
    created_at: DateTime<Utc>,
}
impl VideoRecord {
    fn to_domain(self) -> Video {
        Video {
            id: self.id,
            title: self.title,
            company_id: self.company_id,
            company_name: self.company_name,
            file_path: self.file_path,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct InteractionRecord {
    user_id: Uuid,
    video_id: Uuid,
    viewed_at: Option<DateTime<Utc>>,
    liked: bool,
    saved: bool,
    watch_percentage: i32,
}
impl InteractionRecord {
    fn to_domain(self) -> Interaction {
        Interaction {
            user_id: self.user_id,
            video_id: self.video_id,
            viewed_at: self.viewed_at,
            liked: self.liked,
            saved: self.saved,
            watch_percentage: self.watch_percentage.clamp(0, 100) as u8,
        }
    }
}

#[derive(FromRow)]
struct FollowRecord {
    user_id: Uuid,
    company_id: Uuid,
    followed_at: DateTime<Utc>,
}
impl FollowRecord {
    fn to_domain(self) -> Follow {
        Follow {
            user_id: self.user_id,
            company_id: self.company_id,
            followed_at: self.followed_at,
        }
    }
}

//=========================================================================================
// `CatalogService` Trait Implementation
//=========================================================================================

const VIDEO_COLUMNS: &str = "v.id, v.title, v.company_id, c.name AS company_name, \
                             v.file_path, v.created_at";

#[async_trait]
impl CatalogService for DbAdapter {
    async fn fetch_catalog(&self) -> PortResult<Vec<Video>> {
        let records = sqlx::query_as::<_, VideoRecord>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos v JOIN companies c ON c.id = v.company_id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(records.into_iter().map(VideoRecord::to_domain).collect())
    }

    async fn get_video_by_id(&self, video_id: Uuid) -> PortResult<Video> {
        let record = sqlx::query_as::<_, VideoRecord>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos v JOIN companies c ON c.id = v.company_id \
             WHERE v.id = $1"
        ))
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| PortError::NotFound(format!("Video {} not found", video_id)))?;

        Ok(record.to_domain())
    }
}

//=========================================================================================
// `InteractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InteractionService for DbAdapter {
    async fn fetch_user_context(&self, user_id: Uuid) -> PortResult<UserContext> {
        let interactions = sqlx::query_as::<_, InteractionRecord>(
            "SELECT user_id, video_id, viewed_at, liked, saved, watch_percentage \
             FROM user_video_interactions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let followed_company_ids = self.followed_companies(user_id).await?;

        Ok(UserContext {
            interactions: interactions
                .into_iter()
                .map(InteractionRecord::to_domain)
                .collect(),
            followed_company_ids,
        })
    }

    async fn record_view(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        watch_percentage: Option<u8>,
    ) -> PortResult<Interaction> {
        // The first view stamps viewed_at; later views must never clear or
        // advance it, only the watch progress.
        let record = sqlx::query_as::<_, InteractionRecord>(
            "INSERT INTO user_video_interactions \
                 (user_id, video_id, viewed_at, watch_percentage) \
             VALUES ($1, $2, now(), COALESCE($3, 0)) \
             ON CONFLICT (user_id, video_id) DO UPDATE SET \
                 viewed_at = COALESCE(user_video_interactions.viewed_at, now()), \
                 watch_percentage = \
                     COALESCE($3, user_video_interactions.watch_percentage) \
             RETURNING user_id, video_id, viewed_at, liked, saved, watch_percentage",
        )
        .bind(user_id)
        .bind(video_id)
        .bind(watch_percentage.map(|p| i32::from(p.min(100))))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(record.to_domain())
    }

    async fn set_liked(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        liked: bool,
    ) -> PortResult<Interaction> {
        // Liking without a prior view creates the row with a null viewed_at,
        // so the video still ranks as unwatched.
        let record = sqlx::query_as::<_, InteractionRecord>(
            "INSERT INTO user_video_interactions (user_id, video_id, liked) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, video_id) DO UPDATE SET liked = $3 \
             RETURNING user_id, video_id, viewed_at, liked, saved, watch_percentage",
        )
        .bind(user_id)
        .bind(video_id)
        .bind(liked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(record.to_domain())
    }

    async fn set_saved(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        saved: bool,
    ) -> PortResult<Interaction> {
        let record = sqlx::query_as::<_, InteractionRecord>(
            "INSERT INTO user_video_interactions (user_id, video_id, saved) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, video_id) DO UPDATE SET saved = $3 \
             RETURNING user_id, video_id, viewed_at, liked, saved, watch_percentage",
        )
        .bind(user_id)
        .bind(video_id)
        .bind(saved)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(record.to_domain())
    }

    async fn follow_company(&self, user_id: Uuid, company_id: Uuid) -> PortResult<Follow> {
        // Re-following keeps the original followed_at.
        let record = sqlx::query_as::<_, FollowRecord>(
            "INSERT INTO user_company_follows (user_id, company_id) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id, company_id) DO UPDATE SET \
                 followed_at = user_company_follows.followed_at \
             RETURNING user_id, company_id, followed_at",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint().is_some() => {
                PortError::NotFound(format!("Company {} not found", company_id))
            }
            _ => map_sqlx_error(e),
        })?;

        Ok(record.to_domain())
    }

    async fn unfollow_company(&self, user_id: Uuid, company_id: Uuid) -> PortResult<()> {
        sqlx::query(
            "DELETE FROM user_company_follows WHERE user_id = $1 AND company_id = $2",
        )
        .bind(user_id)
        .bind(company_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn followed_companies(&self, user_id: Uuid) -> PortResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT company_id FROM user_company_follows WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|(company_id,)| company_id).collect())
    }
}
