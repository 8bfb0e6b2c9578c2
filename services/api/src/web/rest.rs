//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stocktv_core::domain::{FeedEntry, FeedPage, Interaction, Video};
use stocktv_core::ports::PortError;
use stocktv_core::ranker::rank;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_feed_handler,
        list_videos_handler,
        get_video_handler,
        record_view_handler,
        like_video_handler,
        unlike_video_handler,
        save_video_handler,
        unsave_video_handler,
        follow_company_handler,
        unfollow_company_handler,
        list_following_handler,
    ),
    components(
        schemas(
            FeedResponse,
            FeedItemResponse,
            PaginationResponse,
            VideoResponse,
            InteractionResponse,
            FollowResponse,
            FollowingResponse,
            RecordViewRequest,
        )
    ),
    tags(
        (name = "StockTV API", description = "API endpoints for the swipeable company-video feed.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A single video as returned by the catalog endpoints.
#[derive(Serialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub company_id: Uuid,
    pub company_name: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            title: video.title,
            company_id: video.company_id,
            company_name: video.company_name,
            file_path: video.file_path,
            created_at: video.created_at,
        }
    }
}

/// One ranked feed item: the video plus the viewer's display annotations.
/// Bucket labels and raw ordering keys stay internal.
#[derive(Serialize, ToSchema)]
pub struct FeedItemResponse {
    #[serde(flatten)]
    pub video: VideoResponse,
    pub liked: bool,
    pub saved: bool,
}

impl From<FeedEntry> for FeedItemResponse {
    fn from(entry: FeedEntry) -> Self {
        Self {
            video: entry.video.into(),
            liked: entry.liked,
            saved: entry.saved,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginationResponse {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: u32,
    pub has_more: bool,
}

/// The response payload for a feed page request.
#[derive(Serialize, ToSchema)]
pub struct FeedResponse {
    pub items: Vec<FeedItemResponse>,
    pub pagination: PaginationResponse,
}

impl From<FeedPage> for FeedResponse {
    fn from(page: FeedPage) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            pagination: PaginationResponse {
                page: page.pagination.page,
                limit: page.pagination.limit,
                total: page.pagination.total,
                total_pages: page.pagination.total_pages,
                has_more: page.pagination.has_more,
            },
        }
    }
}

/// The stored interaction state for one (user, video) pair.
#[derive(Serialize, ToSchema)]
pub struct InteractionResponse {
    pub video_id: Uuid,
    pub viewed_at: Option<DateTime<Utc>>,
    pub liked: bool,
    pub saved: bool,
    pub watch_percentage: u8,
}

impl From<Interaction> for InteractionResponse {
    fn from(interaction: Interaction) -> Self {
        Self {
            video_id: interaction.video_id,
            viewed_at: interaction.viewed_at,
            liked: interaction.liked,
            saved: interaction.saved,
            watch_percentage: interaction.watch_percentage,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FollowResponse {
    pub company_id: Uuid,
    pub followed_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct FollowingResponse {
    pub companies: Vec<Uuid>,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordViewRequest {
    /// Watch progress in percent, clamped to 0-100. Stored for display and
    /// analytics; the feed ranking never consults it.
    pub watch_percentage: Option<u8>,
}

#[derive(Deserialize, IntoParams)]
pub struct FeedQuery {
    /// 1-indexed page number. Defaults to the configured first page.
    pub page: Option<u32>,
    /// Videos per page. Must be positive; defaults to the configured page size.
    pub limit: Option<u32>,
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// Reads the optional viewer identity from the `x-user-id` header.
/// A malformed header is a client error rather than a silent anonymous fallback.
fn optional_user_id(headers: &HeaderMap) -> Result<Option<Uuid>, (StatusCode, String)> {
    match headers.get("x-user-id").map(|v| v.to_str().ok()) {
        None => Ok(None),
        Some(None) => Err((
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id header".to_string(),
        )),
        Some(Some(raw)) => Uuid::parse_str(raw).map(Some).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                "Invalid x-user-id format".to_string(),
            )
        }),
    }
}

/// Reads the mandatory acting-user identity for write endpoints.
fn require_user_id(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    optional_user_id(headers)?.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "x-user-id header is required".to_string(),
        )
    })
}

/// Maps a port failure onto an HTTP status, logging the detail server-side.
/// A ranking or pagination failure surfaces as "feed unavailable"; partially
/// ordered results are never returned.
fn port_error_response(context: &str, e: PortError) -> (StatusCode, String) {
    error!("{}: {:?}", context, e);
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{} temporarily unavailable", context),
        ),
        PortError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{} failed", context),
        ),
    }
}

//=========================================================================================
// Feed Handlers
//=========================================================================================

/// Get the personalized video feed.
///
/// Without an `x-user-id` header the feed is anonymous: pure recency, newest
/// first. With one, unseen content from followed companies leads, then other
/// unseen content, then previously watched videos (oldest view first).
#[utoipa::path(
    get,
    path = "/feed",
    params(
        FeedQuery,
        ("x-user-id" = Option<Uuid>, Header, description = "Optional viewer identity for personalization.")
    ),
    responses(
        (status = 200, description = "One page of the ranked feed", body = FeedResponse),
        (status = 400, description = "Bad request (e.g., non-positive limit)"),
        (status = 503, description = "A backing store is unavailable")
    )
)]
pub async fn get_feed_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = optional_user_id(&headers)?;

    let page = app_state
        .feed
        .get_feed(user_id, query.page, query.limit)
        .await
        .map_err(|e| port_error_response("feed", e))?;

    Ok(Json(FeedResponse::from(page)))
}

//=========================================================================================
// Catalog Handlers
//=========================================================================================

/// List the full video catalog, newest first.
#[utoipa::path(
    get,
    path = "/videos",
    responses(
        (status = 200, description = "All known videos", body = [VideoResponse]),
        (status = 503, description = "The catalog store is unavailable")
    )
)]
pub async fn list_videos_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let videos = app_state
        .catalog
        .fetch_catalog()
        .await
        .map_err(|e| port_error_response("catalog", e))?;

    let response: Vec<VideoResponse> = rank(videos, None)
        .into_iter()
        .map(|entry| entry.video.into())
        .collect();
    Ok(Json(response))
}

/// Get a single video by ID.
#[utoipa::path(
    get,
    path = "/videos/{id}",
    params(("id" = Uuid, Path, description = "The video ID.")),
    responses(
        (status = 200, description = "The requested video", body = VideoResponse),
        (status = 404, description = "No such video")
    )
)]
pub async fn get_video_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let video = app_state
        .catalog
        .get_video_by_id(id)
        .await
        .map_err(|e| port_error_response("catalog", e))?;

    Ok(Json(VideoResponse::from(video)))
}

//=========================================================================================
// Interaction Handlers
//=========================================================================================

/// Record that the acting user viewed a video.
///
/// The first view stamps `viewed_at`; repeat views only update the stored
/// watch progress. Recording a view is independent of the feed computation.
#[utoipa::path(
    post,
    path = "/videos/{id}/views",
    params(
        ("id" = Uuid, Path, description = "The video ID."),
        ("x-user-id" = Uuid, Header, description = "The acting user.")
    ),
    request_body(content = RecordViewRequest, description = "Optional watch progress."),
    responses(
        (status = 200, description = "The updated interaction", body = InteractionResponse),
        (status = 400, description = "Missing or malformed x-user-id header")
    )
)]
pub async fn record_view_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Option<Json<RecordViewRequest>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = require_user_id(&headers)?;
    let watch_percentage = body.and_then(|Json(req)| req.watch_percentage);

    let interaction = app_state
        .interactions
        .record_view(user_id, id, watch_percentage)
        .await
        .map_err(|e| port_error_response("interaction store", e))?;

    Ok(Json(InteractionResponse::from(interaction)))
}

/// Like a video.
#[utoipa::path(
    post,
    path = "/videos/{id}/like",
    params(
        ("id" = Uuid, Path, description = "The video ID."),
        ("x-user-id" = Uuid, Header, description = "The acting user.")
    ),
    responses(
        (status = 200, description = "The updated interaction", body = InteractionResponse),
        (status = 400, description = "Missing or malformed x-user-id header")
    )
)]
pub async fn like_video_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    set_liked(app_state, id, &headers, true).await
}

/// Remove a like from a video.
#[utoipa::path(
    delete,
    path = "/videos/{id}/like",
    params(
        ("id" = Uuid, Path, description = "The video ID."),
        ("x-user-id" = Uuid, Header, description = "The acting user.")
    ),
    responses(
        (status = 200, description = "The updated interaction", body = InteractionResponse),
        (status = 400, description = "Missing or malformed x-user-id header")
    )
)]
pub async fn unlike_video_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    set_liked(app_state, id, &headers, false).await
}

async fn set_liked(
    app_state: Arc<AppState>,
    video_id: Uuid,
    headers: &HeaderMap,
    liked: bool,
) -> Result<Json<InteractionResponse>, (StatusCode, String)> {
    let user_id = require_user_id(headers)?;

    let interaction = app_state
        .interactions
        .set_liked(user_id, video_id, liked)
        .await
        .map_err(|e| port_error_response("interaction store", e))?;

    Ok(Json(InteractionResponse::from(interaction)))
}

/// Save a video for later.
#[utoipa::path(
    post,
    path = "/videos/{id}/save",
    params(
        ("id" = Uuid, Path, description = "The video ID."),
        ("x-user-id" = Uuid, Header, description = "The acting user.")
    ),
    responses(
        (status = 200, description = "The updated interaction", body = InteractionResponse),
        (status = 400, description = "Missing or malformed x-user-id header")
    )
)]
pub async fn save_video_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    set_saved(app_state, id, &headers, true).await
}

/// Remove a video from the saved list.
#[utoipa::path(
    delete,
    path = "/videos/{id}/save",
    params(
        ("id" = Uuid, Path, description = "The video ID."),
        ("x-user-id" = Uuid, Header, description = "The acting user.")
    ),
    responses(
        (status = 200, description = "The updated interaction", body = InteractionResponse),
        (status = 400, description = "Missing or malformed x-user-id header")
    )
)]
pub async fn unsave_video_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    set_saved(app_state, id, &headers, false).await
}

async fn set_saved(
    app_state: Arc<AppState>,
    video_id: Uuid,
    headers: &HeaderMap,
    saved: bool,
) -> Result<Json<InteractionResponse>, (StatusCode, String)> {
    let user_id = require_user_id(headers)?;

    let interaction = app_state
        .interactions
        .set_saved(user_id, video_id, saved)
        .await
        .map_err(|e| port_error_response("interaction store", e))?;

    Ok(Json(InteractionResponse::from(interaction)))
}

//=========================================================================================
// Follow Handlers
//=========================================================================================

/// Follow a company.
#[utoipa::path(
    post,
    path = "/companies/{id}/follow",
    params(
        ("id" = Uuid, Path, description = "The company ID."),
        ("x-user-id" = Uuid, Header, description = "The acting user.")
    ),
    responses(
        (status = 200, description = "The follow relationship", body = FollowResponse),
        (status = 400, description = "Missing or malformed x-user-id header"),
        (status = 404, description = "No such company")
    )
)]
pub async fn follow_company_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = require_user_id(&headers)?;

    let follow = app_state
        .interactions
        .follow_company(user_id, id)
        .await
        .map_err(|e| port_error_response("follow store", e))?;

    Ok(Json(FollowResponse {
        company_id: follow.company_id,
        followed_at: follow.followed_at,
    }))
}

/// Unfollow a company. Unfollowing a company that was never followed succeeds.
#[utoipa::path(
    delete,
    path = "/companies/{id}/follow",
    params(
        ("id" = Uuid, Path, description = "The company ID."),
        ("x-user-id" = Uuid, Header, description = "The acting user.")
    ),
    responses(
        (status = 204, description = "The follow relationship is gone"),
        (status = 400, description = "Missing or malformed x-user-id header")
    )
)]
pub async fn unfollow_company_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = require_user_id(&headers)?;

    app_state
        .interactions
        .unfollow_company(user_id, id)
        .await
        .map_err(|e| port_error_response("follow store", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the companies a user follows.
#[utoipa::path(
    get,
    path = "/users/{id}/following",
    params(("id" = Uuid, Path, description = "The user ID.")),
    responses(
        (status = 200, description = "Followed company IDs", body = FollowingResponse)
    )
)]
pub async fn list_following_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let companies = app_state
        .interactions
        .followed_companies(id)
        .await
        .map_err(|e| port_error_response("follow store", e))?;

    Ok(Json(FollowingResponse { companies }))
}
