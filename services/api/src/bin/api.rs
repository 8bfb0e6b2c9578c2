//! services/api/src/bin/api.rs

use api_lib::{
    adapters::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        follow_company_handler, get_feed_handler, get_video_handler, like_video_handler,
        list_following_handler, list_videos_handler, record_view_handler,
        rest::ApiDoc, save_video_handler, state::AppState, unfollow_company_handler,
        unlike_video_handler, unsave_video_handler,
    },
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use stocktv_core::domain::FeedConfig;
use stocktv_core::feed::FeedService;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Feed Service & Shared AppState ---
    let feed_service = Arc::new(FeedService::new(
        db_adapter.clone(),
        db_adapter.clone(),
        FeedConfig {
            default_page: config.default_page,
            default_page_size: config.default_page_size,
        },
    ));

    let app_state = Arc::new(AppState {
        catalog: db_adapter.clone(),
        interactions: db_adapter,
        feed: feed_service,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT, HeaderName::from_static("x-user-id")]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/feed", get(get_feed_handler))
        .route("/videos", get(list_videos_handler))
        .route("/videos/{id}", get(get_video_handler))
        .route("/videos/{id}/views", post(record_view_handler))
        .route(
            "/videos/{id}/like",
            post(like_video_handler).delete(unlike_video_handler),
        )
        .route(
            "/videos/{id}/save",
            post(save_video_handler).delete(unsave_video_handler),
        )
        .route(
            "/companies/{id}/follow",
            post(follow_company_handler).delete(unfollow_company_handler),
        )
        .route("/users/{id}/following", get(list_following_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
