//! Precis API Gateway
//!
//! The HTTP surface of the service:
//! - Registration and JWT authentication
//! - Content creation, listing, detail and downloads
//! - Rate limiting and request metrics
//! - Health and readiness probes

pub mod handlers;
pub mod middleware;

use axum::{
    extract::{DefaultBodyLimit, FromRef, Request},
    middleware::{from_fn, Next},
    routing::{get, post},
    Router,
};
use precis_common::{
    auth::JwtManager,
    config::AppConfig,
    db::{DbPool, Repository},
    errors::{AppError, Result},
    storage::LocalFileStore,
    TextGenerator,
};
use precis_ingestion::{ContentProcessor, Summarizer};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub jwt: Arc<JwtManager>,
    pub processor: ContentProcessor,
}

impl AppState {
    /// Wire the shared services from configuration and an injected generator
    pub fn new(config: AppConfig, db: DbPool, generator: Arc<dyn TextGenerator>) -> Result<Self> {
        let secret = config
            .auth
            .jwt_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Configuration {
                message: "auth.jwt_secret must be set".to_string(),
            })?;

        let jwt = Arc::new(JwtManager::new(
            &secret,
            config.auth.access_expiration_secs,
            config.auth.refresh_expiration_secs,
        ));

        let repo = Repository::new(db);
        let processor = ContentProcessor::new(
            repo.clone(),
            LocalFileStore::new(config.storage.upload_dir.clone()),
            Summarizer::new(generator),
        );

        Ok(Self {
            config: Arc::new(config),
            repo,
            jwt,
            processor,
        })
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Result<Router> {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let mut api_routes = Router::new()
        // Accounts
        .route("/register/", post(handlers::auth::register))
        .route("/token/", post(handlers::auth::token))
        .route("/token/refresh/", post(handlers::auth::refresh))
        .route("/user/", get(handlers::auth::current_user))

        // Content
        .route(
            "/content/",
            get(handlers::content::list_contents).post(handlers::content::create_content),
        )
        .route("/content/{id}/", get(handlers::content::get_content))
        .route("/content/{id}/download", get(handlers::content::download))
        .route("/content/{id}/download/", get(handlers::content::download))
        .route("/content/{id}/download/{format}", get(handlers::content::download_as));

    if config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            config.rate_limit.requests_per_second,
            config.rate_limit.burst,
        )?;
        let limit = config.rate_limit.requests_per_second;
        api_routes = api_routes.layer(from_fn(move |req: Request, next: Next| {
            middleware::rate_limit::rate_limit_middleware(req, next, limiter.clone(), limit)
        }));
    }

    // Compose the app
    Ok(Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.storage.max_upload_bytes))
        .layer(from_fn(middleware::metrics::track_requests))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state))
}
