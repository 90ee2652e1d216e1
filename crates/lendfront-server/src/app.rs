//! Router assembly.

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;

/// Uploads decode and re-encode images on the blocking pool; cap how many
/// run at once across every upload route.
const UPLOAD_CONCURRENCY: usize = 4;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_routes = Router::new()
        .nest("/v1/uploads", routes::uploads::router(&state.upload_policy))
        .nest("/v1/carousel", routes::carousel::router(&state.upload_policy))
        .layer(tower::limit::GlobalConcurrencyLimitLayer::new(UPLOAD_CONCURRENCY));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let images = ServeDir::new(state.public_dir.join("images"));

    Router::new()
        .nest("/v1/sys", routes::sys::router())
        .nest("/v1/settings", routes::settings::router())
        .nest("/v1/backgrounds", routes::backgrounds::router())
        .nest("/v1/admin", routes::admin::router())
        .nest("/v1/leads", routes::leads::router())
        .merge(upload_routes)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .nest_service("/images", images)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}
