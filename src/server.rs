use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{elevated::admin, protected, public};
use crate::middleware::{cors_layer, jwt_auth_middleware, rate_limit_middleware, RateLimitState};
use crate::state::AppState;
use crate::types::RateLimitPreset;

/// Full application router: public routes, the protected API grouped by rate-limit
/// preset, then CORS and request tracing around everything.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        // Protected API
        .merge(protect(standard_routes(), &state, RateLimitPreset::Standard))
        .merge(protect(strict_routes(), &state, RateLimitPreset::Strict))
        .merge(protect(relaxed_routes(), &state, RateLimitPreset::Relaxed))
        .fallback(not_found)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Reads and cheap writes
fn standard_routes() -> Router<AppState> {
    use protected::{auth, cases, profile};

    Router::new()
        .route("/api/auth/me", get(auth::me_get))
        .route("/api/profile", get(profile::profile_get))
        .route("/api/cases", get(cases::cases_get))
        .route("/api/cases/:id", get(cases::case_get))
        .route("/api/cases/:id/history", get(cases::history_get))
        .route("/api/cases/:id/messages", get(cases::messages_get))
        .route("/api/admin/users", get(admin::users_get))
        .route("/api/admin/audit-logs", get(admin::audit_logs_get))
}

/// Mutations that create records or fan out notifications
fn strict_routes() -> Router<AppState> {
    use axum::routing::post;
    use protected::{cases, profile};

    Router::new()
        .route("/api/profile", patch(profile::profile_patch))
        .route("/api/cases", post(cases::cases_post))
        .route("/api/cases/:id/status", patch(cases::status_patch))
        .route("/api/cases/:id/messages", post(cases::messages_post))
        .route("/api/admin/cases/:id/assign", put(admin::case_assign))
}

/// Inbox polling
fn relaxed_routes() -> Router<AppState> {
    use protected::notifications;

    Router::new()
        .route("/api/notifications", get(notifications::notifications_get))
        .route("/api/notifications/:id/read", patch(notifications::notification_read))
}

/// Rate limiting runs first (outermost), then JWT authentication.
fn protect(routes: Router<AppState>, state: &AppState, preset: RateLimitPreset) -> Router<AppState> {
    let limits = RateLimitState::new(state.limiter.clone(), &state.config, preset);

    routes
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
        .route_layer(from_fn_with_state(limits, rate_limit_middleware))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Serve with peer addresses available to the rate limiter, until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
}
