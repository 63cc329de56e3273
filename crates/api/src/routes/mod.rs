//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness
//! GET  /health/ready                             - Store readiness
//!
//! # Auth (also mounted under /api)
//! POST /login                                    - Email + password, returns token
//! GET  /logout                                   - End session
//!
//! # Users
//! GET    /api/users                              - List (auth)
//! POST   /api/users                              - Register
//! GET    /api/users/{key}                        - By id or email (auth)
//! PUT    /api/users/{key}                        - Update (auth)
//! DELETE /api/users/{key}                        - Delete (auth)
//!
//! # Catways
//! GET    /api/catways                            - List by number
//! POST   /api/catways                            - Create (auth)
//! GET    /api/catways/{number}                   - Fetch
//! PUT    /api/catways/{number}                   - Update state (auth)
//! DELETE /api/catways/{number}                   - Delete (auth)
//!
//! # Reservations
//! GET    /api/reservations[?active=true]         - All, or active now
//! GET    /api/catways/{number}/reservations      - Scoped list
//! POST   /api/catways/{number}/reservations      - Create (auth)
//! GET    /api/catways/{number}/reservations/{id} - Scoped fetch
//! PUT    /api/catways/{number}/reservations/{id} - Scoped update (auth)
//! DELETE /api/catways/{number}/reservations/{id} - Scoped delete (auth)
//!
//! # Pages (session mode only)
//! GET  /                                         - Login page
//! GET  /dashboard                                - Active reservations
//! ```

pub mod auth;
pub mod catways;
pub mod pages;
pub mod reservations;
pub mod users;

use axum::{
    Router,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::config::AuthMode;
use crate::envelope::Envelope;
use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// JSON body extractor whose rejections use the failure envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Build the complete application with its middleware stack.
///
/// Sentry layers are left to the binary so tests run without a client.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let auth_mode = state.config().auth_mode;
    routes(auth_mode)
        .layer(sessions)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Create the application router without any layers.
pub fn routes(auth_mode: AuthMode) -> Router<AppState> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth_routes())
        .nest("/api", api_routes());

    let router = match auth_mode {
        AuthMode::Session => router.merge(page_routes()),
        AuthMode::Token => router,
    };

    router.fallback(not_found)
}

/// Login and logout.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Everything under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .route("/users", get(users::index).post(users::create))
        .route(
            "/users/{key}",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/catways", get(catways::index).post(catways::create))
        .route(
            "/catways/{number}",
            get(catways::show)
                .put(catways::update)
                .delete(catways::destroy),
        )
        .route("/reservations", get(reservations::index))
        .route(
            "/catways/{number}/reservations",
            get(reservations::scoped_index).post(reservations::create),
        )
        .route(
            "/catways/{number}/reservations/{id}",
            get(reservations::show)
                .put(reservations::update)
                .delete(reservations::destroy),
        )
}

/// Browser pages.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::login_page))
        .route("/dashboard", get(pages::dashboard))
}

/// Envelope for unmatched routes.
async fn not_found() -> Envelope<()> {
    Envelope::failure(StatusCode::NOT_FOUND, "Route not found")
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
