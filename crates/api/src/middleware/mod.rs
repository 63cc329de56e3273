//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing, span carries `request_id`)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, `PostgreSQL` store in production)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireUser`] and [`RequirePageUser`] extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalPageUser, RequirePageUser, RequireUser, clear_current_user, set_current_user,
};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
