//! Business logic for the harbour office.
//!
//! # Services
//!
//! - `auth` - Password hashing, bearer tokens and authentication errors
//! - `users` - Registration, login and profile management
//! - `catways` - Berth management
//! - `reservations` - Bookings and the active-reservation queries
//!
//! Services borrow the [`Store`](crate::db::Store) trait object and receive
//! already-resolved identities; they never look at HTTP or session state.

pub mod auth;
pub mod catways;
mod error;
pub mod reservations;
pub mod users;

pub use auth::{AuthError, IssuedToken, TokenService};
pub use catways::CatwayService;
pub use error::ServiceError;
pub use reservations::ReservationService;
pub use users::{Credential, UserService};
