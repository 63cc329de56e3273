//! Domain models for the harbour office.
//!
//! These types are validated domain objects, separate from database row
//! types and from the raw request drafts in [`crate::validation`].

pub mod catway;
pub mod reservation;
pub mod session;
pub mod user;

pub use catway::{Catway, NewCatway};
pub use reservation::{NewReservation, Reservation, ReservationChanges, ReservationFilter};
pub use session::{CurrentUser, RequestContext, keys as session_keys};
pub use user::{NewUser, User, UserChanges};
