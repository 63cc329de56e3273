//! Core types for Harbormaster.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catway;
pub mod email;
pub mod id;

pub use catway::{CatwayNumber, CatwayNumberError, CatwayType, CatwayTypeError};
pub use email::{Email, EmailError};
pub use id::*;
