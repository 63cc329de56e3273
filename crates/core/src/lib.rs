//! Harbormaster Core - Shared types library.
//!
//! This crate provides common types used across all Harbormaster components:
//! - `api` - HTTP API and browser pages for the harbour office
//! - `cli` - Command-line tools for migrations, seeding and user bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails and berth keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
