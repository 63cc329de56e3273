//! Harbour office library.
//!
//! Berths (catways), their reservations and the staff accounts that manage
//! them, served as a JSON API with optional browser pages. The binary in
//! `main.rs` wires this to `PostgreSQL`; tests drive it against
//! [`db::MemoryStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
