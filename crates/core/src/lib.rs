//! Medibot Core - Shared types library.
//!
//! This crate provides the domain types used by the Medibot server:
//!
//! - [`types::id`] - Newtype IDs for type-safe entity references
//! - [`types::email`] - Validated email addresses
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//! The optional `postgres` feature adds sqlx encode/decode support for the
//! newtypes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
