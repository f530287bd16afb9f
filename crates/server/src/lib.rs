//! Medibot server library.
//!
//! This crate provides the assistant's web application as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod rag;
pub mod routes;
pub mod services;
pub mod state;
