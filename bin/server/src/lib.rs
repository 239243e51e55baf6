//! auth-relay HTTP server.
//!
//! This crate hosts the redirect flow from `auth-relay-flow` behind an axum
//! server, translating HTTP requests into gateway records and back.

pub mod app;
pub mod config;
