//! Shared types and configuration for Tresora.
//!
//! This crate holds the pieces every other crate needs: typed identifiers
//! and application configuration. No business logic lives here.

pub mod config;
pub mod types;
