//! ordercast core - Shared types library.
//!
//! This crate provides the types shared by every ordercast component:
//! - `server` - HTTP API and WebSocket notification endpoint
//! - `integration-tests` - End-to-end tests against a running server
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no locks,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails, order statuses, records and event envelopes
//! - [`validate`] - Field-level validation of inbound JSON payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validate;

pub use types::*;
