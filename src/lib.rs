//! Relaycast - tokenized media streaming relay
//!
//! This library crate exposes the core functionality for integration testing.

pub mod cache;
pub mod config;
pub mod server;
pub mod store;
pub mod streaming;
