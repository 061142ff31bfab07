//! Productivity metrics aggregator for operations task records.
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod parse;
pub mod schema;
pub mod session;
pub mod store;
pub mod types;
