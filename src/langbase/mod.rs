//! Langbase Pipes client.
//!
//! Each research agent is a hosted Langbase pipe; this module provides the
//! HTTP client that runs and upserts them, plus the wire types.

mod client;
mod types;

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;

pub use client::*;
pub use types::*;
