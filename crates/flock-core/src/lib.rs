//! Core types and trait definitions for the Flock church register.
//!
//! This crate has no HTTP or database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod believer;
pub mod error;
pub mod params;
pub mod patch;
pub mod service;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
