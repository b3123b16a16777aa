//! # Flowgraph
//!
//! Command-line front end for `flowgraph-core`: replays editing scripts
//! against an in-memory graph and reports the change notifications.

pub mod cli;
pub mod config;
pub mod error;
pub mod script;

pub use error::AppError;
