//! Core types and logic for supernote-canvas.
//!
//! Everything here is synchronous and runtime-free. Spawning the bridge tool
//! and choosing a capture strategy live in the CLI crate.
//!
//! # Modules
//!
//! - [`config`]: immutable settings resolved from the environment
//! - [`error`]: user-facing errors with suggestions
//! - [`capture`]: capture methods, results, and probe context
//! - [`locator`]: newest screenshot in a folder
//! - [`environment`]: local vs hosted detection
//! - [`ingest`]: writing captures into `diagrams/`
//! - [`report`]: command output and Markdown rendering

pub mod capture;
pub mod config;
pub mod environment;
pub mod error;
pub mod ingest;
pub mod locator;
pub mod report;
