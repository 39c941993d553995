//! Skiff CLI - bundle and type-check in-memory TypeScript projects.
//!
//! A request is a JSON object with a `files` map. The CLI reads it in full,
//! runs one pipeline and always answers with exactly one JSON envelope on
//! stdout:
//!
//! ```text
//! {"success":true,"output":"...","externals":["react"]}
//! {"success":false,"error":"Build failed with 1 error: ..."}
//! ```
//!
//! - [`cli`] - argument parsing
//! - [`commands`] - `bundle`, `check` and `compile`
//! - [`config`] - figment-layered `skiff.toml` / `SKIFF_*` configuration
//! - [`error`] - the error type every failure is reported through
//! - [`logger`] - tracing to stderr
//! - [`report`] - the result envelope
//! - [`request`] - request parsing and validation

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod report;
pub mod request;

pub use error::{CliError, Result};
pub use report::ResultEnvelope;
