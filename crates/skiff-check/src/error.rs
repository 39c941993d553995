//! Error types for the type-validation pipeline

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a type-check request
#[derive(Error, Debug, Diagnostic)]
pub enum CheckError {
    /// The disposable scope directory could not be created
    #[error("Failed to create type-check scope in {parent}: {source}")]
    #[diagnostic(
        code(skiff::check::scope_create),
        help("Check that the scratch directory exists and is writable")
    )]
    ScopeCreate {
        parent: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A virtual file could not be written into the scope
    #[error("Failed to materialize {path}: {source}")]
    #[diagnostic(code(skiff::check::materialize))]
    Materialize {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A virtual path would land outside the scope
    #[error("Refusing to materialize '{path}' outside the type-check scope")]
    #[diagnostic(
        code(skiff::check::unsafe_path),
        help("Virtual paths must be project-relative")
    )]
    UnsafePath { path: String },

    /// The compiler configuration could not be serialized
    #[error("Failed to write compiler configuration: {0}")]
    #[diagnostic(code(skiff::check::config))]
    Config(#[from] serde_json::Error),

    /// Failed to spawn the type checker process
    #[error("Failed to spawn type checker {program}: {source}")]
    #[diagnostic(
        code(skiff::check::spawn_failed),
        help("Check that the TypeScript compiler is installed and executable")
    )]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The type checker did not finish in time
    #[error("Type checker timed out after {timeout_secs} seconds")]
    #[diagnostic(
        code(skiff::check::timeout),
        help("Increase check.timeout_secs or reduce the project size")
    )]
    Timeout { timeout_secs: u64 },

    /// The type checker produced more output than we are willing to buffer
    #[error("Type checker output too large: {actual_bytes} bytes (max: {max_bytes} bytes)")]
    #[diagnostic(code(skiff::check::output_too_large))]
    OutputTooLarge {
        actual_bytes: usize,
        max_bytes: usize,
    },
}

impl CheckError {
    pub fn scope_create(parent: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ScopeCreate {
            parent: parent.into(),
            source,
        }
    }

    pub fn materialize(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Materialize {
            path: path.into(),
            source,
        }
    }

    pub fn spawn_failed(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            source,
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    pub fn output_too_large(actual_bytes: usize, max_bytes: usize) -> Self {
        Self::OutputTooLarge {
            actual_bytes,
            max_bytes,
        }
    }
}
