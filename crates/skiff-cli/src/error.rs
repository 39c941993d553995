//! Error handling for the Skiff CLI.
//!
//! Every variant ends up in a failure envelope on stdout; the `Display`
//! text is what callers see in its `error` field.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    /// Empty or malformed request payload
    #[error("{0}")]
    #[diagnostic(
        code(skiff::cli::request),
        help("The request must be a JSON object with a `files` map of path to source text")
    )]
    Request(String),

    /// Rejected virtual file set
    #[error(transparent)]
    #[diagnostic(transparent)]
    Files(#[from] skiff_vfs::VfsError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    #[diagnostic(code(skiff::cli::config))]
    Config(String),

    /// Config file given with `--config` doesn't exist
    #[error("Config file not found: {}", .0.display())]
    #[diagnostic(
        code(skiff::cli::config_not_found),
        help("Create skiff.toml or point --config at an existing TOML or JSON file")
    )]
    ConfigNotFound(PathBuf),

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    #[diagnostic(code(skiff::cli::io))]
    Io(#[from] std::io::Error),

    /// Bundling failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bundle(#[from] skiff_bundler::Error),

    /// The type check could not run to completion
    #[error("Type check error: {0}")]
    #[diagnostic(code(skiff::cli::check))]
    Check(#[from] skiff_check::CheckError),

    /// A command task panicked or was cancelled
    #[error("Internal error: {0}")]
    #[diagnostic(code(skiff::cli::internal))]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Convert a failed command task into an error.
    pub fn from_join(err: tokio::task::JoinError) -> Self {
        if !err.is_panic() {
            return Self::Internal(err.to_string());
        }
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "command panicked".to_string());
        Self::Internal(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_is_verbatim() {
        assert_eq!(
            CliError::request("empty request payload").to_string(),
            "empty request payload"
        );
    }

    #[test]
    fn test_bundle_error_is_transparent() {
        let err = CliError::from(skiff_bundler::Error::MissingEntry("src/main.tsx".into()));
        assert_eq!(err.to_string(), "missing entry file src/main.tsx");
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("skiff::bundle::missing_entry")
        );
    }

    #[tokio::test]
    async fn test_panic_payload_becomes_message() {
        let handle: tokio::task::JoinHandle<()> = tokio::spawn(async { panic!("boom") });
        let join = handle.await.unwrap_err();
        let err = CliError::from_join(join);
        assert_eq!(err.to_string(), "Internal error: boom");
    }
}
