//! Error types for the virtual file set

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while building or reading a [`VirtualFileMap`](crate::VirtualFileMap)
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// A virtual path failed validation
    #[error("invalid virtual path '{path}': {reason}")]
    #[diagnostic(
        code(skiff::vfs::invalid_path),
        help("Virtual paths are project-relative, e.g. src/App.tsx")
    )]
    InvalidPath { path: String, reason: String },

    /// A virtual file exceeds the per-file size limit
    #[error("virtual file '{path}' is too large: {size} bytes (max: {max} bytes)")]
    #[diagnostic(code(skiff::vfs::file_too_large))]
    FileTooLarge { path: String, size: usize, max: usize },

    /// No entry matched the key or any of its probed variants
    #[error("file not found in virtual file set: {key}")]
    #[diagnostic(
        code(skiff::vfs::not_found),
        help("Tried: {}", .candidates.join(", "))
    )]
    NotFound { key: String, candidates: Vec<String> },
}

impl VfsError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::NotFound {
            key: key.into(),
            candidates,
        }
    }
}
