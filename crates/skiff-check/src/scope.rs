//! Disposable filesystem scopes for running a real compiler on virtual files.
//!
//! A scope is a uniquely named temporary directory holding one request's
//! materialized files. [`with_scope`] is the only way the pipeline acquires
//! one: the directory is removed when the closure's future completes,
//! whatever it returned, and by `Drop` if the future is abandoned or panics.

use crate::error::CheckError;
use skiff_vfs::{VirtualFileMap, normalize, validate_key};
use std::future::Future;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of every scope directory name.
pub const SCOPE_PREFIX: &str = "skiff-check-";

/// Owner of a request-exclusive temporary directory.
#[derive(Debug)]
pub struct DisposableScope {
    dir: TempDir,
}

impl DisposableScope {
    /// Create a new, empty scope under `parent` (the system temp dir if `None`).
    pub fn create(parent: Option<&Path>) -> Result<Self, CheckError> {
        let parent = parent.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let dir = tempfile::Builder::new()
            .prefix(SCOPE_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| CheckError::scope_create(&parent, e))?;

        tracing::debug!(root = %dir.path().display(), "created type-check scope");
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// A handle for working inside the scope. It does not keep the scope alive.
    pub fn dir(&self) -> ScopeDir {
        ScopeDir {
            root: self.root().to_path_buf(),
        }
    }

    /// Delete the scope. Errors are logged, never returned.
    pub fn release(self) {
        let root = self.root().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!(root = %root.display(), "removed type-check scope"),
            Err(e) => {
                tracing::debug!(root = %root.display(), error = %e, "type-check scope cleanup failed")
            }
        }
    }
}

/// File operations confined to a scope's root.
#[derive(Debug, Clone)]
pub struct ScopeDir {
    root: PathBuf,
}

impl ScopeDir {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a virtual key inside the scope.
    ///
    /// Keys that would escape the scope are rejected.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, CheckError> {
        let normalized = normalize(key);
        validate_key(key, &normalized).map_err(|_| CheckError::UnsafePath {
            path: key.to_string(),
        })?;
        Ok(self.root.join(normalized))
    }

    /// Write every virtual file into the scope, creating parent directories.
    pub async fn materialize(&self, files: &VirtualFileMap) -> Result<(), CheckError> {
        for (key, content) in files.iter_sorted() {
            self.write(key, content).await?;
        }
        tracing::debug!(files = files.len(), "materialized virtual files");
        Ok(())
    }

    /// Write a file at a scope-relative path.
    pub async fn write(&self, relative: &str, content: &str) -> Result<PathBuf, CheckError> {
        let path = self.path_for(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CheckError::materialize(relative, e))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| CheckError::materialize(relative, e))?;
        Ok(path)
    }

    /// Link a shared directory into the scope at `relative`.
    ///
    /// Best effort: failures are logged and reported as `false`.
    pub async fn link_dir(&self, target: &Path, relative: &str) -> bool {
        let Ok(link) = self.path_for(relative) else {
            return false;
        };
        if !target.is_dir() {
            tracing::warn!(target = %target.display(), "shared type directory does not exist");
            return false;
        }

        #[cfg(unix)]
        let linked = tokio::fs::symlink(target, &link).await;
        #[cfg(windows)]
        let linked = tokio::fs::symlink_dir(target, &link).await;

        match linked {
            Ok(()) => {
                tracing::debug!(target = %target.display(), link = %link.display(), "linked shared types");
                true
            }
            Err(e) => {
                tracing::warn!(target = %target.display(), error = %e, "failed to link shared types");
                false
            }
        }
    }
}

/// Run `f` inside a fresh scope and remove the scope afterwards.
///
/// The scope is released after the future resolves, on success and on
/// error alike.
pub async fn with_scope<T, F, Fut>(parent: Option<&Path>, f: F) -> Result<T, CheckError>
where
    F: FnOnce(ScopeDir) -> Fut,
    Fut: Future<Output = Result<T, CheckError>>,
{
    let scope = DisposableScope::create(parent)?;
    let result = f(scope.dir()).await;
    scope.release();
    result
}
