//! The external type checker seam and its `tsc` implementation.

use crate::error::CheckError;
use crate::tsconfig::TSCONFIG_FILE;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Maximum combined output we buffer from the checker (10MB)
pub const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

/// Default timeout for a check (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw result of one checker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

impl CheckerOutput {
    pub fn passed(output: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            output: output.into(),
        }
    }

    pub fn failed(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            output: output.into(),
        }
    }
}

/// Runs a type checker over a materialized project root.
#[async_trait]
pub trait TypeChecker: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Check the project at `root`, which contains `tsconfig.json`.
    async fn check(&self, root: &Path) -> Result<CheckerOutput, CheckError>;
}

/// `tsc --noEmit` as a child process.
#[derive(Debug, Clone)]
pub struct TscChecker {
    program: PathBuf,
    timeout_secs: u64,
}

impl TscChecker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `PATH` with the checker's own directory first, so shims find `node`.
    fn child_path(&self) -> Option<OsString> {
        let dir = self.program.parent().filter(|d| !d.as_os_str().is_empty())?;
        let existing = std::env::var_os("PATH").unwrap_or_default();
        let paths = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&existing));
        std::env::join_paths(paths).ok()
    }
}

#[async_trait]
impl TypeChecker for TscChecker {
    fn name(&self) -> &str {
        "tsc"
    }

    async fn check(&self, root: &Path) -> Result<CheckerOutput, CheckError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--noEmit", "--pretty", "false", "-p", TSCONFIG_FILE])
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.child_path() {
            cmd.env("PATH", path);
        }

        tracing::debug!(program = %self.program.display(), root = %root.display(), "spawning type checker");
        let child = cmd
            .spawn()
            .map_err(|e| CheckError::spawn_failed(&self.program, e))?;

        let output = timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output())
            .await
            .map_err(|_| CheckError::timeout(self.timeout_secs))?
            .map_err(|e| CheckError::spawn_failed(&self.program, e))?;

        let total = output.stdout.len() + output.stderr.len();
        if total > MAX_OUTPUT_SIZE {
            return Err(CheckError::output_too_large(total, MAX_OUTPUT_SIZE));
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }

        Ok(CheckerOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path_prepends_checker_dir() {
        let checker = TscChecker::new("/opt/node/bin/tsc");
        let path = checker.child_path().unwrap();
        let first = std::env::split_paths(&path).next().unwrap();
        assert_eq!(first, PathBuf::from("/opt/node/bin"));
    }

    #[test]
    fn test_bare_program_keeps_path() {
        assert!(TscChecker::new("tsc").child_path().is_none());
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let checker = TscChecker::new(dir.path().join("no-such-tsc"));
        let err = checker.check(dir.path()).await.unwrap_err();
        assert!(matches!(err, CheckError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_combined_output_and_exit_status() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-tsc");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"src/a.ts(1,1): error TS2322: out\"\necho \"err line\" >&2\nexit 2\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output = TscChecker::new(&script).check(dir.path()).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(2));
        assert!(output.output.contains("TS2322"));
        assert!(output.output.contains("err line"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-tsc");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = TscChecker::new(&script)
            .with_timeout(0)
            .check(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Timeout { timeout_secs: 0 }));
    }
}
