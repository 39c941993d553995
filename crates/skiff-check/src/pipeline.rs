//! The type-validation pipeline: materialize, check, filter.

use crate::checker::{CheckerOutput, TypeChecker};
use crate::diagnostics;
use crate::error::CheckError;
use crate::scope::with_scope;
use crate::tsconfig::{self, TSCONFIG_FILE};
use serde::Serialize;
use skiff_vfs::VirtualFileMap;
use std::path::PathBuf;

/// Warning attached to a check that could not run.
pub const UNAVAILABLE_WARNING: &str = "type check skipped: TypeScript compiler (tsc) not found";

/// Where the shared type declarations are linked inside a scope.
const SHARED_TYPES_LINK: &str = "node_modules";

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Parent directory for disposable scopes
    pub scratch_dir: Option<PathBuf>,
    /// Declarations directory linked into each scope
    pub types_dir: Option<PathBuf>,
}

/// Classified result of a type-check request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The checker exited successfully.
    Passed,
    /// The checker failed, but only on packages that aren't installed.
    Clean { suppressed: usize },
    /// No checker was available.
    Unavailable { warning: String },
    /// Genuine diagnostics remain.
    Failed {
        /// Filtered, root-rewritten, truncated text
        error: String,
        /// Unfiltered checker output
        raw: String,
    },
}

impl CheckOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, CheckOutcome::Failed { .. })
    }

    /// Summary line for a successful outcome; the error text for a failed one.
    pub fn message(&self) -> String {
        match self {
            CheckOutcome::Passed => "Type check passed".to_string(),
            CheckOutcome::Clean { suppressed } => format!(
                "Type check passed: no critical errors (only expected missing-module noise was present; {suppressed} diagnostics filtered)"
            ),
            CheckOutcome::Unavailable { .. } => "Type check skipped".to_string(),
            CheckOutcome::Failed { error, .. } => error.clone(),
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            CheckOutcome::Unavailable { warning } => Some(warning),
            _ => None,
        }
    }
}

/// Type-check `files` with `checker`, inside a disposable scope.
///
/// `None` for the checker degrades to [`CheckOutcome::Unavailable`].
/// The scope is gone when this returns, whatever the result.
pub async fn validate(
    files: &VirtualFileMap,
    checker: Option<&dyn TypeChecker>,
    options: &CheckOptions,
) -> Result<CheckOutcome, CheckError> {
    let Some(checker) = checker else {
        tracing::warn!("{UNAVAILABLE_WARNING}");
        return Ok(CheckOutcome::Unavailable {
            warning: UNAVAILABLE_WARNING.to_string(),
        });
    };

    tracing::info!(checker = checker.name(), files = files.len(), "type checking virtual project");

    with_scope(options.scratch_dir.as_deref(), |dir| async move {
        dir.materialize(files).await?;
        dir.write(TSCONFIG_FILE, &tsconfig::render()?).await?;
        if let Some(types) = &options.types_dir {
            dir.link_dir(types, SHARED_TYPES_LINK).await;
        }

        let output = checker.check(dir.root()).await?;

        let mut roots = vec![dir.root().to_path_buf()];
        if let Ok(canonical) = dir.root().canonicalize() {
            roots.push(canonical);
        }
        Ok(classify(output, &roots))
    })
    .await
}

/// Turn raw checker output into an outcome.
pub fn classify(output: CheckerOutput, roots: &[PathBuf]) -> CheckOutcome {
    if output.success {
        return CheckOutcome::Passed;
    }

    let filtered = diagnostics::filter(&output.output, roots);
    tracing::debug!(
        kept = filtered.kept,
        suppressed = filtered.suppressed,
        "filtered checker diagnostics"
    );

    if filtered.is_clean() && filtered.suppressed > 0 {
        return CheckOutcome::Clean {
            suppressed: filtered.suppressed,
        };
    }

    let error = if filtered.is_clean() {
        let status = output
            .exit_code
            .map_or_else(|| "a signal".to_string(), |code| format!("status {code}"));
        format!("Type checker exited with {status} and reported no diagnostics")
    } else {
        filtered.report()
    };

    CheckOutcome::Failed {
        error,
        raw: output.output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_without_filtering() {
        let output = CheckerOutput::passed("error TS2322: ignored because exit was 0");
        assert_eq!(classify(output, &[]), CheckOutcome::Passed);
    }

    #[test]
    fn test_noise_only_is_clean() {
        let output = CheckerOutput::failed(
            2,
            "src/main.tsx(1,19): error TS2307: Cannot find module 'react' or its corresponding type declarations.\n",
        );
        let outcome = classify(output, &[]);
        assert_eq!(outcome, CheckOutcome::Clean { suppressed: 1 });
        assert!(outcome.is_success());
        assert!(outcome.message().contains("only expected missing-module noise"));
        assert!(outcome.message().contains("1 diagnostics filtered"));
    }

    #[test]
    fn test_silent_failure_is_reported() {
        let outcome = classify(CheckerOutput::failed(1, "\n"), &[]);
        let CheckOutcome::Failed { error, .. } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(error, "Type checker exited with status 1 and reported no diagnostics");
    }

    #[test]
    fn test_unavailable_message() {
        let outcome = CheckOutcome::Unavailable {
            warning: UNAVAILABLE_WARNING.to_string(),
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.warning(), Some(UNAVAILABLE_WARNING));
    }
}
