//! The type-validation pipeline driven by scripted checkers.

use async_trait::async_trait;
use parking_lot::Mutex;
use skiff_check::{
    CheckError, CheckOptions, CheckOutcome, CheckerOutput, TypeChecker, UNAVAILABLE_WARNING,
    VIRTUAL_ROOT, validate,
};
use skiff_vfs::VirtualFileMap;
use std::path::{Path, PathBuf};

/// Records what it saw and replies with canned output, with `{root}`
/// replaced by the scope it was pointed at.
struct ScriptedChecker {
    reply: Result<CheckerOutput, fn() -> CheckError>,
    seen: Mutex<Option<SeenScope>>,
}

#[derive(Debug, Clone)]
struct SeenScope {
    root: PathBuf,
    main: Option<String>,
    tsconfig: Option<String>,
}

impl ScriptedChecker {
    fn replying(output: CheckerOutput) -> Self {
        Self {
            reply: Ok(output),
            seen: Mutex::new(None),
        }
    }

    fn failing(error: fn() -> CheckError) -> Self {
        Self {
            reply: Err(error),
            seen: Mutex::new(None),
        }
    }

    fn seen(&self) -> SeenScope {
        self.seen.lock().clone().expect("checker was not invoked")
    }
}

#[async_trait]
impl TypeChecker for ScriptedChecker {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn check(&self, root: &Path) -> Result<CheckerOutput, CheckError> {
        *self.seen.lock() = Some(SeenScope {
            root: root.to_path_buf(),
            main: std::fs::read_to_string(root.join("src/main.tsx")).ok(),
            tsconfig: std::fs::read_to_string(root.join("tsconfig.json")).ok(),
        });
        match &self.reply {
            Ok(output) => {
                let mut output = output.clone();
                output.output = output.output.replace("{root}", &root.to_string_lossy());
                Ok(output)
            }
            Err(make) => Err(make()),
        }
    }
}

fn project() -> VirtualFileMap {
    VirtualFileMap::from_entries([
        ("src/main.tsx", "import React from 'react';\nconst n: number = 'x';\n"),
        ("src/util/format.ts", "export const f = 1;"),
    ])
    .unwrap()
}

fn options(scratch: &Path) -> CheckOptions {
    CheckOptions {
        scratch_dir: Some(scratch.to_path_buf()),
        types_dir: None,
    }
}

const MISSING_REACT: &str = "src/main.tsx(1,19): error TS2307: Cannot find module 'react' or its corresponding type declarations.";

#[tokio::test]
async fn test_checker_sees_materialized_project() {
    let scratch = tempfile::tempdir().unwrap();
    let checker = ScriptedChecker::replying(CheckerOutput::passed(""));

    let outcome = validate(&project(), Some(&checker), &options(scratch.path()))
        .await
        .unwrap();
    assert_eq!(outcome, CheckOutcome::Passed);
    assert_eq!(outcome.message(), "Type check passed");

    let seen = checker.seen();
    assert!(seen.main.unwrap().contains("const n: number"));
    assert!(seen.tsconfig.unwrap().contains("\"noEmit\": true"));
    assert!(seen.root.starts_with(scratch.path()));
    assert!(!seen.root.exists());
}

#[tokio::test]
async fn test_only_missing_module_noise_is_success() {
    let scratch = tempfile::tempdir().unwrap();
    let output = format!("{MISSING_REACT}\n{MISSING_REACT}\n\n");
    let checker = ScriptedChecker::replying(CheckerOutput::failed(2, output));

    let outcome = validate(&project(), Some(&checker), &options(scratch.path()))
        .await
        .unwrap();
    assert_eq!(outcome, CheckOutcome::Clean { suppressed: 2 });
    assert!(outcome.is_success());
    assert!(outcome.message().contains("no critical errors"));
    assert!(!checker.seen().root.exists());
}

#[tokio::test]
async fn test_genuine_error_is_filtered_and_rewritten() {
    let scratch = tempfile::tempdir().unwrap();
    let output = format!(
        "{MISSING_REACT}\n{{root}}/src/main.tsx(2,7): error TS2322: Type 'string' is not assignable to type 'number'.\nsrc/util/format.ts(1,1): error TS7016: Could not find a declaration file for module 'lodash'.\n"
    );
    let checker = ScriptedChecker::replying(CheckerOutput::failed(2, output));

    let outcome = validate(&project(), Some(&checker), &options(scratch.path()))
        .await
        .unwrap();
    let CheckOutcome::Failed { error, raw } = outcome else {
        panic!("expected a failed check");
    };
    assert_eq!(
        error,
        format!("{VIRTUAL_ROOT}/src/main.tsx(2,7): error TS2322: Type 'string' is not assignable to type 'number'.")
    );
    assert!(raw.contains("TS2307"));
    assert!(raw.contains("TS7016"));
    assert!(!checker.seen().root.exists());
}

#[tokio::test]
async fn test_scope_removed_after_checker_error() {
    let scratch = tempfile::tempdir().unwrap();
    let checker = ScriptedChecker::failing(|| CheckError::timeout(5));

    let err = validate(&project(), Some(&checker), &options(scratch.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::Timeout { timeout_secs: 5 }));
    assert!(!checker.seen().root.exists());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_scope_removed_after_error_before_checker_runs() {
    let scratch = tempfile::tempdir().unwrap();
    // A file where a directory must go makes materialization fail.
    let files = VirtualFileMap::from_entries([
        ("src/main.tsx", "export {}"),
        ("src/main.tsx/nested.ts", "export {}"),
    ])
    .unwrap();
    let checker = ScriptedChecker::replying(CheckerOutput::passed(""));

    let err = validate(&files, Some(&checker), &options(scratch.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::Materialize { .. }));
    assert!(checker.seen.lock().is_none());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_checker_degrades_to_warning() {
    let scratch = tempfile::tempdir().unwrap();
    let outcome = validate(&project(), None, &options(scratch.path()))
        .await
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.warning(), Some(UNAVAILABLE_WARNING));
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_types_dir_is_non_fatal() {
    let scratch = tempfile::tempdir().unwrap();
    let checker = ScriptedChecker::replying(CheckerOutput::passed(""));
    let options = CheckOptions {
        scratch_dir: Some(scratch.path().to_path_buf()),
        types_dir: Some(scratch.path().join("no-such-types")),
    };

    let outcome = validate(&project(), Some(&checker), &options).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Passed);
}
