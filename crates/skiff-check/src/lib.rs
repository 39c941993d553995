//! # skiff-check
//!
//! Type validation of an in-memory project with a real TypeScript compiler.
//!
//! The project is materialized into a [`DisposableScope`] next to a
//! synthesized `tsconfig.json`, the compiler runs in diagnostics-only mode,
//! and its output is filtered: diagnostics that only say an external
//! package isn't installed are dropped, and the scope's path is rewritten
//! to [`VIRTUAL_ROOT`].
//!
//! The compiler sits behind the [`TypeChecker`] trait. [`CheckerLocator`]
//! finds `tsc`; when it can't, the pipeline reports a successful check
//! with a warning rather than failing.
//!
//! ```no_run
//! use skiff_check::{CheckOptions, CheckerLocator, TscChecker, TypeChecker, validate};
//! use skiff_vfs::VirtualFileMap;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let files = VirtualFileMap::from_entries([("src/main.tsx", "const n: number = 1;")])?;
//! let checker = CheckerLocator::new().locate().map(TscChecker::new);
//! let outcome = validate(
//!     &files,
//!     checker.as_ref().map(|c| c as &dyn TypeChecker),
//!     &CheckOptions::default(),
//! )
//! .await?;
//! println!("{}", outcome.message());
//! # Ok(()) }
//! ```

pub mod checker;
pub mod diagnostics;
pub mod error;
pub mod locate;
pub mod pipeline;
pub mod scope;
pub mod tsconfig;

pub use checker::{CheckerOutput, DEFAULT_TIMEOUT_SECS, MAX_OUTPUT_SIZE, TscChecker, TypeChecker};
pub use diagnostics::{
    FilterOutcome, MAX_REPORT_CHARS, SUPPRESSED_CODES, TscDiagnostic, VIRTUAL_ROOT, is_suppressed,
};
pub use error::CheckError;
pub use locate::CheckerLocator;
pub use pipeline::{CheckOptions, CheckOutcome, UNAVAILABLE_WARNING, classify, validate};
pub use scope::{DisposableScope, SCOPE_PREFIX, ScopeDir, with_scope};

pub type Result<T> = std::result::Result<T, CheckError>;
