//! # skiff-bundler
//!
//! Rolldown-based bundling of an in-memory project.
//!
//! Every import edge goes through the resolution policy in `skiff-vfs`.
//! Project files are served straight from the [`VirtualFileMap`], bare
//! packages are left external, and stylesheets are collected and injected
//! into the program at runtime.
//!
//! ```no_run
//! use skiff_bundler::{BundleOptions, bundle};
//! use skiff_vfs::VirtualFileMap;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let files = VirtualFileMap::from_entries([
//!     ("src/main.tsx", "import { x } from './a'; console.log(x);"),
//!     ("src/a.ts", "export const x = 1;"),
//! ])?;
//! let artifact = bundle(&files, &BundleOptions::default()).await?;
//! println!("{} ({} externals)", artifact.code, artifact.externals.len());
//! # Ok(()) }
//! ```

pub mod css;
pub mod diagnostics;
pub mod env;
pub mod pipeline;
pub mod plugin;
pub mod scan;
pub mod session;

pub use diagnostics::{BundleDiagnostic, DiagnosticKind};
pub use env::{DEFAULT_NODE_ENV, EnvSubstitutions};
pub use pipeline::{BundleOptions, CompiledArtifact, DEFAULT_ENTRY, bundle};
pub use plugin::VirtualFilePlugin;
pub use skiff_vfs::VirtualFileMap;

/// Error types for skiff-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more located bundling problems.
    #[error("{}", diagnostics::render(.0))]
    Bundle(Vec<BundleDiagnostic>),

    /// The request contained no files.
    #[error("project is empty: the request contains no files")]
    EmptyProject,

    /// The designated entry module is not in the file set.
    #[error("missing entry file {0}")]
    MissingEntry(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Convert a Rolldown batch error into a bundle error.
    pub fn from_rolldown_batch(error: &dyn std::fmt::Debug) -> Self {
        Error::Bundle(diagnostics::normalize(
            diagnostics::extract_from_rolldown_error(error),
        ))
    }

    /// Structured diagnostics, when the failure carries any.
    pub fn diagnostics(&self) -> &[BundleDiagnostic] {
        match self {
            Error::Bundle(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        let code = match self {
            Error::Bundle(_) => "skiff::bundle::failed",
            Error::EmptyProject => "skiff::bundle::empty_project",
            Error::MissingEntry(_) => "skiff::bundle::missing_entry",
        };
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::MissingEntry(entry) => Some(Box::new(format!(
                "The project must contain {entry}; it is the bundle's entry module"
            ))),
            Error::Bundle(diagnostics) => diagnostics
                .iter()
                .find_map(|d| d.help.as_deref())
                .map(|help| Box::new(help) as Box<dyn std::fmt::Display + '_>),
            _ => None,
        }
    }
}
