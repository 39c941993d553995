//! Request-scoped state collected while Rolldown walks the module graph.

use crate::diagnostics::BundleDiagnostic;
use crate::scan::ImportRecord;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use skiff_vfs::{ExternalSet, ResolvedReference};

/// Everything the plugin hooks learn during one build.
///
/// Hooks run concurrently, so state lives behind a mutex; nothing here
/// outlives the request.
#[derive(Debug, Default)]
pub struct BuildSession {
    state: Mutex<SessionState>,
}

/// Snapshot of a finished session.
#[derive(Debug, Default)]
pub struct SessionState {
    pub externals: ExternalSet,
    /// Printed stylesheet text keyed by virtual path
    pub stylesheets: FxHashMap<String, String>,
    /// Imports of each loaded script module, in source order
    pub modules: FxHashMap<String, Vec<ImportRecord>>,
    pub diagnostics: Vec<BundleDiagnostic>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_external(&self, reference: &ResolvedReference) {
        if self.state.lock().externals.record(reference) {
            tracing::debug!(?reference, "external specifier recorded");
        }
    }

    pub fn record_stylesheet(&self, key: impl Into<String>, css: String) {
        self.state.lock().stylesheets.insert(key.into(), css);
    }

    pub fn record_module(&self, key: impl Into<String>, imports: Vec<ImportRecord>) {
        self.state.lock().modules.insert(key.into(), imports);
    }

    pub fn report(&self, diagnostic: BundleDiagnostic) {
        self.state.lock().diagnostics.push(diagnostic);
    }

    pub fn report_all(&self, diagnostics: impl IntoIterator<Item = BundleDiagnostic>) {
        self.state.lock().diagnostics.extend(diagnostics);
    }

    /// Byte offset of `specifier` inside `importer`, if the importer was scanned.
    pub fn import_offset(&self, importer: &str, specifier: &str) -> Option<u32> {
        self.state
            .lock()
            .modules
            .get(importer)?
            .iter()
            .find(|import| import.specifier == specifier)
            .map(|import| import.offset)
    }

    /// Take the collected state, leaving the session empty.
    pub fn take(&self) -> SessionState {
        std::mem::take(&mut *self.state.lock())
    }
}
