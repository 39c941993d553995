//! The bundle pipeline: virtual file set in, single program out.

use crate::css::inject_styles;
use crate::diagnostics;
use crate::env::{DEFAULT_NODE_ENV, EnvSubstitutions};
use crate::plugin::VirtualFilePlugin;
use crate::scan::ImportRecord;
use crate::session::{BuildSession, SessionState};
use crate::{Error, Result};
use rolldown::{BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem};
use rolldown::{OutputFormat, Platform};
use rolldown_common::Output;
use rolldown_plugin::__inner::SharedPluginable;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use skiff_vfs::{ResolvedReference, Resolver, VirtualFileMap, probe};
use std::sync::Arc;

/// Default entry module of a project.
pub const DEFAULT_ENTRY: &str = "src/main.tsx";

/// Inputs of one bundle request besides the files themselves.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub entry: String,
    pub env: EnvSubstitutions,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            entry: DEFAULT_ENTRY.to_string(),
            env: EnvSubstitutions::new(Vec::<(String, String)>::new(), DEFAULT_NODE_ENV),
        }
    }
}

impl BundleOptions {
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            ..Default::default()
        }
    }

    pub fn with_env(mut self, env: EnvSubstitutions) -> Self {
        self.env = env;
        self
    }
}

/// A successful bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledArtifact {
    /// Final program, with the style injection preamble when `css` is set
    pub code: String,
    /// Aggregated stylesheet text
    pub css: Option<String>,
    /// External specifiers, sorted and de-duplicated
    pub externals: Vec<String>,
}

/// Bundle `files` starting at `options.entry`.
pub async fn bundle(files: &VirtualFileMap, options: &BundleOptions) -> Result<CompiledArtifact> {
    if files.is_empty() {
        return Err(Error::EmptyProject);
    }

    let resolver = Arc::new(Resolver::new(&options.entry));
    if !files.contains(resolver.entry()) {
        return Err(Error::MissingEntry(resolver.entry().to_string()));
    }

    tracing::info!(entry = resolver.entry(), files = files.len(), "bundling virtual project");

    let session = Arc::new(BuildSession::new());
    let plugin = VirtualFilePlugin::new(
        files.clone(),
        Arc::clone(&resolver),
        Arc::new(options.env.clone()),
        Arc::clone(&session),
    );
    let plugins: Vec<SharedPluginable> = vec![Arc::new(plugin)];

    let bundler_options = BundlerOptions {
        input: Some(vec![InputItem {
            name: Some("main".to_string()),
            import: resolver.entry().to_string(),
        }]),
        format: Some(OutputFormat::Esm),
        platform: Some(Platform::Browser),
        inline_dynamic_imports: Some(true),
        ..Default::default()
    };

    let mut bundler = RolldownBundlerBuilder::default()
        .with_options(bundler_options)
        .with_plugins(plugins)
        .build()
        .map_err(|e| Error::from_rolldown_batch(&e))?;

    let generated = bundler.generate().await;
    let state = session.take();

    let output = match generated {
        Ok(output) if state.diagnostics.is_empty() => output,
        Ok(_) => return Err(Error::Bundle(diagnostics::normalize(state.diagnostics))),
        Err(e) if !state.diagnostics.is_empty() => {
            tracing::debug!(error = ?e, "rolldown failed after plugin diagnostics");
            return Err(Error::Bundle(diagnostics::normalize(state.diagnostics)));
        }
        Err(e) => return Err(Error::from_rolldown_batch(&e)),
    };

    let mut chunks: Vec<_> = output
        .assets
        .iter()
        .filter_map(|asset| match asset {
            Output::Chunk(chunk) => Some((chunk.is_entry, chunk.code.to_string())),
            Output::Asset(_) => None,
        })
        .collect();
    // Entry chunk first; with dynamic imports inlined there is normally one.
    chunks.sort_by_key(|(is_entry, _)| !*is_entry);
    let program = chunks
        .into_iter()
        .map(|(_, code)| code)
        .collect::<Vec<_>>()
        .join("\n");

    let css = aggregate_stylesheets(&resolver, files, &state);
    let code = match &css {
        Some(css) => inject_styles(&program, css),
        None => program,
    };

    let externals = state.externals.into_vec();
    tracing::info!(
        bytes = code.len(),
        externals = externals.len(),
        stylesheets = state.stylesheets.len(),
        "bundle complete"
    );

    Ok(CompiledArtifact {
        code,
        css,
        externals,
    })
}

/// Concatenate collected stylesheets in import order.
fn aggregate_stylesheets(
    resolver: &Resolver,
    files: &VirtualFileMap,
    state: &SessionState,
) -> Option<String> {
    if state.stylesheets.is_empty() {
        return None;
    }

    let order = stylesheet_order(resolver, files, &state.modules, &state.stylesheets);
    let css = order
        .iter()
        .filter_map(|key| state.stylesheets.get(key.as_str()))
        .map(|css| css.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    Some(css)
}

/// Order stylesheets by a depth-first walk of the import graph from the entry.
///
/// Each stylesheet appears at its first import. Stylesheets the walk does not
/// reach are appended in path order.
pub fn stylesheet_order(
    resolver: &Resolver,
    files: &VirtualFileMap,
    modules: &FxHashMap<String, Vec<ImportRecord>>,
    stylesheets: &FxHashMap<String, String>,
) -> Vec<String> {
    struct Walk<'a> {
        resolver: &'a Resolver,
        files: &'a VirtualFileMap,
        modules: &'a FxHashMap<String, Vec<ImportRecord>>,
        stylesheets: &'a FxHashMap<String, String>,
        visited: FxHashSet<String>,
        order: Vec<String>,
    }

    impl Walk<'_> {
        fn visit(&mut self, key: &str) {
            if !self.visited.insert(key.to_string()) {
                return;
            }
            let Some(imports) = self.modules.get(key) else {
                return;
            };
            for import in imports {
                let target = match self.resolver.resolve(&import.specifier, Some(key)) {
                    ResolvedReference::VirtualKey(k) => probe(&k, self.files).ok(),
                    ResolvedReference::EntryPoint => Some(self.resolver.entry()),
                    _ => None,
                };
                let Some(target) = target else { continue };

                if self.stylesheets.contains_key(target) {
                    if self.visited.insert(target.to_string()) {
                        self.order.push(target.to_string());
                    }
                } else {
                    self.visit(target);
                }
            }
        }
    }

    let mut walk = Walk {
        resolver,
        files,
        modules,
        stylesheets,
        visited: FxHashSet::default(),
        order: Vec::new(),
    };
    walk.visit(resolver.entry());

    let mut unreached: Vec<&String> = stylesheets
        .keys()
        .filter(|key| !walk.visited.contains(key.as_str()))
        .collect();
    unreached.sort();
    walk.order.extend(unreached.into_iter().cloned());
    walk.order
}
