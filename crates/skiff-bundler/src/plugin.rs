//! Rolldown plugin serving the virtual file set.
//!
//! The hooks are thin: resolution and loading are the pure functions from
//! `skiff-vfs`, and everything learned along the way is recorded in the
//! request's [`BuildSession`].

use crate::css::{STYLESHEET_STUB, process_stylesheet};
use crate::diagnostics::{BundleDiagnostic, DiagnosticKind};
use crate::env::EnvSubstitutions;
use crate::scan::scan_module;
use crate::session::BuildSession;
use anyhow::anyhow;
use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use skiff_vfs::{
    LoaderKind, PROBE_EXTENSIONS, ResolvedReference, Resolver, VirtualFileMap, probe,
};
use std::borrow::Cow;
use std::sync::Arc;

/// Id prefix for package stylesheets that are deliberately not bundled.
pub const IGNORED_STYLESHEET_PREFIX: &str = "\0skiff-ignored-style:";

/// Plugin that resolves and loads every module from a [`VirtualFileMap`].
#[derive(Debug, Clone)]
pub struct VirtualFilePlugin {
    files: VirtualFileMap,
    resolver: Arc<Resolver>,
    env: Arc<EnvSubstitutions>,
    session: Arc<BuildSession>,
}

impl VirtualFilePlugin {
    pub fn new(
        files: VirtualFileMap,
        resolver: Arc<Resolver>,
        env: Arc<EnvSubstitutions>,
        session: Arc<BuildSession>,
    ) -> Self {
        Self {
            files,
            resolver,
            env,
            session,
        }
    }
}

/// Ids owned by Rolldown itself.
fn is_internal(id: &str) -> bool {
    id.starts_with("rolldown:") || (id.starts_with('\0') && !id.starts_with(IGNORED_STYLESHEET_PREFIX))
}

fn claim(id: String, external: bool) -> HookResolveIdReturn {
    Ok(Some(HookResolveIdOutput {
        id: id.into(),
        external: Some(ResolvedExternal::Bool(external)),
        ..Default::default()
    }))
}

fn module(code: String, module_type: ModuleType) -> HookLoadReturn {
    Ok(Some(HookLoadOutput {
        code: code.into(),
        module_type: Some(module_type),
        ..Default::default()
    }))
}

/// Rolldown module type for a loader. Stylesheets are served as stubs.
fn module_type(loader: LoaderKind) -> ModuleType {
    match loader {
        LoaderKind::Js | LoaderKind::Jsx => ModuleType::Jsx,
        LoaderKind::Ts => ModuleType::Ts,
        LoaderKind::Tsx => ModuleType::Tsx,
        LoaderKind::Json => ModuleType::Json,
        LoaderKind::Css => ModuleType::Js,
        LoaderKind::Text => ModuleType::Text,
    }
}

fn missing_file(
    files: &VirtualFileMap,
    session: &BuildSession,
    specifier: &str,
    importer: Option<&str>,
    key: &str,
) -> BundleDiagnostic {
    let tried = PROBE_EXTENSIONS.join(", ");
    let mut diagnostic = BundleDiagnostic::new(
        DiagnosticKind::MissingFile,
        format!("Could not resolve \"{specifier}\": file not found in virtual file set: {key}"),
    )
    .with_help(format!("add {key} (or {key} with one of {tried}) to the project files"));

    if let Some(importer) = importer {
        diagnostic = diagnostic.with_file(importer);
        let located = files
            .get(importer)
            .zip(session.import_offset(importer, specifier));
        if let Some((source, offset)) = located {
            diagnostic = diagnostic.at_offset(source, offset as usize);
        }
    }
    diagnostic
}

impl Plugin for VirtualFilePlugin {
    fn name(&self) -> Cow<'static, str> {
        "skiff-virtual-files".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(str::to_string);
        let plugin = self.clone();

        async move {
            if is_internal(&specifier) {
                return Ok(None);
            }

            let reference = plugin.resolver.resolve(&specifier, importer.as_deref());
            tracing::debug!(%specifier, ?importer, ?reference, "resolved import");

            match reference {
                ResolvedReference::EntryPoint => claim(plugin.resolver.entry().to_string(), false),
                ResolvedReference::External(ref name) => {
                    plugin.session.record_external(&reference);
                    claim(name.clone(), true)
                }
                ResolvedReference::IgnoredStylesheet(name) => {
                    claim(format!("{IGNORED_STYLESHEET_PREFIX}{name}"), false)
                }
                ResolvedReference::VirtualKey(key) => match probe(&key, &plugin.files) {
                    Ok(found) => claim(found.to_string(), false),
                    Err(_) => {
                        let diagnostic = missing_file(
                            &plugin.files,
                            &plugin.session,
                            &specifier,
                            importer.as_deref(),
                            &key,
                        );
                        let message = diagnostic.message.clone();
                        plugin.session.report(diagnostic);
                        Err(anyhow!(message))
                    }
                },
            }
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let plugin = self.clone();

        async move {
            if id.starts_with(IGNORED_STYLESHEET_PREFIX) {
                return module(STYLESHEET_STUB.to_string(), ModuleType::Js);
            }

            let Some(content) = plugin.files.get(&id) else {
                return Ok(None);
            };
            let loader = LoaderKind::from_path(&id);

            match loader {
                LoaderKind::Css => match process_stylesheet(&id, content) {
                    Ok(css) => {
                        plugin.session.record_stylesheet(id, css);
                        module(STYLESHEET_STUB.to_string(), module_type(loader))
                    }
                    Err(diagnostic) => {
                        let message = format!("{}: {}", id, diagnostic.message);
                        plugin.session.report(diagnostic);
                        Err(anyhow!(message))
                    }
                },
                _ if !loader.is_script() => module(content.to_string(), module_type(loader)),
                _ => match scan_module(&id, content, loader, &plugin.env) {
                    Ok(scan) => {
                        if scan.substitutions > 0 {
                            tracing::debug!(module = %id, count = scan.substitutions, "substituted environment reads");
                        }
                        plugin.session.record_module(id, scan.imports);
                        module(scan.code, module_type(loader))
                    }
                    Err(diagnostics) => {
                        let message = format!("failed to parse {id}");
                        plugin.session.report_all(diagnostics);
                        Err(anyhow!(message))
                    }
                },
            }
        }
    }
}
