//! Import resolution policy for the virtual file set.
//!
//! Resolution is a pure function of the specifier, the importer's virtual
//! path and the designated entry key. It never fails: anything that is not
//! project code degrades to [`ResolvedReference::External`]. Whether a
//! [`ResolvedReference::VirtualKey`] actually exists is decided later by
//! [`crate::loader::probe`].

use crate::files::normalize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Packages supplied by the execution environment, never bundled.
pub const RUNTIME_EXTERNALS: [&str; 3] = ["react", "react-dom", "react-dom/client"];

/// Project alias prefix, rewritten to [`SOURCE_ROOT`].
pub const ALIAS_PREFIX: &str = "@/";

/// Source-root segment the alias expands to.
pub const SOURCE_ROOT: &str = "src/";

/// Extensions that mark a bare specifier as a stylesheet resource.
pub const STYLESHEET_EXTENSIONS: [&str; 1] = [".css"];

/// Outcome of resolving one import edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ResolvedReference {
    /// The pipeline's designated entry module
    EntryPoint,
    /// A key inside the virtual file set (before extension probing)
    VirtualKey(String),
    /// A package stylesheet; contributes an empty stub and no code
    IgnoredStylesheet(String),
    /// A bare specifier left for the runtime to supply
    External(String),
}

/// Resolution policy bound to one request's entry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    entry: String,
}

impl Resolver {
    pub fn new(entry: impl AsRef<str>) -> Self {
        Self {
            entry: normalize(entry.as_ref()),
        }
    }

    /// The normalized entry key.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Resolve `specifier` as imported from `importer`.
    ///
    /// `importer` is `None` for the build's own entry request.
    pub fn resolve(&self, specifier: &str, importer: Option<&str>) -> ResolvedReference {
        if importer.is_none() || specifier == self.entry {
            return ResolvedReference::EntryPoint;
        }

        if RUNTIME_EXTERNALS.contains(&specifier) {
            return ResolvedReference::External(specifier.to_string());
        }

        if let Some(rest) = specifier.strip_prefix('/') {
            return ResolvedReference::VirtualKey(normalize(rest));
        }

        if let Some(rest) = specifier.strip_prefix(ALIAS_PREFIX) {
            return ResolvedReference::VirtualKey(normalize(&format!("{SOURCE_ROOT}{rest}")));
        }

        if specifier.starts_with('.') {
            let base = importer
                .and_then(|path| Path::new(path).parent())
                .map(|dir| dir.to_string_lossy().into_owned())
                .unwrap_or_default();
            let joined = if base.is_empty() {
                specifier.to_string()
            } else {
                format!("{base}/{specifier}")
            };
            return ResolvedReference::VirtualKey(normalize(&joined));
        }

        if is_stylesheet(specifier) {
            return ResolvedReference::IgnoredStylesheet(specifier.to_string());
        }

        ResolvedReference::External(specifier.to_string())
    }
}

/// Whether a specifier names a stylesheet resource by extension.
pub fn is_stylesheet(specifier: &str) -> bool {
    let path = specifier.split(['?', '#']).next().unwrap_or(specifier);
    STYLESHEET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// External specifiers encountered during one request.
///
/// Sorted and de-duplicated so the reported list is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExternalSet(BTreeSet<String>);

impl ExternalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reference if it is external. Returns `true` on first sight.
    pub fn record(&mut self, reference: &ResolvedReference) -> bool {
        match reference {
            ResolvedReference::External(specifier) => self.0.insert(specifier.clone()),
            _ => false,
        }
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.0.contains(specifier)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new("src/main.tsx")
    }

    fn key(s: &str) -> ResolvedReference {
        ResolvedReference::VirtualKey(s.to_string())
    }

    #[test]
    fn test_entry_point() {
        let r = resolver();
        assert_eq!(r.resolve("src/main.tsx", None), ResolvedReference::EntryPoint);
        assert_eq!(
            r.resolve("src/main.tsx", Some("src/App.tsx")),
            ResolvedReference::EntryPoint
        );
    }

    #[test]
    fn test_entry_is_normalized() {
        assert_eq!(Resolver::new("./src/main.tsx").entry(), "src/main.tsx");
    }

    #[test]
    fn test_root_absolute() {
        let r = resolver();
        assert_eq!(r.resolve("/src/lib/util", Some("src/App.tsx")), key("src/lib/util"));
        assert_eq!(r.resolve("/src/index.css", Some("src/main.tsx")), key("src/index.css"));
    }

    #[test]
    fn test_alias() {
        let r = resolver();
        assert_eq!(r.resolve("@/utils/x", Some("src/a/b.tsx")), key("src/utils/x"));
        assert_eq!(r.resolve("@/utils/x", Some("other/deep/y.ts")), key("src/utils/x"));
    }

    #[test]
    fn test_relative() {
        let r = resolver();
        assert_eq!(r.resolve("../d", Some("a/b/c.ts")), key("a/d"));
        assert_eq!(r.resolve("./a", Some("src/main.tsx")), key("src/a"));
        assert_eq!(r.resolve("./x/../y", Some("src/main.tsx")), key("src/y"));
        assert_eq!(r.resolve("./top", Some("root.ts")), key("top"));
    }

    #[test]
    fn test_relative_escape_stays_unresolvable() {
        let r = resolver();
        assert_eq!(r.resolve("../../x", Some("src/a.ts")), key("../x"));
    }

    #[test]
    fn test_bare_stylesheet_is_ignored() {
        let r = resolver();
        assert_eq!(
            r.resolve("some-lib/dist/style.css", Some("src/main.tsx")),
            ResolvedReference::IgnoredStylesheet("some-lib/dist/style.css".into())
        );
    }

    #[test]
    fn test_relative_stylesheet_is_virtual() {
        let r = resolver();
        assert_eq!(r.resolve("./index.css", Some("src/main.tsx")), key("src/index.css"));
    }

    #[test]
    fn test_bare_and_scoped_are_external() {
        let r = resolver();
        assert_eq!(
            r.resolve("lodash", Some("src/a.ts")),
            ResolvedReference::External("lodash".into())
        );
        assert_eq!(
            r.resolve("@tanstack/react-query", Some("src/a.ts")),
            ResolvedReference::External("@tanstack/react-query".into())
        );
    }

    #[test]
    fn test_runtime_externals() {
        let r = resolver();
        for name in RUNTIME_EXTERNALS {
            assert_eq!(
                r.resolve(name, Some("src/main.tsx")),
                ResolvedReference::External(name.into())
            );
        }
    }

    #[test]
    fn test_external_set_dedups() {
        let r = resolver();
        let mut set = ExternalSet::new();
        assert!(set.record(&r.resolve("react", Some("src/a.tsx"))));
        assert!(!set.record(&r.resolve("react", Some("src/b.tsx"))));
        assert!(!set.record(&r.resolve("./c", Some("src/b.tsx"))));
        assert!(set.record(&r.resolve("clsx", Some("src/b.tsx"))));
        assert!(set.contains("react"));
        assert!(!set.contains("./c"));
        assert_eq!(set.into_vec(), vec!["clsx".to_string(), "react".to_string()]);
    }

    #[test]
    fn test_serialized_shapes() {
        let reference = ResolvedReference::IgnoredStylesheet("pkg/a.css".into());
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            serde_json::json!({ "kind": "ignored_stylesheet", "target": "pkg/a.css" })
        );

        let mut set = ExternalSet::new();
        set.record(&ResolvedReference::External("react".into()));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["react"]"#);
    }

    #[test]
    fn test_is_stylesheet_ignores_query() {
        assert!(is_stylesheet("pkg/a.css?inline"));
        assert!(!is_stylesheet("pkg/a.scss.js"));
    }
}
