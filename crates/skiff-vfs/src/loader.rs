//! Content loading: exact lookup, extension probing and loader classification.

use crate::error::VfsError;
use crate::files::VirtualFileMap;
use serde::Serialize;
use std::path::Path;

/// Extensions tried, in order, when a resolved key has no exact match.
pub const PROBE_EXTENSIONS: [&str; 6] = [".tsx", ".ts", ".jsx", ".js", ".css", ".json"];

/// How a virtual file's content is interpreted.
///
/// Derived purely from the path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    /// `.js`: script that may contain embedded markup
    Js,
    /// `.jsx`
    Jsx,
    /// `.ts`
    Ts,
    /// `.tsx`
    Tsx,
    /// `.css`
    Css,
    /// `.json`
    Json,
    /// Anything else, loaded as opaque text
    Text,
}

impl LoaderKind {
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("js") => Self::Js,
            Some("jsx") => Self::Jsx,
            Some("ts") => Self::Ts,
            Some("tsx") => Self::Tsx,
            Some("css") => Self::Css,
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }

    /// Whether the content is a script module.
    pub fn is_script(self) -> bool {
        matches!(self, Self::Js | Self::Jsx | Self::Ts | Self::Tsx)
    }

    pub fn is_typed(self) -> bool {
        matches!(self, Self::Ts | Self::Tsx)
    }

    /// Whether markup (JSX) syntax is accepted.
    pub fn allows_markup(self) -> bool {
        matches!(self, Self::Js | Self::Jsx | Self::Tsx)
    }
}

/// A file read out of the virtual set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedFile<'a> {
    /// The key that actually matched, after probing
    pub key: &'a str,
    pub content: &'a str,
    pub loader: LoaderKind,
}

/// Find the key a resolved reference points at.
///
/// Exact match first, then each of [`PROBE_EXTENSIONS`] appended in order.
pub fn probe<'a>(key: &str, files: &'a VirtualFileMap) -> Result<&'a str, VfsError> {
    let mut candidates = Vec::with_capacity(PROBE_EXTENSIONS.len() + 1);
    candidates.push(key.to_string());
    candidates.extend(PROBE_EXTENSIONS.iter().map(|ext| format!("{key}{ext}")));

    for candidate in &candidates {
        if let Some((found, _)) = files.get_entry(candidate) {
            return Ok(found);
        }
    }

    Err(VfsError::not_found(key, candidates))
}

/// Load the content behind a resolved virtual key.
pub fn load<'a>(key: &str, files: &'a VirtualFileMap) -> Result<LoadedFile<'a>, VfsError> {
    let found = probe(key, files)?;
    let content = files
        .get(found)
        .ok_or_else(|| VfsError::not_found(found, vec![found.to_string()]))?;

    Ok(LoadedFile {
        key: found,
        content,
        loader: LoaderKind::from_path(found),
    })
}
