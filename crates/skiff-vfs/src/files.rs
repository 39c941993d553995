//! The in-memory project: normalized virtual paths mapped to file text.

use crate::error::VfsError;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::path::{Component, Path};
use std::sync::Arc;

/// Maximum length of a virtual path in bytes.
pub const MAX_PATH_LEN: usize = 4096;

/// Maximum size of a single virtual file (5 MiB).
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Normalize a virtual path into its canonical key form.
///
/// Backslashes become `/`, leading `./` and `/` are stripped and `.`/`..`
/// segments are collapsed. The result may still begin with `..` when the
/// input escapes the project root; callers that require containment use
/// [`validate_key`].
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_start_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }

    let cleaned = Path::new(trimmed).clean();
    let mut out = String::with_capacity(trimmed.len());
    for component in cleaned.components() {
        let segment = match component {
            Component::Normal(s) => s.to_string_lossy(),
            Component::ParentDir => "..".into(),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
        };
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&segment);
    }
    out
}

/// Check that a normalized key is usable as a project-relative path.
pub fn validate_key(original: &str, key: &str) -> Result<(), VfsError> {
    if key.is_empty() {
        return Err(VfsError::invalid_path(original, "path is empty"));
    }
    if key.contains('\0') {
        return Err(VfsError::invalid_path(original, "path contains a null byte"));
    }
    if key.len() > MAX_PATH_LEN {
        return Err(VfsError::invalid_path(
            original,
            format!("path exceeds {MAX_PATH_LEN} bytes"),
        ));
    }
    if key == ".." || key.starts_with("../") {
        return Err(VfsError::invalid_path(
            original,
            "path escapes the project root",
        ));
    }
    Ok(())
}

/// The virtual file set of a single request.
///
/// Built once from the request payload and only read afterwards. Cloning is
/// cheap; the content map is shared.
#[derive(Debug, Clone, Default)]
pub struct VirtualFileMap {
    files: Arc<FxHashMap<String, String>>,
}

impl VirtualFileMap {
    /// Build a map from raw `(path, content)` pairs, normalizing every key.
    ///
    /// Two raw paths that normalize to the same key are rejected rather than
    /// silently overwritten.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, VfsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut files = FxHashMap::default();
        for (raw, content) in entries {
            let raw = raw.as_ref();
            let key = normalize(raw);
            validate_key(raw, &key)?;

            let content = content.into();
            if content.len() > MAX_FILE_SIZE {
                return Err(VfsError::FileTooLarge {
                    path: key,
                    size: content.len(),
                    max: MAX_FILE_SIZE,
                });
            }

            if files.contains_key(&key) {
                return Err(VfsError::invalid_path(
                    raw,
                    format!("duplicates existing key '{key}'"),
                ));
            }
            files.insert(key, content);
        }

        tracing::debug!(files = files.len(), "virtual file set created");
        Ok(Self {
            files: Arc::new(files),
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.files.get(key).map(String::as_str)
    }

    /// The stored key and content for `key`.
    pub fn get_entry(&self, key: &str) -> Option<(&str, &str)> {
        self.files
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Keys in sorted order, for deterministic iteration.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.files.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// `(key, content)` pairs in sorted key order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sorted_keys()
            .into_iter()
            .filter_map(|key| self.get(key).map(|content| (key, content)))
    }
}
