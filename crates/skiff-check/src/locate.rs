//! Discovery of the TypeScript compiler.

use std::path::{Path, PathBuf};

#[cfg(windows)]
const TSC_BIN: &str = "tsc.cmd";
#[cfg(not(windows))]
const TSC_BIN: &str = "tsc";

/// Where to look for `tsc`, in order.
///
/// 1. an explicit path
/// 2. `<toolchain_dir>/node_modules/.bin/tsc`
/// 3. `tsc` on `PATH`
/// 4. the newest nvm-managed node install
#[derive(Debug, Clone, Default)]
pub struct CheckerLocator {
    pub tsc_path: Option<PathBuf>,
    pub toolchain_dir: Option<PathBuf>,
    pub search_path: bool,
}

impl CheckerLocator {
    pub fn new() -> Self {
        Self {
            search_path: true,
            ..Default::default()
        }
    }

    pub fn with_tsc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tsc_path = Some(path.into());
        self
    }

    pub fn with_toolchain_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.toolchain_dir = Some(dir.into());
        self
    }

    pub fn search_path(mut self, enabled: bool) -> Self {
        self.search_path = enabled;
        self
    }

    /// The first candidate that exists, if any.
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.tsc_path {
            if explicit.is_file() {
                return Some(explicit.clone());
            }
            tracing::warn!(path = %explicit.display(), "configured tsc_path does not exist");
        }

        if let Some(local) = self.toolchain_dir.as_deref().and_then(local_bin) {
            return Some(local);
        }

        if !self.search_path {
            return None;
        }

        if let Ok(global) = which::which("tsc") {
            return Some(global);
        }

        find_nvm_tsc()
    }
}

fn local_bin(toolchain_dir: &Path) -> Option<PathBuf> {
    let candidate = toolchain_dir.join("node_modules").join(".bin").join(TSC_BIN);
    candidate.is_file().then_some(candidate)
}

/// `tsc` from the newest `$NVM_DIR/versions/node/v*` install that ships one.
fn find_nvm_tsc() -> Option<PathBuf> {
    let nvm_dir = std::env::var_os("NVM_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".nvm")))?;
    newest_install_with_tsc(&nvm_dir.join("versions").join("node"))
}

fn newest_install_with_tsc(versions_dir: &Path) -> Option<PathBuf> {
    let mut installs: Vec<_> = std::fs::read_dir(versions_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            parse_node_version(&name).map(|version| (version, entry.path()))
        })
        .collect();
    installs.sort_by(|a, b| b.0.cmp(&a.0));

    installs
        .into_iter()
        .map(|(_, dir)| dir.join("bin").join(TSC_BIN))
        .find(|tsc| tsc.is_file())
}

fn parse_node_version(name: &str) -> Option<(u64, u64, u64)> {
    let mut parts = name.strip_prefix('v')?.splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    Some((major, minor, patch))
}
