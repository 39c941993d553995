//! Layered configuration.
//!
//! Priority: environment (`SKIFF_*`) > `--config` file > `skiff.toml` > defaults.
//! Nested keys use `__` in environment variables, e.g.
//! `SKIFF_CHECK__TIMEOUT_SECS=30`.

use crate::error::{CliError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use skiff_check::{CheckOptions, CheckerLocator, DEFAULT_TIMEOUT_SECS, TscChecker};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "skiff.toml";

pub const ENV_PREFIX: &str = "SKIFF_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkiffConfig {
    pub bundle: BundleConfig,
    pub check: CheckConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Entry module key
    pub entry: String,
    /// Default for `process.env.NODE_ENV`
    pub node_env: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            entry: skiff_bundler::DEFAULT_ENTRY.to_string(),
            node_env: skiff_bundler::DEFAULT_NODE_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsc_path: Option<PathBuf>,
    /// Directory with a local `node_modules` holding TypeScript and shared types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain_dir: Option<PathBuf>,
    /// Overrides `<toolchain_dir>/node_modules` as the linked types directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types_dir: Option<PathBuf>,
    /// Also look on `PATH` and in nvm installs
    pub search_path: bool,
    /// Parent of the disposable scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            tsc_path: None,
            toolchain_dir: None,
            types_dir: None,
            search_path: true,
            scratch_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CheckConfig {
    pub fn locator(&self) -> CheckerLocator {
        CheckerLocator {
            tsc_path: self.tsc_path.clone(),
            toolchain_dir: self.toolchain_dir.clone(),
            search_path: self.search_path,
        }
    }

    /// The configured checker, if one can be found.
    pub fn checker(&self) -> Option<TscChecker> {
        let program = self.locator().locate()?;
        tracing::debug!(program = %program.display(), "located type checker");
        Some(TscChecker::new(program).with_timeout(self.timeout_secs))
    }

    pub fn options(&self) -> CheckOptions {
        let types_dir = self.types_dir.clone().or_else(|| {
            self.toolchain_dir
                .as_ref()
                .map(|dir| dir.join("node_modules"))
        });
        CheckOptions {
            scratch_dir: self.scratch_dir.clone(),
            types_dir,
        }
    }
}

impl SkiffConfig {
    /// Load from the working directory, an optional explicit file and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(Path::new("."), explicit)
    }

    /// Like [`SkiffConfig::load`], looking for `skiff.toml` in `dir`.
    pub fn load_from(dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let default_file = dir.join(DEFAULT_CONFIG_FILE);
        if default_file.is_file() {
            tracing::debug!(path = %default_file.display(), "loading config file");
            figment = figment.merge(Toml::file(default_file));
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CliError::ConfigNotFound(path.to_path_buf()));
            }
            tracing::debug!(path = %path.display(), "loading config file");
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SkiffConfig::default();
        assert_eq!(config.bundle.entry, "src/main.tsx");
        assert_eq!(config.bundle.node_env, "development");
        assert!(config.check.search_path);
        assert_eq!(config.check.timeout_secs, 120);
    }

    #[test]
    fn test_file_layers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[bundle]\nentry = \"src/index.tsx\"\n\n[check]\ntimeout_secs = 30\n",
        )
        .unwrap();
        let explicit = dir.path().join("override.json");
        std::fs::write(&explicit, r#"{ "check": { "timeout_secs": 45 } }"#).unwrap();

        let base = SkiffConfig::load_from(dir.path(), None).unwrap();
        assert_eq!(base.bundle.entry, "src/index.tsx");
        assert_eq!(base.check.timeout_secs, 30);
        assert_eq!(base.bundle.node_env, "development");

        let layered = SkiffConfig::load_from(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(layered.bundle.entry, "src/index.tsx");
        assert_eq!(layered.check.timeout_secs, 45);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SkiffConfig::load_from(dir.path(), Some(&dir.path().join("nope.toml")))
            .unwrap_err();
        assert!(matches!(err, CliError::ConfigNotFound(_)));
    }

    #[test]
    fn test_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[check]\ntimeout_secs = \"soon\"\n",
        )
        .unwrap();
        let err = SkiffConfig::load_from(dir.path(), None).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_types_dir_falls_back_to_toolchain() {
        let check = CheckConfig {
            toolchain_dir: Some(PathBuf::from("/opt/toolchain")),
            ..Default::default()
        };
        assert_eq!(
            check.options().types_dir,
            Some(PathBuf::from("/opt/toolchain/node_modules"))
        );

        let explicit = CheckConfig {
            types_dir: Some(PathBuf::from("/opt/types")),
            ..check
        };
        assert_eq!(explicit.options().types_dir, Some(PathBuf::from("/opt/types")));
    }
}
