//! Request payloads.

use crate::error::{CliError, Result};
use serde::Deserialize;
use skiff_vfs::VirtualFileMap;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// One bundle, check or compile request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompileRequest {
    /// Virtual path to source text
    pub files: BTreeMap<String, String>,
    /// Substitutions for `process.env.NAME`; keys may be bare or qualified
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub skip_type_check: bool,
}

impl CompileRequest {
    /// The validated, normalized file set.
    pub fn file_map(&self) -> Result<VirtualFileMap> {
        if self.files.is_empty() {
            return Err(CliError::request(
                "project is empty: the request contains no files",
            ));
        }
        Ok(VirtualFileMap::from_entries(
            self.files.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )?)
    }
}

/// Parse a request from its JSON text.
pub fn parse_request(input: &str) -> Result<CompileRequest> {
    if input.trim().is_empty() {
        return Err(CliError::request("empty request payload"));
    }
    serde_json::from_str(input)
        .map_err(|e| CliError::request(format!("invalid request payload: {e}")))
}

/// Read the whole request from `path`, or stdin when `None`.
pub async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            Ok(input)
        }
    }
}
