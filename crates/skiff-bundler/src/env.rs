//! Build-time environment substitution values.

use rustc_hash::FxHashMap;

/// Default value of `process.env.NODE_ENV` when the request supplies none.
pub const DEFAULT_NODE_ENV: &str = "development";

const QUALIFIED_PREFIX: &str = "process.env.";

/// `process.env.NAME` replacements, stored as ready-to-splice JSON literals.
#[derive(Debug, Clone, Default)]
pub struct EnvSubstitutions {
    literals: FxHashMap<String, String>,
}

impl EnvSubstitutions {
    /// Build from request variables.
    ///
    /// Names may be bare (`API_URL`) or qualified (`process.env.API_URL`).
    /// `NODE_ENV` is set to `node_env` unless the request overrides it.
    pub fn new<I, K, V>(vars: I, node_env: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut literals = FxHashMap::default();
        literals.insert("NODE_ENV".to_string(), json_literal(node_env));

        for (name, value) in vars {
            let name = name.as_ref().trim();
            let name = name.strip_prefix(QUALIFIED_PREFIX).unwrap_or(name);
            if !is_identifier(name) {
                tracing::warn!(name, "ignoring environment substitution with invalid name");
                continue;
            }
            literals.insert(name.to_string(), json_literal(value.as_ref()));
        }

        Self { literals }
    }

    /// JSON string literal for `name`, if one was supplied.
    pub fn literal(&self, name: &str) -> Option<&str> {
        self.literals.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

fn json_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
