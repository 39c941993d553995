//! The result envelope printed on stdout.

use crate::error::CliError;
use serde::Serialize;
use skiff_bundler::CompiledArtifact;
use skiff_check::CheckOutcome;
use std::io::Write;

/// Prefix of the error text when a compile is rejected by the type check.
pub const TYPE_CHECK_FAILED: &str = "Type Check Failed:";

/// `{success, output?, error?, raw?, externals?, warning?}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub externals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ResultEnvelope {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn bundled(artifact: CompiledArtifact) -> Self {
        Self {
            externals: Some(artifact.externals),
            ..Self::success(artifact.code)
        }
    }

    pub fn checked(outcome: &CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Failed { error, raw } => Self {
                raw: Some(raw.clone()),
                ..Self::failure(error.clone())
            },
            other => Self {
                warning: other.warning().map(str::to_string),
                ..Self::success(other.message())
            },
        }
    }

    /// A compile stopped by genuine type errors.
    pub fn type_check_failed(error: &str, raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Self::failure(format!("{TYPE_CHECK_FAILED}\n{error}"))
        }
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        if warning.is_some() {
            self.warning = warning;
        }
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Print as one line of JSON on stdout.
    pub fn emit(&self) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}")?;
        stdout.flush()
    }
}

impl From<&CliError> for ResultEnvelope {
    fn from(err: &CliError) -> Self {
        Self::failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn value(envelope: &ResultEnvelope) -> Value {
        serde_json::from_str(&envelope.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_bundle_success_shape() {
        let envelope = ResultEnvelope::bundled(CompiledArtifact {
            code: "console.log(1);\n".into(),
            css: None,
            externals: vec!["react".into()],
        });
        assert_eq!(
            value(&envelope),
            json!({ "success": true, "output": "console.log(1);\n", "externals": ["react"] })
        );
    }

    #[test]
    fn test_failure_omits_absent_fields() {
        let envelope = ResultEnvelope::failure("empty request payload");
        assert_eq!(
            value(&envelope),
            json!({ "success": false, "error": "empty request payload" })
        );
    }

    #[test]
    fn test_check_shapes() {
        let failed = ResultEnvelope::checked(&CheckOutcome::Failed {
            error: "/virtual/src/a.ts(1,1): error TS2322: x".into(),
            raw: "raw text".into(),
        });
        assert_eq!(
            value(&failed),
            json!({ "success": false, "error": "/virtual/src/a.ts(1,1): error TS2322: x", "raw": "raw text" })
        );

        let skipped = ResultEnvelope::checked(&CheckOutcome::Unavailable {
            warning: skiff_check::UNAVAILABLE_WARNING.into(),
        });
        assert!(skipped.success);
        assert_eq!(skipped.warning.as_deref(), Some(skiff_check::UNAVAILABLE_WARNING));
    }

    #[test]
    fn test_type_check_failed_prefix() {
        let envelope = ResultEnvelope::type_check_failed("src/a.ts(1,1): error TS2322: x", "raw");
        assert_eq!(
            envelope.error.as_deref(),
            Some("Type Check Failed:\nsrc/a.ts(1,1): error TS2322: x")
        );
        assert_eq!(envelope.raw.as_deref(), Some("raw"));
    }
}
