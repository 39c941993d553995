use super::bundle::bundle_files;
use super::check::check_files;
use crate::config::SkiffConfig;
use crate::error::{CliError, Result};
use crate::report::ResultEnvelope;
use crate::request::CompileRequest;
use skiff_check::CheckOutcome;

/// Type-check, then bundle.
///
/// Genuine type errors stop the compile. A checker that is missing, fails
/// to start or times out only adds a warning to the bundle result.
pub async fn execute(
    request: &CompileRequest,
    config: &SkiffConfig,
    skip_type_check: bool,
) -> Result<ResultEnvelope> {
    let files = request.file_map()?;

    let mut warning = None;
    if skip_type_check || request.skip_type_check {
        tracing::info!("type check skipped by request");
    } else {
        match check_files(&files, config).await {
            Ok(CheckOutcome::Failed { error, raw }) => {
                return Ok(ResultEnvelope::type_check_failed(&error, raw));
            }
            Ok(outcome) => warning = outcome.warning().map(str::to_string),
            Err(CliError::Check(e)) => {
                tracing::warn!(error = %e, "type check could not run, bundling anyway");
                warning = Some(format!("type check skipped: {e}"));
            }
            Err(e) => return Err(e),
        }
    }

    let artifact = bundle_files(&files, request, config).await?;
    Ok(ResultEnvelope::bundled(artifact).with_warning(warning))
}
