use crate::config::SkiffConfig;
use crate::error::Result;
use crate::report::ResultEnvelope;
use crate::request::CompileRequest;
use skiff_check::{CheckOutcome, TypeChecker, validate};
use skiff_vfs::VirtualFileMap;

/// Type-check the request's project.
pub async fn execute(request: &CompileRequest, config: &SkiffConfig) -> Result<ResultEnvelope> {
    let files = request.file_map()?;
    let outcome = check_files(&files, config).await?;
    Ok(ResultEnvelope::checked(&outcome))
}

pub(crate) async fn check_files(files: &VirtualFileMap, config: &SkiffConfig) -> Result<CheckOutcome> {
    let checker = config.check.checker();
    let outcome = validate(
        files,
        checker.as_ref().map(|c| c as &dyn TypeChecker),
        &config.check.options(),
    )
    .await?;

    if outcome.is_success() {
        tracing::info!("{}", outcome.message());
    } else {
        tracing::info!("type check reported errors");
    }
    Ok(outcome)
}
