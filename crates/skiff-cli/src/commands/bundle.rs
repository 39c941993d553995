use crate::config::SkiffConfig;
use crate::error::Result;
use crate::report::ResultEnvelope;
use crate::request::CompileRequest;
use skiff_bundler::{BundleOptions, CompiledArtifact, EnvSubstitutions};
use skiff_vfs::VirtualFileMap;

/// Bundle the request's project.
pub async fn execute(request: &CompileRequest, config: &SkiffConfig) -> Result<ResultEnvelope> {
    let files = request.file_map()?;
    let artifact = bundle_files(&files, request, config).await?;
    Ok(ResultEnvelope::bundled(artifact))
}

pub(crate) async fn bundle_files(
    files: &VirtualFileMap,
    request: &CompileRequest,
    config: &SkiffConfig,
) -> Result<CompiledArtifact> {
    let env = EnvSubstitutions::new(&request.env_vars, &config.bundle.node_env);
    let options = BundleOptions::new(&config.bundle.entry).with_env(env);

    let artifact = skiff_bundler::bundle(files, &options).await?;
    tracing::info!(
        bytes = artifact.code.len(),
        externals = artifact.externals.len(),
        "bundle complete"
    );
    Ok(artifact)
}
