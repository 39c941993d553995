//! Command implementations.
//!
//! Each command takes a parsed request and the loaded configuration and
//! produces the envelope to print. [`run`] is the whole invocation: load
//! config, read the request, dispatch.

pub mod bundle;
pub mod check;
pub mod compile;

use crate::cli::{Cli, Command};
use crate::config::SkiffConfig;
use crate::error::Result;
use crate::report::ResultEnvelope;
use crate::request::{parse_request, read_input};

pub use bundle::execute as bundle_execute;
pub use check::execute as check_execute;
pub use compile::execute as compile_execute;

/// Run one CLI invocation to an envelope.
pub async fn run(cli: Cli) -> Result<ResultEnvelope> {
    let config = SkiffConfig::load(cli.config.as_deref())?;

    let input = read_input(cli.command.request().input.as_deref()).await?;
    let request = parse_request(&input)?;
    tracing::debug!(files = request.files.len(), "parsed request");

    match cli.command {
        Command::Bundle(_) => bundle_execute(&request, &config).await,
        Command::Check(_) => check_execute(&request, &config).await,
        Command::Compile(args) => compile_execute(&request, &config, args.skip_type_check).await,
    }
}
