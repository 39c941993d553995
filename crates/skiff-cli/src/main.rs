//! Skiff CLI entry point.

use clap::Parser;
use skiff_cli::{CliError, ResultEnvelope, cli, commands, logger};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = cli::Cli::parse();
    logger::init_logger(args.verbose, args.quiet, args.no_color);

    // A separate task turns panics into failure envelopes.
    let result = match tokio::spawn(commands::run(args)).await {
        Ok(result) => result,
        Err(join) => Err(CliError::from_join(join)),
    };

    let envelope = result.unwrap_or_else(|err| {
        tracing::error!("{err}");
        ResultEnvelope::from(&err)
    });

    envelope
        .emit()
        .map_err(|e| miette::Report::new(CliError::Io(e)))
}
