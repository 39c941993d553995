//! Command-line interface definition.
//!
//! - `skiff bundle` - bundle an in-memory project
//! - `skiff check` - type-check an in-memory project
//! - `skiff compile` - type-check, then bundle

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Skiff - bundle and type-check in-memory TypeScript projects
#[derive(Parser, Debug)]
#[command(
    name = "skiff",
    version,
    about = "Bundle and type-check in-memory TypeScript projects",
    long_about = "Skiff reads a JSON request holding a project's files, bundles it with Rolldown\n\
                  or type-checks it with tsc in a throwaway directory, and prints a single JSON\n\
                  result on stdout. Logs go to stderr."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file (TOML, or JSON by extension) layered over skiff.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bundle the project into a single program
    ///
    /// Prints {success, output, externals} or {success: false, error}.
    Bundle(RequestArgs),

    /// Type-check the project
    ///
    /// Prints {success, output, warning?} or {success: false, error, raw}.
    Check(RequestArgs),

    /// Type-check, then bundle if the check passes
    Compile(CompileArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Read the request from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CompileArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Bundle without type-checking first
    #[arg(long)]
    pub skip_type_check: bool,
}

impl Command {
    pub fn request(&self) -> &RequestArgs {
        match self {
            Command::Bundle(args) | Command::Check(args) => args,
            Command::Compile(args) => &args.request,
        }
    }
}
