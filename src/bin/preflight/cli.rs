//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// preflight - configure a multi-library native tree before make runs
#[derive(Parser)]
#[command(name = "preflight")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the build configuration and write defines.mk and libconfig.h
    Configure(ConfigureArgs),

    /// Print what configure would write, without fetching or writing
    Show(ShowArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by `configure` and `show`.
#[derive(Args)]
pub struct ProjectArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, env = "PREFLIGHT_ROOT")]
    pub root: Option<PathBuf>,

    /// HDF5 header bundle directory name
    #[arg(long, env = "PREFLIGHT_HDF5_HEADERS_VERSION")]
    pub headers_version: Option<String>,

    /// URL of the HDF5 header bundle archive
    #[arg(long, env = "PREFLIGHT_HDF5_HEADERS_URL")]
    pub headers_url: Option<String>,

    /// Extra variables as KEY=VALUE; the environment wins on conflict
    #[arg(value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Fail when the flag combination selects no mode
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
