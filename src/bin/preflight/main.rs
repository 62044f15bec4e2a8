//! preflight CLI - build-preflight configurator

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use preflight::util::diagnostic::{emit, Severity};
use preflight::ConfigureError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ConfigureError>() {
            Some(err) => {
                let mut diag = err.to_diagnostic();
                diag.severity = Severity::Error;
                emit(&diag, color);
            }
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("preflight=debug")
    } else {
        EnvFilter::new("preflight=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args),
        Commands::Show(args) => commands::show::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
