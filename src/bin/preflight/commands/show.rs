//! `preflight show` command
//!
//! Resolves and composes like `configure` but never fetches or writes.

use anyhow::Result;

use crate::cli::ShowArgs;
use preflight::core::select_mode;
use preflight::ops::plan;
use preflight::util::SystemRunner;
use preflight::Selection;

pub fn execute(args: ShowArgs) -> Result<()> {
    let (env, settings) = super::load(&args.project)?;

    let mode = match select_mode(&env) {
        Selection::Mode(mode) => mode,
        Selection::Unconfigured { reason } => {
            if args.json {
                let value = serde_json::json!({ "mode": null, "reason": reason });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("mode: unconfigured ({})", reason);
            }
            return Ok(());
        }
    };

    let plan = plan(&env, mode, &settings, &SystemRunner, None)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("mode: {}", plan.mode);
    println!("os: {}", plan.platform.os);
    if let Some(ref bundle) = plan.headers {
        let state = if bundle.dir.is_dir() { "present" } else { "not fetched" };
        println!("headers: {} ({})", bundle.dir.display(), state);
    }
    println!();
    println!("# {}", settings.layout.defines_path().display());
    print!("{}", plan.fragments.defines);
    println!();
    println!("# {}", settings.layout.config_header_path().display());
    print!("{}", plan.fragments.config_header);

    Ok(())
}
