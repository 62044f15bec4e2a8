//! `preflight configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use preflight::configure;
use preflight::sources::retriever_for;
use preflight::util::SystemRunner;

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let (env, settings) = super::load(&args.project)?;
    let settings = settings.strict(args.strict);

    let runner = SystemRunner;
    let retriever = retriever_for(&settings.headers, &runner);
    let report = configure(&env, &settings, &runner, retriever.as_ref())?;

    if let Some(ref plan) = report.plan {
        match report.changes() {
            0 => tracing::info!("{}: everything up to date", plan.mode),
            n => tracing::info!("{}: {} file(s) updated", plan.mode, n),
        }
    }

    Ok(())
}
