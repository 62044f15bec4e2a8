//! Command implementations

pub mod completions;
pub mod configure;
pub mod show;

use anyhow::{Context, Result};

use crate::cli::ProjectArgs;
use preflight::core::environment::parse_assignment;
use preflight::core::schema::is_recognized;
use preflight::{Environment, Settings};

/// Snapshot the environment and build run settings from the shared options.
pub(crate) fn load(project: &ProjectArgs) -> Result<(Environment, Settings)> {
    for arg in &project.assignments {
        let (key, _) = parse_assignment(arg)?;
        if !is_recognized(key) {
            tracing::debug!("`{}` is not read by any mode", key);
        }
    }
    let env = Environment::capture().with_assignments(&project.assignments)?;

    let root = match project.root {
        Some(ref root) => root.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let mut settings = Settings::new(&root)?;
    if project.headers_version.is_some() || project.headers_url.is_some() {
        settings = settings
            .with_headers(
                project.headers_version.as_deref(),
                project.headers_url.as_deref(),
            )
            .context("invalid header bundle settings")?;
    }

    Ok((env, settings))
}
