//! Content-gated writes of the generated artifacts.

use std::path::{Path, PathBuf};

use crate::core::error::ConfigureError;
use crate::util::config::Layout;
use crate::util::fs::{is_occupied, normalize_path, read_if_exists, symlink, write_string};

/// A generated file and its intended content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Artifact {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// What [`update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Write the artifact only if its content differs from what is on disk.
pub fn update(artifact: &Artifact) -> Result<WriteOutcome, ConfigureError> {
    let current = read_if_exists(&artifact.path)?;
    if current.as_deref() == Some(artifact.content.as_bytes()) {
        tracing::debug!("{} is up to date", artifact.path.display());
        return Ok(WriteOutcome::Unchanged);
    }

    tracing::info!("writing to {}", artifact.path.display());
    tracing::info!("\"\"\"\n{}\"\"\"", artifact.content);
    write_string(&artifact.path, &artifact.content)?;
    Ok(WriteOutcome::Written)
}

/// Link `<subproject>/<defines>` to the root fragment in every subproject.
///
/// Does nothing unless `invoked_from` is the project root. Anything already
/// at an alias path, even a link to somewhere else, is left alone. Returns the
/// aliases created.
pub fn link_aliases(layout: &Layout, invoked_from: &Path) -> Result<Vec<PathBuf>, ConfigureError> {
    if normalize_path(invoked_from) != normalize_path(layout.root()) {
        tracing::debug!(
            "not at project root ({}), skipping aliases",
            invoked_from.display()
        );
        return Ok(Vec::new());
    }

    let file_name = layout.defines_file_name();
    let target = Path::new("..").join(file_name);
    let mut created = Vec::new();

    for sub in layout.subprojects() {
        let dir = layout.root().join(sub);
        if !dir.is_dir() {
            continue;
        }
        let alias = dir.join(file_name);
        if is_occupied(&alias) {
            tracing::debug!("{} already exists, leaving it", alias.display());
            continue;
        }
        tracing::info!("ln -s {} {}", target.display(), alias.display());
        symlink(&target, &alias).map_err(|e| ConfigureError::io(&alias, e))?;
        created.push(alias);
    }

    Ok(created)
}
