//! Configuration error types and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error raised while configuring the build.
///
/// Every variant except [`ConfigureError::UnresolvedMode`] aborts the run
/// before the affected artifact is written.
#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("`{variable}` is set but none of {} is", .accepted.join(", "))]
    MissingCompanionVariable {
        variable: String,
        accepted: Vec<String>,
    },

    #[error("`{command}` failed with exit code {}", display_status(.status))]
    ExternalCommandFailure {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("no configuration mode matches the environment: {reason}")]
    UnresolvedMode { reason: String },

    #[error("invalid assignment `{argument}`: expected KEY=VALUE")]
    InvalidAssignment { argument: String },

    #[error("header bundle `{version}` was retrieved but {} does not exist", .dir.display())]
    IncompleteBundle { version: String, dir: PathBuf },

    #[error("i/o error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "<signal>".to_string(),
    }
}

impl ConfigureError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigureError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigureError::MissingCompanionVariable { variable, accepted } => {
                Diagnostic::error(format!("`{}` is set without an include path", variable))
                    .with_context(format!("accepted companions: {}", accepted.join(", ")))
                    .with_suggestion(format!(
                        "Export {} alongside {}",
                        accepted.first().map(String::as_str).unwrap_or("the include path"),
                        variable
                    ))
            }

            ConfigureError::ExternalCommandFailure {
                command,
                status,
                stderr,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "`{}` exited with status {}",
                    command,
                    display_status(status)
                ));
                for line in stderr.lines().filter(|l| !l.trim().is_empty()).take(10) {
                    diag = diag.with_context(line.to_string());
                }
                diag
            }

            ConfigureError::UnresolvedMode { reason } => {
                Diagnostic::warning(format!("nothing configured: {}", reason))
                    .with_suggestion("Set NOPBBAM for an external build")
                    .with_suggestion("Unset NOHDF for the internal build")
            }

            ConfigureError::InvalidAssignment { argument } => {
                Diagnostic::error(format!("cannot parse `{}`", argument))
                    .with_suggestion("Pass trailing arguments as KEY=VALUE, e.g. HDF5_INC=/opt/hdf5/include")
            }

            ConfigureError::IncompleteBundle { version, dir } => {
                Diagnostic::error(format!("header bundle `{}` is incomplete", version))
                    .with_location(dir.clone())
                    .with_suggestion("Check that the archive unpacks into a directory named after its version")
            }

            ConfigureError::Io { path, source } => {
                Diagnostic::error(source.to_string()).with_location(path.clone())
            }
        }
    }
}
