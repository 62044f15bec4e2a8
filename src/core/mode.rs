//! Configuration mode selection.
//!
//! The mode is picked once from three environment flags and never changes
//! for the rest of the run.
//!
//! | `NOPBBAM` | `NOHDF` | `HDF5_LIB` | result                 |
//! |-----------|---------|------------|------------------------|
//! | unset     | any     | any        | `InternalPacbio`       |
//! | set       | set     | any        | `ExternalNoHdf`        |
//! | set       | unset   | set        | `ExternalWithHdf`      |
//! | set       | unset   | unset      | `ExternalFetchHeaders` |
//!
//! The table covers every flag combination. [`Selection::Unconfigured`] is
//! the terminal state a run accepts in place of a mode; it writes nothing.

use std::fmt;

use serde::Serialize;

use crate::core::environment::Environment;
use crate::core::error::ConfigureError;

/// Flag marking a build outside the internal tree (no pbbam).
pub const EXTERNAL_BUILD_FLAG: &str = "NOPBBAM";

/// Flag disabling HDF5 entirely.
pub const NO_HDF5_FLAG: &str = "NOHDF";

/// Location of prebuilt HDF5 libraries.
pub const HDF5_LIB_VAR: &str = "HDF5_LIB";

/// One of the four mutually exclusive resolution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigMode {
    /// Internal build: full cascade, aliases, OS string and pbbam support.
    InternalPacbio,
    /// External build without HDF5; the `hdf` subproject is skipped.
    ExternalNoHdf,
    /// External build against HDF5 headers and libraries from the environment.
    ExternalWithHdf,
    /// External build against a fetched HDF5 header bundle.
    ExternalFetchHeaders,
}

impl ConfigMode {
    pub fn is_internal(self) -> bool {
        self == ConfigMode::InternalPacbio
    }

    pub fn name(self) -> &'static str {
        match self {
            ConfigMode::InternalPacbio => "internal-pacbio",
            ConfigMode::ExternalNoHdf => "external-no-hdf",
            ConfigMode::ExternalWithHdf => "external-with-hdf",
            ConfigMode::ExternalFetchHeaders => "external-fetch-headers",
        }
    }
}

impl fmt::Display for ConfigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of mode selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Mode(ConfigMode),
    /// No recognized flag combination; nothing will be written.
    Unconfigured { reason: String },
}

impl Selection {
    pub fn mode(&self) -> Option<ConfigMode> {
        match self {
            Selection::Mode(mode) => Some(*mode),
            Selection::Unconfigured { .. } => None,
        }
    }

    /// The unconfigured state as an error, for callers that treat it as one.
    pub fn into_error(self) -> Option<ConfigureError> {
        match self {
            Selection::Mode(_) => None,
            Selection::Unconfigured { reason } => Some(ConfigureError::UnresolvedMode { reason }),
        }
    }
}

/// Pick the configuration mode for this environment.
pub fn select_mode(env: &Environment) -> Selection {
    let external = env.contains(EXTERNAL_BUILD_FLAG);
    let no_hdf5 = env.contains(NO_HDF5_FLAG);
    let hdf5_lib = env.contains(HDF5_LIB_VAR);

    let mode = match (external, no_hdf5, hdf5_lib) {
        (false, _, _) => ConfigMode::InternalPacbio,
        (true, true, _) => ConfigMode::ExternalNoHdf,
        (true, false, true) => ConfigMode::ExternalWithHdf,
        (true, false, false) => ConfigMode::ExternalFetchHeaders,
    };
    let selection = Selection::Mode(mode);

    tracing::debug!(
        external,
        no_hdf5,
        hdf5_lib,
        "selected {:?}",
        selection
    );
    selection
}
