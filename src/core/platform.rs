//! Host OS detection and the link defaults derived from it.

use std::fmt;

use serde::Serialize;

use crate::core::error::ConfigureError;
use crate::util::process::{run_checked, CommandRunner, ProcessBuilder};

/// Operating system family of the build host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OsKind {
    Linux,
    Darwin,
    Unknown,
}

impl OsKind {
    /// Classify the output of `uname -s`.
    pub fn from_uname(uname: &str) -> OsKind {
        match uname.trim() {
            "Linux" => OsKind::Linux,
            "Darwin" => OsKind::Darwin,
            _ => OsKind::Unknown,
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsKind::Linux => write!(f, "linux"),
            OsKind::Darwin => write!(f, "darwin"),
            OsKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Link defaults for the detected OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub os: OsKind,
    /// Shared library suffix (`SH_LIB_EXT`).
    pub shlib_ext: &'static str,
    /// Linker flag that embeds the library's install name (`SET_LIB_NAME`).
    pub set_lib_name: &'static str,
    /// Extra link flags (`EXTRA_LDFLAGS`), Darwin only.
    pub extra_ldflags: Option<&'static str>,
}

impl Platform {
    pub fn for_os(os: OsKind) -> Platform {
        match os {
            OsKind::Darwin => Platform {
                os,
                shlib_ext: ".dylib",
                set_lib_name: "-install_name",
                extra_ldflags: Some("-flat_namespace"),
            },
            OsKind::Linux | OsKind::Unknown => Platform {
                os,
                shlib_ext: ".so",
                set_lib_name: "-soname",
                extra_ldflags: None,
            },
        }
    }

    /// Key/value pairs this platform contributes to the fragment.
    pub fn defaults(&self) -> Vec<(&'static str, &'static str)> {
        let mut out = vec![
            ("SH_LIB_EXT", self.shlib_ext),
            ("SET_LIB_NAME", self.set_lib_name),
        ];
        if let Some(flags) = self.extra_ldflags {
            out.push(("EXTRA_LDFLAGS", flags));
        }
        out
    }
}

/// Identify the host with `uname -s`.
///
/// Never fails: any problem degrades to [`OsKind::Unknown`].
pub fn probe(runner: &dyn CommandRunner) -> Platform {
    let os = match run_checked(runner, &ProcessBuilder::new("uname").arg("-s")) {
        Ok(out) => {
            let os = OsKind::from_uname(&out);
            if os == OsKind::Unknown {
                tracing::warn!("unrecognized OS `{}`, using generic defaults", out);
            }
            os
        }
        Err(e) => {
            tracing::warn!("could not identify OS ({}), using generic defaults", e);
            OsKind::Unknown
        }
    };
    tracing::debug!("host OS: {}", os);
    Platform::for_os(os)
}

/// Probe a `distro-release` tag such as `ubuntu-14.04` or `centos-6`.
pub fn probe_os_string(runner: &dyn CommandRunner, os: OsKind) -> Result<String, ConfigureError> {
    if os == OsKind::Linux {
        let id = run_checked(runner, &ProcessBuilder::new("lsb_release").arg("-si"))?;
        let release = run_checked(runner, &ProcessBuilder::new("lsb_release").arg("-sr"))?;
        Ok(format_os_string(&id, &release))
    } else {
        let release = run_checked(runner, &ProcessBuilder::new("uname").arg("-r"))?;
        Ok(format_os_string(&os.to_string(), &release))
    }
}

/// Ubuntu keeps `major.minor`; everything else keeps the major release.
fn format_os_string(id: &str, release: &str) -> String {
    let id = id.trim().to_lowercase();
    let keep = if id == "ubuntu" { 2 } else { 1 };
    let release: Vec<&str> = release.trim().split('.').take(keep).collect();
    format!("{}-{}", id, release.join("."))
}
