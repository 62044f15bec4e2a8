//! Run settings: where the project lives and which header bundle to use.
//!
//! Build variables themselves only come from the environment; these settings
//! describe the configurator's own inputs and are filled from the command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sources::headers::{HeaderSource, HDF5_HEADERS_URL, HDF5_HEADERS_VERSION};
use crate::util::fs::clean_path;

/// Defines fragment, relative to the project root.
pub const DEFINES_FILE: &str = "defines.mk";

/// Config header, relative to the project root.
pub const CONFIG_HEADER: &str = "pbdata/libconfig.h";

/// Header bundle cache, relative to the project root.
pub const HEADER_CACHE_DIR: &str = "hdf";

/// Subprojects that receive an alias of the defines fragment.
pub const SUBPROJECTS: &[&str] = &["pbdata", "hdf", "alignment", "unittest"];

/// Paths of the generated artifacts under a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Layout rooted at `root`, made absolute against the current directory.
    ///
    /// `.` and `..` components are folded away, since the root ends up
    /// verbatim in the generated fragment.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()
                .context("failed to get current directory")?
                .join(root)
        };
        Ok(Layout {
            root: clean_path(&root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn defines_file_name(&self) -> &'static str {
        DEFINES_FILE
    }

    pub fn defines_path(&self) -> PathBuf {
        self.root.join(DEFINES_FILE)
    }

    pub fn config_header_path(&self) -> PathBuf {
        self.root.join(CONFIG_HEADER)
    }

    pub fn header_cache_dir(&self) -> PathBuf {
        self.root.join(HEADER_CACHE_DIR)
    }

    pub fn subprojects(&self) -> &'static [&'static str] {
        SUBPROJECTS
    }
}

/// Everything a configure run needs besides the environment snapshot.
#[derive(Debug, Clone)]
pub struct Settings {
    pub layout: Layout,
    /// Directory the configurator was started from.
    pub invoked_from: PathBuf,
    pub headers: HeaderSource,
    /// Treat an unrecognized flag combination as an error.
    pub strict: bool,
}

impl Settings {
    /// Settings for `root` with the pinned header bundle.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Settings {
            layout: Layout::new(root)?,
            invoked_from: std::env::current_dir().context("failed to get current directory")?,
            headers: HeaderSource::default(),
            strict: false,
        })
    }

    /// Override the header bundle version and/or URL.
    pub fn with_headers(mut self, version: Option<&str>, url: Option<&str>) -> Result<Self> {
        self.headers = HeaderSource::new(
            version.unwrap_or(HDF5_HEADERS_VERSION),
            url.unwrap_or(HDF5_HEADERS_URL),
        )?;
        Ok(self)
    }

    pub fn with_invoked_from(mut self, dir: impl Into<PathBuf>) -> Self {
        self.invoked_from = dir.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
