//! Versioned HDF5 header bundles.
//!
//! A bundle lives in `<cache>/<version>/` and is fetched at most once; an
//! existing directory is trusted as-is.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::core::error::ConfigureError;
use crate::util::process::{find_executable, run_checked, CommandRunner, ProcessBuilder};

/// Pinned bundle version. The archive unpacks into a directory of this name.
pub const HDF5_HEADERS_VERSION: &str = "hdf5-1.8.12-headers";

/// Upstream location of the pinned bundle.
pub const HDF5_HEADERS_URL: &str =
    "https://www.dropbox.com/s/8971bcyy5o42rxb/hdf5-1.8.12-headers.tar.bz2?dl=0";

/// Which bundle to fetch and where from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSource {
    pub version: String,
    pub url: Url,
}

impl HeaderSource {
    pub fn new(version: impl Into<String>, url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(url).map_err(|e| anyhow::anyhow!("invalid bundle URL `{}`: {}", url, e))?;
        Ok(HeaderSource {
            version: version.into(),
            url,
        })
    }

    /// Whether the archive is gzip-compressed.
    pub fn is_gzip(&self) -> bool {
        let path = self.url.path();
        path.ends_with(".tar.gz") || path.ends_with(".tgz")
    }
}

impl Default for HeaderSource {
    fn default() -> Self {
        HeaderSource {
            version: HDF5_HEADERS_VERSION.to_string(),
            url: Url::parse(HDF5_HEADERS_URL).expect("pinned URL parses"),
        }
    }
}

/// A header bundle present on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderBundle {
    pub version: String,
    pub dir: PathBuf,
}

impl HeaderBundle {
    /// Directories to put on the compiler include path.
    pub fn include_dirs(&self) -> [PathBuf; 2] {
        [self.dir.join("src"), self.dir.join("c++").join("src")]
    }
}

/// Retrieve an archive and unpack it into a directory.
pub trait ArchiveRetriever {
    /// Short name of the retrieval backend, for logs.
    fn name(&self) -> &'static str;

    fn retrieve_and_extract(&self, url: &Url, dest: &Path) -> Result<(), ConfigureError>;
}

/// Streams the archive through `curl | tar` in the destination directory.
pub struct ShellRetriever<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ShellRetriever<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        ShellRetriever { runner }
    }

    fn command(url: &Url, dest: &Path) -> ProcessBuilder {
        let flags = if url.path().ends_with(".bz2") {
            "xjf"
        } else {
            "xf"
        };
        // The URL travels as `$1` and never becomes part of the script text.
        ProcessBuilder::shell(format!("curl -k -L \"$1\" | tar {} -", flags))
            .arg("sh")
            .arg(url.as_str())
            .cwd(dest)
    }
}

impl ArchiveRetriever for ShellRetriever<'_> {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn retrieve_and_extract(&self, url: &Url, dest: &Path) -> Result<(), ConfigureError> {
        for tool in ["curl", "tar"] {
            if find_executable(tool).is_none() {
                tracing::warn!("`{}` not found in PATH; header fetch will likely fail", tool);
            }
        }
        run_checked(self.runner, &Self::command(url, dest)).map(|_| ())
    }
}

/// Downloads with `reqwest` and unpacks gzip tarballs in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRetriever;

impl ArchiveRetriever for HttpRetriever {
    fn name(&self) -> &'static str {
        "http"
    }

    fn retrieve_and_extract(&self, url: &Url, dest: &Path) -> Result<(), ConfigureError> {
        tracing::info!("Fetching header bundle from {}", url);
        let failure = |status: Option<i32>, stderr: String| ConfigureError::ExternalCommandFailure {
            command: format!("GET {}", url),
            status,
            stderr,
        };

        let response = reqwest::blocking::get(url.as_str()).map_err(|e| failure(None, e.to_string()))?;
        if !response.status().is_success() {
            return Err(failure(
                Some(i32::from(response.status().as_u16())),
                format!("HTTP {}", response.status()),
            ));
        }
        let bytes = response
            .bytes()
            .map_err(|e| failure(None, format!("failed to read response body: {}", e)))?;

        extract_tarball(&bytes, dest).map_err(|e| ConfigureError::ExternalCommandFailure {
            command: format!("extract {}", url),
            status: None,
            stderr: format!("{:#}", e),
        })
    }
}

/// Pick the retriever for a bundle: in-process for gzip, `curl | tar` otherwise.
pub fn retriever_for<'a>(source: &HeaderSource, runner: &'a dyn CommandRunner) -> Box<dyn ArchiveRetriever + 'a> {
    if source.is_gzip() {
        Box::new(HttpRetriever)
    } else {
        Box::new(ShellRetriever::new(runner))
    }
}

/// Unpack a gzip-compressed tarball into `dest`.
pub fn extract_tarball(data: &[u8], dest: &Path) -> anyhow::Result<()> {
    use anyhow::Context;
    use flate2::read::GzDecoder;
    use tar::Archive;

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    let mut archive = Archive::new(GzDecoder::new(Cursor::new(data)));
    for entry in archive.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let path = entry.path().context("failed to get entry path")?.into_owned();
        // unpack_in refuses paths that escape `dest`
        let unpacked = entry
            .unpack_in(dest)
            .with_context(|| format!("failed to extract {}", path.display()))?;
        if !unpacked {
            tracing::debug!("skipped tarball entry outside destination: {}", path.display());
        }
    }
    Ok(())
}

/// Ensures header bundles exist in a cache directory.
pub struct HeaderFetcher<'a> {
    cache_dir: PathBuf,
    retriever: &'a dyn ArchiveRetriever,
}

impl<'a> HeaderFetcher<'a> {
    pub fn new(cache_dir: impl Into<PathBuf>, retriever: &'a dyn ArchiveRetriever) -> Self {
        HeaderFetcher {
            cache_dir: cache_dir.into(),
            retriever,
        }
    }

    /// Where `version` lives, fetched or not.
    pub fn bundle_dir(&self, version: &str) -> PathBuf {
        self.cache_dir.join(version)
    }

    /// Make sure the bundle for `source` is on disk and return it.
    pub fn ensure(&self, source: &HeaderSource) -> Result<HeaderBundle, ConfigureError> {
        let dir = self.bundle_dir(&source.version);
        if dir.is_dir() {
            tracing::debug!("header bundle {} already at {}", source.version, dir.display());
        } else {
            std::fs::create_dir_all(&self.cache_dir)
                .map_err(|e| ConfigureError::io(&self.cache_dir, e))?;
            tracing::info!(
                "fetching {} into {} ({})",
                source.version,
                self.cache_dir.display(),
                self.retriever.name()
            );
            self.retriever.retrieve_and_extract(&source.url, &self.cache_dir)?;

            if !dir.is_dir() {
                return Err(ConfigureError::IncompleteBundle {
                    version: source.version.clone(),
                    dir,
                });
            }
        }

        Ok(HeaderBundle {
            version: source.version.clone(),
            dir,
        })
    }
}
