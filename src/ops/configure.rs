//! One configure run: select a mode, probe, resolve, compose, write.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::environment::Environment;
use crate::core::error::ConfigureError;
use crate::core::mode::{select_mode, ConfigMode, Selection};
use crate::core::platform::{self, Platform};
use crate::core::resolved::ResolvedConfig;
use crate::ops::compose::{compose, Fragments};
use crate::ops::resolve::{check_companions, needs_os_string, resolve, ResolveInputs};
use crate::ops::write::{link_aliases, update, Artifact, WriteOutcome};
use crate::sources::headers::{ArchiveRetriever, HeaderBundle, HeaderFetcher};
use crate::util::config::Settings;
use crate::util::process::CommandRunner;

/// Everything decided for a run, before anything is written.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub mode: ConfigMode,
    pub platform: Platform,
    pub config: ResolvedConfig,
    pub fragments: Fragments,
    pub headers: Option<HeaderBundle>,
}

impl Plan {
    /// The defines fragment and the config header, in write order.
    pub fn artifacts(&self, settings: &Settings) -> [Artifact; 2] {
        [
            Artifact::new(settings.layout.defines_path(), self.fragments.defines.clone()),
            Artifact::new(
                settings.layout.config_header_path(),
                self.fragments.config_header.clone(),
            ),
        ]
    }
}

/// What a configure run did.
#[derive(Debug, Clone)]
pub struct ConfigureReport {
    pub selection: Selection,
    pub plan: Option<Plan>,
    pub writes: Vec<(PathBuf, WriteOutcome)>,
    pub aliases: Vec<PathBuf>,
}

impl ConfigureReport {
    fn unconfigured(selection: Selection) -> Self {
        ConfigureReport {
            selection,
            plan: None,
            writes: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Number of files written or linked.
    pub fn changes(&self) -> usize {
        self.writes
            .iter()
            .filter(|(_, outcome)| *outcome == WriteOutcome::Written)
            .count()
            + self.aliases.len()
    }
}

/// Resolve and compose for `mode`.
///
/// With a retriever the header bundle is fetched if missing; without one its
/// expected location is used as-is, which keeps the plan free of side effects.
pub fn plan(
    env: &Environment,
    mode: ConfigMode,
    settings: &Settings,
    runner: &dyn CommandRunner,
    retriever: Option<&dyn ArchiveRetriever>,
) -> Result<Plan, ConfigureError> {
    let platform = platform::probe(runner);

    // Validate before any fetch so a bad environment never touches the network.
    check_companions(env, mode)?;

    let os_string = if needs_os_string(env, mode) {
        Some(platform::probe_os_string(runner, platform.os)?)
    } else {
        None
    };

    let headers = if mode == ConfigMode::ExternalFetchHeaders {
        let cache_dir = settings.layout.header_cache_dir();
        let bundle = match retriever {
            Some(retriever) => HeaderFetcher::new(cache_dir, retriever).ensure(&settings.headers)?,
            None => HeaderBundle {
                version: settings.headers.version.clone(),
                dir: cache_dir.join(&settings.headers.version),
            },
        };
        Some(bundle)
    } else {
        None
    };

    let inputs = ResolveInputs {
        platform: &platform,
        os_string,
        headers: headers.as_ref(),
        root: settings.layout.root(),
        config_header: settings.layout.config_header_path(),
    };
    let config = resolve(env, mode, &inputs)?;
    let fragments = compose(&config, mode);

    Ok(Plan {
        mode,
        platform,
        config,
        fragments,
        headers,
    })
}

/// Run the whole procedure and write the artifacts.
pub fn configure(
    env: &Environment,
    settings: &Settings,
    runner: &dyn CommandRunner,
    retriever: &dyn ArchiveRetriever,
) -> Result<ConfigureReport, ConfigureError> {
    configure_selection(env, select_mode(env), settings, runner, retriever)
}

/// Like [`configure`], for a selection the caller already made.
///
/// [`Selection::Unconfigured`] writes nothing: it is logged as a warning, or
/// returned as [`ConfigureError::UnresolvedMode`] when the settings are strict.
pub fn configure_selection(
    env: &Environment,
    selection: Selection,
    settings: &Settings,
    runner: &dyn CommandRunner,
    retriever: &dyn ArchiveRetriever,
) -> Result<ConfigureReport, ConfigureError> {
    let mode = match selection.mode() {
        Some(mode) => mode,
        None if settings.strict => {
            return Err(selection.into_error().unwrap_or(ConfigureError::UnresolvedMode {
                reason: "no mode selected".to_string(),
            }));
        }
        None => {
            if let Selection::Unconfigured { ref reason } = selection {
                tracing::warn!("nothing configured: {}", reason);
            }
            return Ok(ConfigureReport::unconfigured(selection));
        }
    };
    tracing::info!("configuring for {}", mode);

    let plan = plan(env, mode, settings, runner, Some(retriever))?;

    let mut writes = Vec::new();
    let mut aliases = Vec::new();
    for (i, artifact) in plan.artifacts(settings).iter().enumerate() {
        let outcome = update(artifact)?;
        if i == 0 && outcome == WriteOutcome::Written {
            aliases = link_aliases(&settings.layout, &settings.invoked_from)?;
        }
        writes.push((artifact.path.clone(), outcome));
    }

    Ok(ConfigureReport {
        selection,
        plan: Some(plan),
        writes,
        aliases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::headers::HDF5_HEADERS_VERSION;
    use crate::test_support::{
        external_no_hdf_env, external_with_hdf_env, project_tree, MockProcessOutput,
        MockRetriever, MockRunner,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        Environment::from_pairs(pairs.iter().copied())
    }

    fn linux_runner() -> MockRunner {
        let runner = MockRunner::new();
        runner.expect("uname -s", MockProcessOutput::success("Linux\n"));
        runner
    }

    fn settings(root: &Path) -> Settings {
        Settings::new(root).unwrap().with_invoked_from(root)
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        project_tree(tmp.path(), &["pbdata", "hdf", "alignment"]);
        let env = external_no_hdf_env();
        let retriever = MockRetriever::creating(HDF5_HEADERS_VERSION);

        let first = configure(&env, &settings(tmp.path()), &linux_runner(), &retriever).unwrap();
        let defines = fs::read(tmp.path().join("defines.mk")).unwrap();
        let second = configure(&env, &settings(tmp.path()), &linux_runner(), &retriever).unwrap();

        assert_eq!(first.changes(), 2 + 3);
        assert_eq!(second.changes(), 0);
        assert!(second
            .writes
            .iter()
            .all(|(_, outcome)| *outcome == WriteOutcome::Unchanged));
        assert_eq!(fs::read(tmp.path().join("defines.mk")).unwrap(), defines);
        assert_eq!(retriever.calls(), 0);
    }

    #[test]
    fn test_no_hdf_mode_output() {
        let tmp = TempDir::new().unwrap();
        project_tree(tmp.path(), &["pbdata"]);
        let env = external_no_hdf_env();

        let report = configure(
            &env,
            &settings(tmp.path()),
            &linux_runner(),
            &MockRetriever::creating(HDF5_HEADERS_VERSION),
        )
        .unwrap();

        assert_eq!(report.selection, Selection::Mode(ConfigMode::ExternalNoHdf));
        let defines = fs::read_to_string(tmp.path().join("defines.mk")).unwrap();
        assert!(defines.contains("nohdf                := 1\n"));
        assert!(defines.contains("SH_LIB_EXT           ?= .so\n"));
        let header_record = format!(
            "LIBCONFIG_H          := {}\n",
            tmp.path().join("pbdata/libconfig.h").display()
        );
        assert!(defines.ends_with(&header_record));
        assert_eq!(
            fs::read_to_string(tmp.path().join("pbdata/libconfig.h")).unwrap(),
            ""
        );
    }

    #[test]
    fn test_with_hdf_embeds_paths_verbatim() {
        let tmp = TempDir::new().unwrap();
        let env = external_with_hdf_env("/opt/hdf5 1.8/lib", "/opt/hdf5 1.8/include");

        let report = configure(
            &env,
            &settings(tmp.path()),
            &linux_runner(),
            &MockRetriever::creating(HDF5_HEADERS_VERSION),
        )
        .unwrap();

        assert_eq!(report.selection, Selection::Mode(ConfigMode::ExternalWithHdf));
        let defines = fs::read_to_string(tmp.path().join("defines.mk")).unwrap();
        assert!(defines.contains("HDF5_INC             := /opt/hdf5 1.8/include\n"));
        assert!(defines.contains("HDF5_LIB             := /opt/hdf5 1.8/lib\n"));
        assert!(!defines.contains("nohdf"));
    }

    #[test]
    fn test_missing_companion_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let env = env(&[("NOPBBAM", "1"), ("HDF5_LIB", "/opt/hdf5/lib")]);
        let retriever = MockRetriever::creating(HDF5_HEADERS_VERSION);

        let err = configure(&env, &settings(tmp.path()), &linux_runner(), &retriever).unwrap_err();

        assert!(matches!(err, ConfigureError::MissingCompanionVariable { .. }));
        assert!(!tmp.path().join("defines.mk").exists());
        assert!(!tmp.path().join("pbdata/libconfig.h").exists());
        assert_eq!(retriever.calls(), 0);
    }

    #[test]
    fn test_fetch_mode_uses_bundle() {
        let tmp = TempDir::new().unwrap();
        let env = env(&[("NOPBBAM", "1")]);
        let retriever = MockRetriever::creating(HDF5_HEADERS_VERSION);

        let report = configure(&env, &settings(tmp.path()), &linux_runner(), &retriever).unwrap();
        configure(&env, &settings(tmp.path()), &linux_runner(), &retriever).unwrap();

        assert_eq!(
            report.selection,
            Selection::Mode(ConfigMode::ExternalFetchHeaders)
        );
        assert_eq!(retriever.calls(), 1);
        assert!(tmp.path().join("hdf").join(HDF5_HEADERS_VERSION).is_dir());
        let defines = fs::read_to_string(tmp.path().join("defines.mk")).unwrap();
        assert!(defines.contains("INCLUDES             := -I../hdf/hdf5-1.8.12-headers/src"));
        assert!(defines.contains("HDF_HEADERS          := ../hdf/hdf5-1.8.12-headers\n"));
    }

    #[test]
    fn test_internal_mode_enables_pbbam() {
        let tmp = TempDir::new().unwrap();
        let runner = linux_runner();
        runner.expect("lsb_release -si", MockProcessOutput::success("CentOS\n"));
        runner.expect("lsb_release -sr", MockProcessOutput::success("7.2.1511\n"));
        let env = env(&[("PBBAM_INC", "/opt/pbbam/include"), ("PBBAM_LIB", "/opt/pbbam/lib")]);

        let report = configure(
            &env,
            &settings(tmp.path()),
            &runner,
            &MockRetriever::creating(HDF5_HEADERS_VERSION),
        )
        .unwrap();

        assert_eq!(report.selection, Selection::Mode(ConfigMode::InternalPacbio));
        assert_eq!(
            fs::read_to_string(tmp.path().join("pbdata/libconfig.h")).unwrap(),
            "#define USE_PBBAM\n"
        );
        let defines = fs::read_to_string(tmp.path().join("defines.mk")).unwrap();
        assert!(defines.contains("OS_STRING            ?= centos-7\n"));
        assert!(defines.contains("PBBAM_LIB            ?= /opt/pbbam/lib\n"));
    }

    #[test]
    fn test_os_string_failure_aborts_before_writing() {
        let tmp = TempDir::new().unwrap();
        let runner = linux_runner();
        runner.expect("lsb_release -si", MockProcessOutput::failure(127, "not found"));

        let err = configure(
            &env(&[]),
            &settings(tmp.path()),
            &runner,
            &MockRetriever::creating(HDF5_HEADERS_VERSION),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigureError::ExternalCommandFailure { .. }));
        assert!(!tmp.path().join("defines.mk").exists());
    }

    #[test]
    fn test_nohdf_alone_configures_internal_build() {
        let tmp = TempDir::new().unwrap();
        let env = env(&[("NOHDF", "1"), ("OS_STRING", "centos-7")]);

        let report = configure(
            &env,
            &settings(tmp.path()),
            &linux_runner(),
            &MockRetriever::creating(HDF5_HEADERS_VERSION),
        )
        .unwrap();

        assert_eq!(report.selection, Selection::Mode(ConfigMode::InternalPacbio));
        assert_eq!(
            fs::read_to_string(tmp.path().join("pbdata/libconfig.h")).unwrap(),
            "#define USE_PBBAM\n"
        );
        let defines = fs::read_to_string(tmp.path().join("defines.mk")).unwrap();
        assert!(defines.contains("OS_STRING            ?= centos-7\n"));
        assert!(!defines.contains("nohdf"));
    }

    #[test]
    fn test_unconfigured_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let unconfigured = || Selection::Unconfigured {
            reason: "no build flavour requested".to_string(),
        };
        let retriever = MockRetriever::creating(HDF5_HEADERS_VERSION);
        let runner = linux_runner();

        let report = configure_selection(
            &env(&[]),
            unconfigured(),
            &settings(tmp.path()),
            &runner,
            &retriever,
        )
        .unwrap();
        assert_eq!(report.selection.mode(), None);
        assert_eq!(report.changes(), 0);
        assert!(!tmp.path().join("defines.mk").exists());
        assert!(runner.calls().is_empty());

        let strict = settings(tmp.path()).strict(true);
        let err =
            configure_selection(&env(&[]), unconfigured(), &strict, &runner, &retriever).unwrap_err();
        assert!(matches!(err, ConfigureError::UnresolvedMode { .. }));
        assert!(!tmp.path().join("defines.mk").exists());
    }

    #[test]
    fn test_plan_without_retriever_has_no_side_effects() {
        let tmp = TempDir::new().unwrap();
        let env = env(&[("NOPBBAM", "1")]);

        let plan = plan(
            &env,
            ConfigMode::ExternalFetchHeaders,
            &settings(tmp.path()),
            &linux_runner(),
            None,
        )
        .unwrap();

        assert!(plan.fragments.defines.contains("hdf5-1.8.12-headers"));
        assert!(!tmp.path().join("hdf").exists());
    }
}
