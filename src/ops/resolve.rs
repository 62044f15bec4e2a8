//! Cascading resolution of configuration keys.
//!
//! Each key is looked up in order: the same-named variable, its legacy
//! aliases, then a computed default. Resolution only reads the environment
//! snapshot and the probe results it is given.

use std::path::{Path, PathBuf};

use crate::core::environment::Environment;
use crate::core::error::ConfigureError;
use crate::core::mode::ConfigMode;
use crate::core::platform::Platform;
use crate::core::resolved::{Origin, ResolvedConfig};
use crate::core::schema::{path_key, KeySpec, COMPANIONS, PASSTHROUGH_KEYS, PATH_KEYS};
use crate::sources::headers::HeaderBundle;

/// Probe results and paths the resolver needs besides the environment.
#[derive(Debug, Clone)]
pub struct ResolveInputs<'a> {
    pub platform: &'a Platform,
    /// Probed `OS_STRING`, used when the environment does not set one.
    pub os_string: Option<String>,
    /// Header bundle for [`ConfigMode::ExternalFetchHeaders`].
    pub headers: Option<&'a HeaderBundle>,
    /// Project root; subprojects sit one level below it.
    pub root: &'a Path,
    /// Absolute path of the generated config header.
    pub config_header: PathBuf,
}

/// Fail if a library variable is set without any accepted include variable.
pub fn check_companions(env: &Environment, mode: ConfigMode) -> Result<(), ConfigureError> {
    for companion in COMPANIONS {
        let in_scope = PATH_KEYS
            .iter()
            .any(|spec| spec.name == companion.library && spec.scope.includes(mode));
        if !in_scope || !env.contains(companion.library) {
            continue;
        }

        let accepted = companion.accepted();
        if env.first_of(&accepted).is_none() {
            return Err(ConfigureError::MissingCompanionVariable {
                variable: companion.library.to_string(),
                accepted: accepted.iter().map(|s| s.to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// Look `spec` up through its override and alias names.
pub fn lookup(env: &Environment, spec: &KeySpec, mode: ConfigMode) -> Option<(String, Origin)> {
    let (name, value) = env.first_of(&spec.lookup_names(mode))?;
    let origin = if name == spec.name {
        Origin::Override
    } else {
        Origin::Alias(name.to_string())
    };
    Some((value.to_string(), origin))
}

/// Whether the OS string must be probed because nothing overrides it.
pub fn needs_os_string(env: &Environment, mode: ConfigMode) -> bool {
    mode.is_internal() && !env.contains("OS_STRING")
}

/// Resolve every key that `mode` emits.
pub fn resolve(
    env: &Environment,
    mode: ConfigMode,
    inputs: &ResolveInputs<'_>,
) -> Result<ResolvedConfig, ConfigureError> {
    check_companions(env, mode)?;

    let mut config = ResolvedConfig::new(inputs.config_header.clone());

    for spec in PATH_KEYS.iter().filter(|spec| spec.scope.includes(mode)) {
        if let Some((value, origin)) = lookup(env, spec, mode) {
            tracing::debug!("{} = {} ({:?})", spec.name, value, origin);
            config.set(spec.name, value, origin);
        } else if let Some(sibling) = spec.sibling {
            config.set(spec.name, sibling_default(sibling), Origin::Default);
        }
    }

    for (key, default) in inputs.platform.defaults() {
        match env.get(key) {
            Some(value) => config.set(key, value, Origin::Override),
            None => config.set(key, default, Origin::Probe),
        }
    }

    match mode {
        ConfigMode::InternalPacbio => {
            if let Some(value) = env.get("OS_STRING") {
                config.set("OS_STRING", value, Origin::Override);
            } else if let Some(ref probed) = inputs.os_string {
                config.set("OS_STRING", probed.as_str(), Origin::Probe);
            }
            if let Some(value) = env.get("nohdf") {
                config.set("nohdf", value, Origin::Override);
            }
        }
        ConfigMode::ExternalNoHdf => {
            config.set("nohdf", "1", Origin::Mode);
            config.set("INCLUDES", sibling_includes(&config), Origin::Mode);
        }
        ConfigMode::ExternalWithHdf => {
            config.set("INCLUDES", sibling_includes(&config), Origin::Mode);
        }
        ConfigMode::ExternalFetchHeaders => {
            if let Some(bundle) = inputs.headers {
                wire_header_bundle(env, &mut config, bundle, inputs.root);
            } else {
                tracing::warn!("no header bundle available; HDF5 include paths left unset");
                config.set("INCLUDES", sibling_includes(&config), Origin::Mode);
            }
        }
    }

    for key in PASSTHROUGH_KEYS {
        if let Some(value) = env.get(key) {
            config.set(*key, value, Origin::Passthrough);
        }
    }

    Ok(config)
}

fn sibling_default(dir: &str) -> String {
    format!("../{}", dir)
}

/// `-I` flags for the three sibling libraries, as resolved.
fn sibling_includes(config: &ResolvedConfig) -> String {
    ["LIBPBDATA_INC", "LIBPBIHDF_INC", "LIBBLASR_INC"]
        .iter()
        .filter_map(|key| config.value(key))
        .map(|dir| format!("-I{}", dir))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bundle path as seen from a subproject directory.
fn bundle_path_from_subproject(bundle: &HeaderBundle, root: &Path) -> PathBuf {
    match pathdiff::diff_paths(&bundle.dir, root) {
        Some(rel) if rel.is_relative() => Path::new("..").join(rel),
        _ => bundle.dir.clone(),
    }
}

fn wire_header_bundle(env: &Environment, config: &mut ResolvedConfig, bundle: &HeaderBundle, root: &Path) {
    let headers = bundle_path_from_subproject(bundle, root);
    let rel = HeaderBundle {
        version: bundle.version.clone(),
        dir: headers.clone(),
    };
    let [c_src, cxx_src] = rel.include_dirs();

    config.set("HDF_HEADERS", headers.display().to_string(), Origin::HeaderBundle);

    let hdf5_inc = path_key("HDF5_INC")
        .and_then(|spec| lookup(env, spec, ConfigMode::ExternalFetchHeaders));
    match hdf5_inc {
        Some((value, origin)) => config.set("HDF5_INC", value, origin),
        None => config.set("HDF5_INC", c_src.display().to_string(), Origin::HeaderBundle),
    }

    let includes = format!(
        "-I{} -I{} {}",
        c_src.display(),
        cxx_src.display(),
        sibling_includes(config)
    );
    config.set("INCLUDES", includes, Origin::HeaderBundle);
}
