//! Rendering of the defines fragment and the config header.

use serde::Serialize;

use crate::core::mode::ConfigMode;
use crate::core::resolved::ResolvedConfig;
use crate::core::schema::OverrideKind;

/// Macro enabling pbbam-backed formats in the data library.
pub const PBBAM_FEATURE_MACRO: &str = "USE_PBBAM";

/// Name of the record that closes the defines fragment.
pub const CONFIG_HEADER_RECORD: &str = "LIBCONFIG_H";

/// Text of the two generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragments {
    pub defines: String,
    pub config_header: String,
}

/// Render both artifacts.
///
/// Overridable assignments come first and hard assignments after them, each
/// group sorted by key, so make sees the same order whatever the resolution
/// order was.
pub fn compose(config: &ResolvedConfig, mode: ConfigMode) -> Fragments {
    Fragments {
        defines: compose_defines(config),
        config_header: compose_config_header(mode),
    }
}

fn compose_defines(config: &ResolvedConfig) -> String {
    let mut out = String::new();
    for kind in [OverrideKind::Overridable, OverrideKind::Hard] {
        for (key, setting) in config.of_kind(kind) {
            out.push_str(&assignment(key, kind, &setting.value));
        }
    }
    out.push_str(&assignment(
        CONFIG_HEADER_RECORD,
        OverrideKind::Hard,
        &config.config_header().display().to_string(),
    ));
    out
}

fn assignment(key: &str, kind: OverrideKind, value: &str) -> String {
    format!("{:<20} {} {}\n", key, kind.operator(), value)
}

fn compose_config_header(mode: ConfigMode) -> String {
    match mode {
        ConfigMode::InternalPacbio => format!("#define {}\n", PBBAM_FEATURE_MACRO),
        ConfigMode::ExternalNoHdf
        | ConfigMode::ExternalWithHdf
        | ConfigMode::ExternalFetchHeaders => String::new(),
    }
}
