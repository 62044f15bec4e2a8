//! Recognized configuration keys and their override policy.

use serde::Serialize;

use crate::core::mode::ConfigMode;

/// How a key is assigned in the defines fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideKind {
    /// `KEY ?= VALUE`: yields to a value supplied by the caller of make.
    Overridable,
    /// `KEY := VALUE`: always takes this value.
    Hard,
}

impl OverrideKind {
    /// The make assignment operator.
    pub fn operator(self) -> &'static str {
        match self {
            OverrideKind::Overridable => "?=",
            OverrideKind::Hard => ":=",
        }
    }
}

/// Keys that are never emitted as overridable.
///
/// `CC`, `CXX` and `AR` have built-in defaults in make, so `?=` would never
/// take effect for them. The HDF5 keys name directories, and downstream
/// makefiles also see a same-named variable from the environment.
pub const HARD_KEYS: &[&str] = &[
    "AR",
    "CC",
    "CXX",
    "HDF5_INC",
    "HDF5_LIB",
    "HDF_HEADERS",
    "INCLUDES",
    "nohdf",
];

/// Extra keys copied verbatim from the environment when set.
pub const PASSTHROUGH_KEYS: &[&str] = &["AR", "CC", "CPPFLAGS", "CXX", "CXXFLAGS", "LDFLAGS"];

/// Override kind for `key`.
pub fn kind_of(key: &str) -> OverrideKind {
    if HARD_KEYS.contains(&key) {
        OverrideKind::Hard
    } else {
        OverrideKind::Overridable
    }
}

/// Which modes resolve a path key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Everywhere,
    /// Modes that link against prebuilt HDF5.
    LinkedHdf5,
    Internal,
}

impl Scope {
    pub fn includes(self, mode: ConfigMode) -> bool {
        match self {
            Scope::Everywhere => true,
            Scope::LinkedHdf5 => matches!(
                mode,
                ConfigMode::InternalPacbio | ConfigMode::ExternalWithHdf
            ),
            Scope::Internal => mode.is_internal(),
        }
    }
}

/// A path key resolved through the override cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub name: &'static str,
    /// Legacy names, consulted after `name`.
    pub aliases: &'static [&'static str],
    /// Sibling subproject used as the relative default.
    pub sibling: Option<&'static str>,
    pub scope: Scope,
}

impl KeySpec {
    const fn new(name: &'static str, scope: Scope) -> Self {
        KeySpec {
            name,
            aliases: &[],
            sibling: None,
            scope,
        }
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn sibling(mut self, dir: &'static str) -> Self {
        self.sibling = Some(dir);
        self
    }

    pub fn kind(&self) -> OverrideKind {
        kind_of(self.name)
    }

    /// Aliases honored in `mode`.
    ///
    /// Internal builds accept every legacy name. External builds only accept
    /// the ones that also satisfy a companion requirement.
    pub fn aliases_in(&self, mode: ConfigMode) -> &'static [&'static str] {
        if mode.is_internal() || companion_for_include(self.name).is_some() {
            self.aliases
        } else {
            &[]
        }
    }

    /// The override variable followed by its aliases for `mode`.
    pub fn lookup_names(&self, mode: ConfigMode) -> Vec<&'static str> {
        let mut names = vec![self.name];
        names.extend_from_slice(self.aliases_in(mode));
        names
    }
}

/// Every key resolved through the override cascade.
pub const PATH_KEYS: &[KeySpec] = &[
    KeySpec::new("LIBPBDATA_INC", Scope::Everywhere).sibling("pbdata"),
    KeySpec::new("LIBPBDATA_LIB", Scope::Everywhere).sibling("pbdata"),
    KeySpec::new("LIBPBIHDF_INC", Scope::Everywhere).sibling("hdf"),
    KeySpec::new("LIBPBIHDF_LIB", Scope::Everywhere).sibling("hdf"),
    KeySpec::new("LIBBLASR_INC", Scope::Everywhere).sibling("alignment"),
    KeySpec::new("LIBBLASR_LIB", Scope::Everywhere).sibling("alignment"),
    KeySpec::new("HDF5_INC", Scope::LinkedHdf5).aliases(&["HDF5_INCLUDE"]),
    KeySpec::new("HDF5_LIB", Scope::LinkedHdf5),
    KeySpec::new("PBBAM_INC", Scope::Internal).aliases(&["PBBAM_INCLUDE"]),
    KeySpec::new("PBBAM_LIB", Scope::Internal),
    KeySpec::new("HTSLIB_INC", Scope::Internal).aliases(&["HTSLIB_INCLUDE"]),
    KeySpec::new("HTSLIB_LIB", Scope::Internal),
    KeySpec::new("BOOST_INC", Scope::Internal).aliases(&["BOOST_INCLUDE"]),
    KeySpec::new("ZLIB_LIB", Scope::Internal),
    KeySpec::new("GCC_LIB", Scope::Internal),
    KeySpec::new("GTEST_INC", Scope::Internal),
    KeySpec::new("GTEST_SRCDIR", Scope::Internal),
];

/// Look up a path key by name.
pub fn path_key(name: &str) -> Option<&'static KeySpec> {
    PATH_KEYS.iter().find(|spec| spec.name == name)
}

/// A library key that must come with an include key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Companion {
    pub library: &'static str,
    pub include: &'static str,
}

impl Companion {
    /// Every variable name that satisfies the include requirement.
    pub fn accepted(&self) -> Vec<&'static str> {
        path_key(self.include)
            .map(|spec| {
                let mut names = vec![spec.name];
                names.extend_from_slice(spec.aliases);
                names
            })
            .unwrap_or_else(|| vec![self.include])
    }
}

pub const COMPANIONS: &[Companion] = &[
    Companion {
        library: "HDF5_LIB",
        include: "HDF5_INC",
    },
    Companion {
        library: "PBBAM_LIB",
        include: "PBBAM_INC",
    },
    Companion {
        library: "HTSLIB_LIB",
        include: "HTSLIB_INC",
    },
];

fn companion_for_include(include: &str) -> Option<&'static Companion> {
    COMPANIONS.iter().find(|c| c.include == include)
}

/// Keys read from the environment outside the path cascade.
const OTHER_INPUTS: &[&str] = &[
    "NOPBBAM",
    "NOHDF",
    "OS_STRING",
    "nohdf",
    "SH_LIB_EXT",
    "SET_LIB_NAME",
    "EXTRA_LDFLAGS",
];

/// Whether any mode reads `key`.
pub fn is_recognized(key: &str) -> bool {
    PASSTHROUGH_KEYS.contains(&key)
        || OTHER_INPUTS.contains(&key)
        || PATH_KEYS
            .iter()
            .any(|spec| spec.name == key || spec.aliases.contains(&key))
}
