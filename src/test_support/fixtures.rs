//! Test fixtures for common test scenarios.

use std::path::Path;

use crate::core::environment::Environment;
use crate::util::config::Layout;

/// Create a project root with the given subproject directories.
pub fn project_tree(root: &Path, subdirs: &[&str]) -> Layout {
    for sub in subdirs {
        std::fs::create_dir_all(root.join(sub)).expect("failed to create subproject");
    }
    Layout::new(root).expect("failed to build layout")
}

/// Environment for a plain external build without HDF5.
pub fn external_no_hdf_env() -> Environment {
    Environment::from_pairs([("NOPBBAM", "1"), ("NOHDF", "1")])
}

/// Environment for an external build against an installed HDF5.
pub fn external_with_hdf_env(lib: &str, inc: &str) -> Environment {
    Environment::from_pairs([("NOPBBAM", "1"), ("HDF5_LIB", lib), ("HDF5_INC", inc)])
}
