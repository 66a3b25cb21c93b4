//! MinGW DLL bundling for meson install.
//!
//! Runs the `mingw-bundledlls` scanner against a built Windows executable and
//! copies every DLL it reports into the install prefix. The scanner's search
//! path is the known cross-toolchain bin directories followed by every
//! directory under the source and build `subprojects` trees.

mod analyze;
mod bundle;
mod config;
mod copy;
mod paths;

pub use analyze::{parse_scanner_output, CommandLine, ScanOutput, Scanner};
pub use bundle::{build_search_path, bundle, scanner_for, BundleReport};
pub use config::{
    Config, BUILD_ROOT_VAR, INSTALL_PREFIX_VAR, PYTHON_VAR, SCANNER_VAR, SOURCE_ROOT_VAR,
    TARGET_VAR,
};
pub use copy::{copy_libraries, copy_library_to};
pub use paths::{
    discover_subproject_dirs, subproject_roots, SearchPath, SEARCH_PATH_SEPARATOR,
    SEARCH_PATH_VAR, TOOLCHAIN_BIN_DIRS,
};
