//! Hook configuration read from the environment meson sets for install scripts.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;

pub const SOURCE_ROOT_VAR: &str = "MESON_SOURCE_ROOT";
pub const BUILD_ROOT_VAR: &str = "MESON_BUILD_ROOT";
pub const INSTALL_PREFIX_VAR: &str = "MESON_INSTALL_DESTDIR_PREFIX";

/// Overrides for the scanner interpreter, script and target executable.
pub const PYTHON_VAR: &str = "DLL_BUNDLE_PYTHON";
pub const SCANNER_VAR: &str = "DLL_BUNDLE_SCANNER";
pub const TARGET_VAR: &str = "DLL_BUNDLE_TARGET";

pub const DEFAULT_PYTHON: &str = "python3";
pub const DEFAULT_SCANNER: &str = "extras/windows/mingw-bundledlls/mingw-bundledlls";
pub const DEFAULT_TARGET: &str = "naev.exe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source_root: PathBuf,
    pub build_root: PathBuf,
    /// Installation destination; libraries land directly in it.
    pub install_prefix: PathBuf,
    pub python: OsString,
    pub scanner_script: PathBuf,
    /// Built executable whose dependencies are bundled.
    pub target: PathBuf,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unset meson variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let required = |key: &str| -> Result<PathBuf> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .with_context(|| format!("Environment variable {} is not set", key))
        };

        let source_root = required(SOURCE_ROOT_VAR)?;
        let build_root = required(BUILD_ROOT_VAR)?;
        let install_prefix = required(INSTALL_PREFIX_VAR)?;

        let optional = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let python = optional(PYTHON_VAR).unwrap_or_else(|| DEFAULT_PYTHON.into());
        let scanner_script = optional(SCANNER_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| source_root.join(DEFAULT_SCANNER));
        let target =
            build_root.join(optional(TARGET_VAR).unwrap_or_else(|| DEFAULT_TARGET.into()));

        Ok(Self {
            source_root,
            build_root,
            install_prefix,
            python,
            scanner_script,
            target,
        })
    }
}
