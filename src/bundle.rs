//! One run of the install hook: scan the target, copy what the scanner reports.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use crate::analyze::Scanner;
use crate::config::Config;
use crate::copy::copy_libraries;
use crate::paths::{discover_subproject_dirs, subproject_roots, SearchPath, SEARCH_PATH_VAR};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// Search path handed to the scanner.
    pub search_path: SearchPath,
    /// Libraries the scanner reported, in report order.
    pub libraries: Vec<PathBuf>,
    /// Files written into the destination, in copy order.
    pub copied: Vec<PathBuf>,
}

/// Build the search path: toolchain catalog, then every subproject directory.
pub fn build_search_path(config: &Config) -> SearchPath {
    let mut search = SearchPath::toolchains();
    let roots = subproject_roots(&config.source_root, &config.build_root);
    search.extend(discover_subproject_dirs(&roots));
    search
}

/// The scanner command for `config` with `search` in its environment.
pub fn scanner_for(config: &Config, search: &SearchPath) -> Scanner {
    Scanner::new(&config.python)
        .arg(&config.scanner_script)
        .env(SEARCH_PATH_VAR, search.to_env_value())
}

/// Bundle the DLL dependencies of `config.target` into `config.install_prefix`.
///
/// With `verbose`, the scanner command line, the working directory and both
/// captured streams are written to `out`. Verbosity never changes what gets
/// copied.
///
/// # Errors
///
/// Returns an error if the scanner cannot be launched or exits unsuccessfully,
/// its report is malformed, or a copy fails. Copies made before a copy failure are left in place.
pub fn bundle(config: &Config, verbose: bool, out: &mut dyn Write) -> Result<BundleReport> {
    let search_path = build_search_path(config);
    tracing::debug!(
        entries = search_path.dirs().len(),
        "{}={}",
        SEARCH_PATH_VAR,
        search_path.to_env_value()
    );

    let scanner = scanner_for(config, &search_path);

    if verbose {
        let cwd = std::env::current_dir().context("Failed to read working directory")?;
        writeln!(
            out,
            "Executing command: {}",
            scanner.command_line(&config.target)
        )?;
        writeln!(out, "Working directory: {}", cwd.display())?;
    }

    let output = scanner.run(&config.target)?;

    if verbose {
        writeln!(out, "{}", output.stdout)?;
        writeln!(out, "{}", output.stderr)?;
    }

    output.check_status()?;
    let libraries = output.libraries()?;
    let copied = copy_libraries(&libraries, &config.install_prefix)?;

    tracing::info!(
        count = copied.len(),
        dest = %config.install_prefix.display(),
        "bundled DLLs"
    );

    Ok(BundleReport {
        search_path,
        libraries,
        copied,
    })
}
