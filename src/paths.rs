//! Scanner search path: toolchain catalog and subproject discovery.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable the scanner reads its search path from.
pub const SEARCH_PATH_VAR: &str = "MINGW_BUNDLEDLLS_SEARCH_PATH";

/// Separator used when rendering the search path.
pub const SEARCH_PATH_SEPARATOR: &str = ":";

/// Known bin directories of the supported Windows cross toolchains.
///
/// Order is lookup precedence for the scanner.
pub const TOOLCHAIN_BIN_DIRS: &[&str] = &[
    // MSYS2
    "/mingw32/bin",
    "/mingw64/bin",
    "/ucrt64/bin",
    "/clang32/bin",
    "/clang64/bin",
    "/clangarm64/bin",
    // Fedora
    "/usr/i686-w64-mingw32/bin",
    "/usr/x86_64-w64-mingw32/bin",
    "/usr/x86_64-w64-mingw32ucrt/bin",
    // Fedora MINGW sys-root
    "/usr/i686-w64-mingw32/sys-root/mingw/bin",
    "/usr/x86_64-w64-mingw32/sys-root/mingw/bin",
    "/usr/x86_64-w64-mingw32ucrt/sys-root/mingw/bin",
    // MXE
    "/usr/lib/mxe/usr/x86_64-w64-mingw32.shared/bin",
];

/// Ordered list of directories handed to the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// A search path holding only the toolchain catalog.
    pub fn toolchains() -> Self {
        Self {
            dirs: TOOLCHAIN_BIN_DIRS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Append directories after the existing entries. Duplicates are kept.
    pub fn extend<I>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.dirs.extend(dirs);
    }

    /// Entries in lookup order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Render as the colon-joined value of [`SEARCH_PATH_VAR`].
    pub fn to_env_value(&self) -> String {
        self.dirs
            .iter()
            .map(|d| d.to_string_lossy())
            .collect::<Vec<_>>()
            .join(SEARCH_PATH_SEPARATOR)
    }
}

/// The `subprojects` directories probed under the source and build roots.
pub fn subproject_roots(source_root: &Path, build_root: &Path) -> [PathBuf; 2] {
    [
        source_root.join("subprojects"),
        build_root.join("subprojects"),
    ]
}

/// Collect every directory below the given roots, roots included.
///
/// Each root is walked top-down (a directory is listed before its children),
/// siblings in file-name order. Roots that are not directories are skipped.
/// Symlinked directories are not followed. A directory that cannot be listed
/// is left out together with its subtree, and the walk carries on.
#[must_use = "discovered directories should be added to the search path"]
pub fn discover_subproject_dirs(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in roots {
        if root.is_dir() {
            tracing::debug!(root = %root.display(), "walking subprojects");
            walk_dirs(root, &mut found);
        }
    }
    found
}

fn walk_dirs(dir: &Path, found: &mut Vec<PathBuf>) {
    let children = match list_subdirs(dir) {
        Ok(children) => children,
        Err(err) => {
            tracing::warn!("Skipping subproject directory: {:#}", err);
            return;
        }
    };

    found.push(dir.to_path_buf());
    for child in children {
        walk_dirs(&child, found);
    }
}

/// Sorted subdirectories of `dir`. Entries whose type cannot be read are
/// treated as non-directories.
fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut children = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("Failed to read entry in: {}", dir.display()))?;
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => children.push(entry.path()),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), "Failed to read file type: {}", err);
            }
        }
    }
    children.sort();
    Ok(children)
}
