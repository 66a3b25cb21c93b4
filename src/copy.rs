//! Library copying into the installation destination.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Copy one library into `dest_dir` under its base file name.
///
/// An existing file of the same name is overwritten. Returns the path written.
pub fn copy_library_to(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = src
        .file_name()
        .with_context(|| format!("Library path has no file name: {}", src.display()))?;
    let dest_path = dest_dir.join(file_name);

    fs::copy(src, &dest_path).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            src.display(),
            dest_path.display()
        )
    })?;
    tracing::debug!(src = %src.display(), dest = %dest_path.display(), "copied library");

    Ok(dest_path)
}

/// Copy every library, in order, into `dest_dir`.
///
/// Not transactional: the first failure is returned and libraries copied
/// before it stay in place. `dest_dir` is created if missing.
pub fn copy_libraries(libs: &[PathBuf], dest_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create destination: {}", dest_dir.display()))?;

    let mut copied = Vec::with_capacity(libs.len());
    for lib in libs {
        copied.push(copy_library_to(lib, dest_dir)?);
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_by_base_name() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("mingw64/bin/SDL2.dll");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, "sdl").unwrap();
        let dest = temp.path().join("install");
        fs::create_dir_all(&dest).unwrap();

        let written = copy_library_to(&src, &dest).unwrap();
        assert_eq!(written, dest.join("SDL2.dll"));
        assert_eq!(fs::read_to_string(written).unwrap(), "sdl");
    }

    #[test]
    fn test_copy_overwrites() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("libz.dll");
        fs::write(&src, "new").unwrap();
        let dest = temp.path().join("install");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("libz.dll"), "old").unwrap();

        copy_library_to(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("libz.dll")).unwrap(), "new");
    }

    #[test]
    fn test_copy_libraries_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.dll");
        let c = temp.path().join("c.dll");
        fs::write(&a, "a").unwrap();
        fs::write(&c, "c").unwrap();
        let missing = temp.path().join("b.dll");
        let dest = temp.path().join("install");

        let err = copy_libraries(&[a, missing, c], &dest).unwrap_err();
        assert!(err.to_string().contains("b.dll"), "got: {}", err);
        assert!(dest.join("a.dll").exists());
        assert!(!dest.join("b.dll").exists());
        assert!(!dest.join("c.dll").exists());
    }

    #[test]
    fn test_copy_libraries_creates_destination() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.dll");
        fs::write(&a, "a").unwrap();
        let dest = temp.path().join("deep/install/prefix");

        let copied = copy_libraries(&[a], &dest).unwrap();
        assert_eq!(copied, vec![dest.join("a.dll")]);
    }
}
