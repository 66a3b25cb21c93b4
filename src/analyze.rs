//! DLL dependency analysis using the external `mingw-bundledlls` scanner.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// A scanner invocation: program, leading arguments and child environment.
///
/// The environment map is applied to the child only; the calling process's
/// own environment is never modified.
#[derive(Debug, Clone)]
pub struct Scanner {
    program: OsString,
    args: Vec<OsString>,
    env: BTreeMap<OsString, OsString>,
}

/// Everything the scanner produced.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Scanner {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Argument placed before the target executable (e.g. the scanner script
    /// when `program` is an interpreter).
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Set a variable in the child's environment.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .insert(key.as_ref().to_os_string(), value.as_ref().to_os_string());
        self
    }

    /// Variables set in the child's environment.
    pub fn env_vars(&self) -> &BTreeMap<OsString, OsString> {
        &self.env
    }

    /// Full argument vector the scanner is run with for `target`.
    pub fn argv(&self, target: &Path) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv.push(target.as_os_str().to_os_string());
        argv
    }

    /// Display form of the command line for diagnostics.
    pub fn command_line(&self, target: &Path) -> CommandLine {
        CommandLine(self.argv(target))
    }

    /// Run the scanner against `target`, blocking until it exits.
    ///
    /// Both streams are captured in full. Whether `target` exists is left to
    /// the scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be launched.
    pub fn run(&self, target: &Path) -> Result<ScanOutput> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(target)
            .envs(&self.env)
            .output()
            .with_context(|| {
                format!(
                    "Failed to launch scanner: {}",
                    Path::new(&self.program).display()
                )
            })?;

        Ok(ScanOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Python-list style rendering of an argument vector.
pub struct CommandLine(Vec<OsString>);

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}'", arg.to_string_lossy())?;
        }
        f.write_str("]")
    }
}

impl ScanOutput {
    /// Fail unless the scanner exited successfully.
    pub fn check_status(&self) -> Result<()> {
        if !self.status.success() {
            bail!("Scanner failed ({}): {}", self.status, self.stderr.trim());
        }
        Ok(())
    }

    /// Parse the captured standard output into library paths.
    pub fn libraries(&self) -> Result<Vec<PathBuf>> {
        parse_scanner_output(&self.stdout)
    }
}

/// Parse the scanner's report: one library path per line.
///
/// Lines are trimmed and blank lines skipped. A line without a file name
/// (`/`, `..`) cannot be copied by base name and is rejected.
///
/// Example scanner output:
/// ```text
/// /usr/x86_64-w64-mingw32/sys-root/mingw/bin/libgcc_s_seh-1.dll
/// /usr/x86_64-w64-mingw32/sys-root/mingw/bin/SDL2.dll
/// ```
#[must_use = "reported libraries should be copied"]
pub fn parse_scanner_output(output: &str) -> Result<Vec<PathBuf>> {
    let mut libs = Vec::new();

    for (index, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let path = PathBuf::from(line);
        if path.file_name().is_none() {
            bail!(
                "Malformed scanner output on line {}: '{}' has no file name",
                index + 1,
                line
            );
        }
        libs.push(path);
    }

    Ok(libs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scanner_output() {
        let output = "/mingw64/bin/SDL2.dll\n/mingw64/bin/libpng16-16.dll\n";
        let libs = parse_scanner_output(output).unwrap();
        assert_eq!(
            libs,
            vec![
                PathBuf::from("/mingw64/bin/SDL2.dll"),
                PathBuf::from("/mingw64/bin/libpng16-16.dll"),
            ]
        );
    }

    #[test]
    fn test_parse_skips_blank_and_crlf() {
        let output = "\r\n/mingw64/bin/a.dll\r\n   \n/mingw64/bin/b.dll\r\n\n";
        let libs = parse_scanner_output(output).unwrap();
        assert_eq!(
            libs,
            vec![
                PathBuf::from("/mingw64/bin/a.dll"),
                PathBuf::from("/mingw64/bin/b.dll"),
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_scanner_output("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_line_without_file_name() {
        let err = parse_scanner_output("/mingw64/bin/a.dll\n/\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {}", err);
    }

    #[test]
    fn test_argv_order() {
        let scanner = Scanner::new("python3").arg("/src/mingw-bundledlls");
        let argv = scanner.argv(Path::new("/build/naev.exe"));
        assert_eq!(argv, vec!["python3", "/src/mingw-bundledlls", "/build/naev.exe"]);
        assert_eq!(
            scanner.command_line(Path::new("/build/naev.exe")).to_string(),
            "['python3', '/src/mingw-bundledlls', '/build/naev.exe']"
        );
    }

    #[test]
    fn test_env_is_scoped_to_scanner() {
        let scanner = Scanner::new("python3").env("DLL_BUNDLE_TEST_SCOPED", "x");
        assert_eq!(scanner.env_vars().len(), 1);
        assert!(std::env::var_os("DLL_BUNDLE_TEST_SCOPED").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_passes_env_and_target() {
        let scanner = Scanner::new("sh")
            .arg("-c")
            .arg("echo \"$DLL_BUNDLE_PROBE\"; echo \"$0\"; echo oops >&2")
            .env("DLL_BUNDLE_PROBE", "/probe/dir");
        let out = scanner.run(Path::new("/build/naev.exe")).unwrap();
        out.check_status().unwrap();
        assert_eq!(out.stdout, "/probe/dir\n/build/naev.exe\n");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_error() {
        let scanner = Scanner::new("sh").arg("-c").arg("echo broken >&2; exit 3");
        let out = scanner.run(Path::new("/build/naev.exe")).unwrap();
        let err = out.check_status().unwrap_err();
        assert!(err.to_string().contains("broken"), "got: {}", err);
    }

    #[test]
    fn test_missing_program_is_error() {
        let scanner = Scanner::new("/nonexistent/dll-bundle-scanner");
        let err = scanner.run(Path::new("naev.exe")).unwrap_err();
        assert!(err.to_string().contains("Failed to launch scanner"));
    }
}
