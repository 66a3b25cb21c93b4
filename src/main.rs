//! DLL Bundler for Windows.
//!
//! Called by `meson install` when building for Windows, after the executable
//! is linked. Behaves like the macOS bundling hook in `extras/macos`.
//!
//! # Usage
//!
//! ```bash
//! dll-bundle       # bundle quietly
//! dll-bundle -d    # also print the scanner command and its output
//! ```

use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dll_bundle::{bundle, Config};

#[derive(Parser, Debug)]
#[command(name = "dll-bundle")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Verbose output
    #[arg(short = 'd', action = ArgAction::Count)]
    debug: u8,
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dll-bundle".to_string())
}

fn usage() -> ExitCode {
    let prog = program_name();
    println!("usage: {} [-d] (Verbose output)", prog);
    println!("DLL Bundler for Windows");
    println!("This script is called by 'meson install' if building for Windows.");
    println!(
        "The intention is for this wrapper to behave in a similar manner to the bundle.py script in extras/macos."
    );
    println!("usage: {} [-d] (Verbose output)", prog);
    ExitCode::from(1)
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .init();
}

/// Only a literal `-d` is accepted. This rules out forms clap would
/// otherwise take, such as `-dd` or a bare `--`.
fn only_debug_flags<I>(args: I) -> bool
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter().all(|arg| arg == "-d")
}

fn main() -> ExitCode {
    if !only_debug_flags(std::env::args_os().skip(1)) {
        return usage();
    }
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(_) => return usage(),
    };
    let verbose = args.debug > 0;
    init_logging(verbose);

    let result = Config::from_env()
        .and_then(|config| bundle(&config, verbose, &mut std::io::stdout().lock()));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
