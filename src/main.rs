//! # spa-scripts
//!
//! Build, serve and eject single-page web applications.
//!
//! ## Usage
//!
//! ```bash
//! # Production build into build/
//! spa-scripts build
//!
//! # Build for a sub-path
//! PUBLIC_URL=/dashboard spa-scripts build
//!
//! # Development server on another port
//! spa-scripts start --port 8080
//!
//! # Take over the build configuration
//! spa-scripts eject
//! ```

mod cli;

use std::{env, path::PathBuf, process::exit};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use colored::Colorize;
use inquire::Confirm;
use spa_scripts::{
    Error,
    bundler::EsbuildBundler,
    config::FileConfig,
    manifest::FsManifestReader,
    paths::resolve,
    scripts::{EjectOptions, build, eject, start},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Entry point for the spa-scripts application.
///
/// This function handles all errors gracefully by calling [`inner_main`] and printing
/// any errors to stderr before exiting with a non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("Error: {err:#}");

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Loads the persistent configuration file (if present)
/// 3. Resolves the project paths from the working directory
/// 4. Runs the requested script
///
/// Unknown scripts print a hint and succeed, matching the behavior users of
/// npm-style script runners expect.
///
/// # Errors
///
/// This function can return errors from:
/// - Path resolution
/// - Locating the bundler
/// - The scripts themselves
fn inner_main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let file_config = match FileConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "Warning: Failed to load config file:".yellow());
            FileConfig::default()
        }
    };

    let command = match args.command {
        Some(Command::External(ref script)) => {
            let name = script.first().map_or("", String::as_str);
            print_unknown_script(name);
            return Ok(());
        }
        None => {
            print_unknown_script("");
            return Ok(());
        }
        Some(ref command) => command,
    };

    let own_directory = file_config
        .own_directory()
        .or_else(install_directory)
        .context("Cannot determine the spa-scripts install directory")?;
    let app_directory = env::current_dir()?;
    debug!(
        "App directory {}, install directory {}",
        app_directory.display(),
        own_directory.display()
    );

    let options = args.resolve_options(&file_config, app_directory, own_directory.clone());
    let paths = resolve(&options, &FsManifestReader)?;

    match command {
        Command::Build => {
            let bundler = EsbuildBundler::locate(
                args.bundler_path(&file_config).as_deref(),
                &paths.app().app_node_modules,
            )?;

            if let Err(err) = build(&paths, &bundler, &FsManifestReader) {
                if let Error::DelegatedBuild { messages } = &err {
                    eprintln!("{}", "Failed to create a production build. Reason:".red());
                    for message in messages {
                        eprintln!("{message}");
                    }
                    exit(1);
                }
                return Err(err.into());
            }
        }
        Command::Start(start_args) => {
            let bundler = EsbuildBundler::locate(
                args.bundler_path(&file_config).as_deref(),
                &paths.app().app_node_modules,
            )?;
            let server_options = start_args.server_options(&file_config);

            let outcome = start(&paths, &bundler, &server_options)?;
            if outcome.exit_code() != 0 {
                exit(outcome.exit_code());
            }
        }
        Command::Eject(eject_args) => {
            let options = EjectOptions { own_directory };
            let yes = eject_args.yes;

            eject(&paths, &options, || {
                if yes {
                    return Ok(true);
                }
                Confirm::new("Are you sure you want to eject? This action is permanent.")
                    .with_default(false)
                    .prompt()
                    .map_err(|e| Error::Eject(e.to_string()))
            })?;
        }
        Command::External(_) => {}
    }

    Ok(())
}

/// The directory the binary was installed into: the parent of its `bin/`.
fn install_directory() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?.canonicalize().ok()?;
    exe.parent()?.parent().map(PathBuf::from)
}

fn print_unknown_script(name: &str) {
    println!("Unknown script \"{name}\".");
    println!("Perhaps you need to update spa-scripts?");
}

/// Diagnostic logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "spa_scripts=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
