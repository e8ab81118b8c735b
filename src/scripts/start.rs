//! The `start` script: serve the app in development mode.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use colored::Colorize;
use tracing::{debug, warn};

use crate::{
    bundler::{BundleConfig, Bundler, DevServerOptions, Mode},
    config::ServerOptions,
    error::Result,
    html::{copy_public_folder, write_index},
    paths::{AppPaths, ProjectPaths},
    report::clear_directory,
};

use super::{bundle_config, open_command, spinner};

/// How `start` ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The development server exited.
    Stopped,

    /// A smoke test compiled the app once.
    SmokeTest { passed: bool },
}

impl StartOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Stopped | Self::SmokeTest { passed: true } => 0,
            Self::SmokeTest { passed: false } => 1,
        }
    }
}

/// Directory the development server serves from.
#[must_use]
pub fn dev_server_directory(app: &AppPaths) -> PathBuf {
    app.app_node_modules.join(".cache").join("spa-scripts")
}

/// Run the development server, or a single smoke-test compile.
///
/// In smoke-test mode the app is compiled once; any error or warning fails
/// the test.
///
/// # Errors
///
/// Returns an error if the serve directory cannot be prepared or the bundler
/// cannot be started.
pub fn start(
    paths: &ProjectPaths,
    bundler: &impl Bundler,
    options: &ServerOptions,
) -> Result<StartOutcome> {
    let app = paths.app();
    let serve_dir = dev_server_directory(app);
    prepare_serve_directory(app, &serve_dir)?;

    let config = BundleConfig {
        public_path: "/".to_string(),
        ..bundle_config(app, Mode::Development, &serve_dir)
    };

    if options.smoke_test {
        let progress = spinner("Compiling...");
        let stats = bundler.run(&config);
        progress.finish_and_clear();
        let stats = stats?;

        for message in stats.errors.iter().chain(&stats.warnings) {
            eprintln!("{message}");
        }
        let passed = !stats.has_errors() && !stats.has_warnings();
        debug!("Smoke test passed: {passed}");

        return Ok(StartOutcome::SmokeTest { passed });
    }

    let server = DevServerOptions {
        host: options.host.clone(),
        port: options.port,
        serve_dir,
        public_path: config.public_path.clone(),
        history_api_fallback: true,
        hot: true,
    };

    println!(
        "{} {}",
        "Running development server at".green(),
        server.url().cyan()
    );

    if options.open_browser {
        open_browser(&server.url());
    }

    bundler.serve(&config, &server)?;

    Ok(StartOutcome::Stopped)
}

/// Fill `serve_dir` with the public files and a development `index.html`.
fn prepare_serve_directory(app: &AppPaths, serve_dir: &Path) -> Result<()> {
    clear_directory(serve_dir)?;
    fs::create_dir_all(serve_dir)?;

    copy_public_folder(&app.app_public, serve_dir, &app.app_html)?;

    if app.app_html.is_file() {
        write_index(
            &app.app_html,
            &serve_dir.join("index.html"),
            "",
            &["/static/js/bundle.css".to_string()],
            &["/static/js/bundle.js".to_string()],
        )?;
    }

    Ok(())
}

/// Open `url` in the default browser. Failures are only logged.
fn open_browser(url: &str) {
    let mut cmd = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", open_command(), ""]);
        cmd
    } else {
        Command::new(open_command())
    };

    if let Err(e) = cmd.arg(url).spawn() {
        warn!("Failed to open a browser at {url}: {e}");
    }
}
