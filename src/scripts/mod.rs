//! The user-facing scripts: `build`, `start` and `eject`.
//!
//! Each script works on already resolved [`ProjectPaths`] and takes its
//! [`Bundler`](crate::bundler::Bundler) as a parameter.

pub mod build;
pub mod eject;
pub mod start;

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    bundler::{BundleConfig, Mode},
    paths::AppPaths,
};

pub use build::build;
pub use eject::{EjectOptions, EjectOutcome, eject};
pub use start::{StartOutcome, start};

/// Spinner shown while the bundler runs.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar
}

/// Bundler input for the app, emitting into `out_dir`.
pub(crate) fn bundle_config(app: &AppPaths, mode: Mode, out_dir: &Path) -> BundleConfig {
    BundleConfig {
        mode,
        app_path: app.app_path.clone(),
        entry: app.app_index_js.clone(),
        out_dir: out_dir.to_path_buf(),
        public_path: app.served_path.clone(),
        src_paths: app.src_paths.clone(),
    }
}

/// The command that opens a URL or file with the desktop's default handler.
#[must_use]
pub const fn open_command() -> &'static str {
    if cfg!(windows) {
        "start"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}
