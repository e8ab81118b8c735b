//! Bundler integration.
//!
//! Compiling, transforming and serving the app is delegated to an external
//! bundler. This module defines what is handed to it ([`BundleConfig`],
//! [`DevServerOptions`]) and what comes back ([`Stats`]); [`EsbuildBundler`]
//! drives the esbuild executable.

pub mod esbuild;

use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
};

use crate::{error::Result, paths::ensure_slash};

pub use esbuild::EsbuildBundler;

/// Extensions emitted as separate files instead of being inlined.
pub const BINARY_ASSET_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "eot", "otf", "webp", "svg", "ttf", "woff", "woff2", "mp4",
    "webm", "wav", "mp3", "m4a", "aac", "oga",
];

/// Build mode, exposed to the app as `process.env.NODE_ENV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Production,
    Development,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the bundler needs to compile the app.
#[derive(Clone, Debug)]
pub struct BundleConfig {
    pub mode: Mode,

    /// Working directory of the bundler process.
    pub app_path: PathBuf,

    pub entry: PathBuf,

    /// Root output directory. Assets are emitted below `<out_dir>/static`.
    pub out_dir: PathBuf,

    /// URL prefix of emitted assets, ending in `/`.
    pub public_path: String,

    /// Extra source roots (monorepo siblings) the bundler may resolve from.
    pub src_paths: Vec<PathBuf>,
}

impl BundleConfig {
    /// The value of `process.env.PUBLIC_URL`: the public path without its
    /// trailing slash, so `%PUBLIC_URL%/favicon.ico` never doubles it.
    #[must_use]
    pub fn public_url(&self) -> String {
        ensure_slash(&self.public_path, false)
    }
}

/// Serving options for development mode.
#[derive(Clone, Debug)]
pub struct DevServerOptions {
    pub host: String,
    pub port: u16,

    /// Directory served as the site root.
    pub serve_dir: PathBuf,

    pub public_path: String,

    /// Serve `index.html` for unknown paths so client-side routes work.
    pub history_api_fallback: bool,

    /// Rebuild on source changes.
    pub hot: bool,
}

impl DevServerOptions {
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

/// One file emitted by the bundler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Path relative to the output directory, with `/` separators.
    pub name: String,

    /// Size in bytes, as written.
    pub size: u64,

    /// Whether the asset must be referenced from `index.html`.
    pub is_entry: bool,
}

/// Result of a bundler run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub assets: Vec<Asset>,
}

impl Stats {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Entry assets ending in `extension`, e.g. `".js"`.
    pub fn entries_with_extension<'a>(
        &'a self,
        extension: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.assets
            .iter()
            .filter(move |a| a.is_entry && a.name.ends_with(extension))
            .map(|a| a.name.as_str())
    }
}

/// An external bundler.
pub trait Bundler {
    /// Compile once and report the outcome.
    ///
    /// Compile errors are reported in [`Stats::errors`], not as `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundler cannot be run at all.
    fn run(&self, config: &BundleConfig) -> Result<Stats>;

    /// Serve the app until the server stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be started or exits abnormally.
    fn serve(&self, config: &BundleConfig, server: &DevServerOptions) -> Result<()>;
}
