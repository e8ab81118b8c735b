//! esbuild integration.
//!
//! The esbuild CLI is run as a child process. Production builds write a
//! metafile which lists every emitted output; diagnostics are read from
//! esbuild's stderr.

use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
    process::{self, Command},
};

use serde::Deserialize;
use tracing::{debug, warn};
use which::which;

use super::{Asset, BINARY_ASSET_EXTENSIONS, BundleConfig, Bundler, DevServerOptions, Mode, Stats};
use crate::{
    error::{Error, Result},
    utils::{normalize_path, to_slash},
};

/// esbuild's metafile, reduced to the outputs.
#[derive(Debug, Default, Deserialize)]
struct Metafile {
    #[serde(default)]
    outputs: BTreeMap<String, MetafileOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetafileOutput {
    bytes: u64,
    entry_point: Option<String>,
    css_bundle: Option<String>,
}

/// Drives the esbuild executable.
#[derive(Clone, Debug)]
pub struct EsbuildBundler {
    esbuild_path: PathBuf,
}

impl EsbuildBundler {
    /// Create a bundler for the given esbuild executable.
    #[must_use]
    pub const fn with_esbuild_path(esbuild_path: PathBuf) -> Self {
        Self { esbuild_path }
    }

    /// Locate esbuild.
    ///
    /// Lookup order: the explicit path, `node_modules/.bin/esbuild` of the app,
    /// then `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BundlerNotFound`] if none of the locations has it.
    pub fn locate(explicit: Option<&Path>, node_modules: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::with_esbuild_path(path.to_path_buf()));
        }

        let local = node_modules.join(".bin").join("esbuild");
        if local.is_file() {
            return Ok(Self::with_esbuild_path(local));
        }

        which("esbuild")
            .map(Self::with_esbuild_path)
            .map_err(|_| Error::BundlerNotFound {
                name: "esbuild".to_string(),
            })
    }

    #[must_use]
    pub fn esbuild_path(&self) -> &Path {
        &self.esbuild_path
    }

    fn command(&self, config: &BundleConfig) -> Command {
        let mut cmd = Command::new(&self.esbuild_path);
        cmd.current_dir(&config.app_path);

        // Sibling workspace packages resolve as bare imports.
        let node_paths: Vec<&Path> = config
            .src_paths
            .iter()
            .skip(1)
            .filter_map(|p| p.parent())
            .collect();
        if !node_paths.is_empty()
            && let Ok(joined) = env::join_paths(node_paths)
        {
            cmd.env("NODE_PATH", joined);
        }

        cmd
    }
}

/// Arguments shared by builds and the dev server.
fn common_args(config: &BundleConfig) -> Vec<String> {
    let mut args = vec![
        config.entry.display().to_string(),
        "--bundle".to_string(),
        "--color=false".to_string(),
        "--log-level=warning".to_string(),
        "--loader:.js=jsx".to_string(),
        format!("--public-path={}static", config.public_path),
        format!(
            "--define:process.env.NODE_ENV=\"{}\"",
            config.mode.as_str()
        ),
        format!(
            "--define:process.env.PUBLIC_URL=\"{}\"",
            config.public_url()
        ),
    ];

    args.extend(
        BINARY_ASSET_EXTENSIONS
            .iter()
            .map(|ext| format!("--loader:.{ext}=file")),
    );

    args
}

/// Arguments of a one-off build writing `metafile`.
fn build_args(config: &BundleConfig, metafile: &Path) -> Vec<String> {
    let mut args = common_args(config);
    let static_dir = config.out_dir.join("static");

    args.push(format!("--outdir={}", static_dir.display()));
    args.push(format!("--metafile={}", metafile.display()));
    args.push("--asset-names=media/[name].[hash]".to_string());

    match config.mode {
        Mode::Production => {
            args.push("--minify".to_string());
            args.push("--sourcemap".to_string());
            args.push("--entry-names=js/[name].[hash]".to_string());
        }
        Mode::Development => {
            args.push("--sourcemap=inline".to_string());
            args.push("--entry-names=js/bundle".to_string());
        }
    }

    args
}

/// Arguments of the dev server.
fn serve_args(config: &BundleConfig, server: &DevServerOptions) -> Vec<String> {
    let mut args = common_args(config);

    args.push(format!(
        "--outdir={}",
        server.serve_dir.join("static").display()
    ));
    args.push("--entry-names=js/bundle".to_string());
    args.push("--asset-names=media/[name]".to_string());
    args.push("--sourcemap=inline".to_string());
    args.push(format!("--serve={}:{}", server.host, server.port));
    args.push(format!("--servedir={}", server.serve_dir.display()));

    if server.history_api_fallback {
        args.push(format!(
            "--serve-fallback={}",
            server.serve_dir.join("index.html").display()
        ));
    }
    if server.hot {
        args.push("--watch".to_string());
    }

    args
}

/// Split esbuild's stderr into error and warning messages.
///
/// Each message starts at a line holding `[ERROR]` or `[WARNING]` and runs
/// until the next one; esbuild's trailing `N errors` summary is dropped.
fn parse_diagnostics(stderr: &str) -> (Vec<String>, Vec<String>) {
    enum Kind {
        Error,
        Warning,
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut current: Option<(Kind, Vec<&str>)> = None;

    let mut flush = |entry: Option<(Kind, Vec<&str>)>| {
        if let Some((kind, lines)) = entry {
            let message = lines.join("\n").trim_end().to_string();
            match kind {
                Kind::Error => errors.push(message),
                Kind::Warning => warnings.push(message),
            }
        }
    };

    for line in stderr.lines() {
        let kind = if let Some(idx) = line.find("[ERROR] ") {
            Some((Kind::Error, &line[idx + "[ERROR] ".len()..]))
        } else if let Some(idx) = line.find("[WARNING] ") {
            Some((Kind::Warning, &line[idx + "[WARNING] ".len()..]))
        } else {
            None
        };

        if let Some((kind, first_line)) = kind {
            flush(current.take());
            current = Some((kind, vec![first_line]));
        } else if is_summary_line(line) {
            flush(current.take());
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    flush(current);

    (errors, warnings)
}

/// Matches esbuild's closing `1 error`, `2 warnings and 1 error`, ...
fn is_summary_line(line: &str) -> bool {
    let line = line.trim();
    line.split(" and ").all(|part| {
        let mut words = part.split_whitespace();
        matches!(
            (words.next(), words.next(), words.next()),
            (Some(n), Some("error" | "errors" | "warning" | "warnings"), None)
                if n.parse::<u32>().is_ok()
        )
    }) && !line.is_empty()
}

/// Turn metafile outputs into assets relative to `out_dir`.
fn assets_from_metafile(metafile: &Metafile, app_path: &Path, out_dir: &Path) -> Vec<Asset> {
    let css_bundles: Vec<&str> = metafile
        .outputs
        .values()
        .filter(|o| o.entry_point.is_some())
        .filter_map(|o| o.css_bundle.as_deref())
        .collect();

    metafile
        .outputs
        .iter()
        .filter_map(|(key, output)| {
            let absolute = normalize_path(&app_path.join(key));
            let relative = absolute.strip_prefix(out_dir).ok()?;

            Some(Asset {
                name: to_slash(relative),
                size: output.bytes,
                is_entry: output.entry_point.is_some() || css_bundles.contains(&key.as_str()),
            })
        })
        .collect()
}

impl Bundler for EsbuildBundler {
    fn run(&self, config: &BundleConfig) -> Result<Stats> {
        let metafile_path =
            env::temp_dir().join(format!("spa-scripts-metafile-{}.json", process::id()));
        let args = build_args(config, &metafile_path);
        debug!("Running {} {}", self.esbuild_path.display(), args.join(" "));

        let output = self.command(config).args(&args).output().map_err(|e| {
            Error::Bundler(format!(
                "Failed to execute {}: {e}",
                self.esbuild_path.display()
            ))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let (mut errors, warnings) = parse_diagnostics(&stderr);

        if !output.status.success() && errors.is_empty() {
            let message = stderr.trim();
            errors.push(if message.is_empty() {
                format!("esbuild exited with {}", output.status)
            } else {
                message.to_string()
            });
        }

        let metafile = match fs::read_to_string(&metafile_path) {
            Ok(content) => serde_json::from_str::<Metafile>(&content)
                .map_err(|e| Error::Bundler(format!("Unreadable esbuild metafile: {e}")))?,
            Err(e) => {
                if output.status.success() {
                    warn!("esbuild wrote no metafile: {e}");
                }
                Metafile::default()
            }
        };
        let _ = fs::remove_file(&metafile_path);

        let out_dir = normalize_path(&config.app_path.join(&config.out_dir));
        let assets = assets_from_metafile(&metafile, &config.app_path, &out_dir);

        Ok(Stats {
            errors,
            warnings,
            assets,
        })
    }

    fn serve(&self, config: &BundleConfig, server: &DevServerOptions) -> Result<()> {
        let args = serve_args(config, server);
        debug!("Serving with {} {}", self.esbuild_path.display(), args.join(" "));

        let status = self.command(config).args(&args).status().map_err(|e| {
            Error::Bundler(format!(
                "Failed to execute {}: {e}",
                self.esbuild_path.display()
            ))
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Bundler(format!("Development server exited with {status}")))
        }
    }
}
