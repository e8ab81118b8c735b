//! The `eject` script: copy the packaged configuration into the project.
//!
//! After ejecting, the project carries its own `config/` directory and its
//! `package.json` holds the test runner configuration under `jest`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use colored::Colorize;
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    paths::{AppPaths, ProjectPaths},
    test_runner::TestRunnerConfig,
};

/// File the test runner configuration is written to, relative to the project.
pub const TEST_RUNNER_CONFIG_FILE: &str = "config/test-runner.json";

/// Inputs of the `eject` script.
#[derive(Clone, Debug)]
pub struct EjectOptions {
    /// The tool's install directory; its `config/` is copied.
    pub own_directory: PathBuf,
}

/// How `eject` ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EjectOutcome {
    /// The user declined the confirmation.
    Aborted,

    /// Configuration was copied; holds the number of files written.
    Ejected { files: usize },
}

/// Eject the project.
///
/// # Arguments
///
/// * `paths` - Resolved project paths
/// * `options` - Where the packaged configuration lives
/// * `confirm` - Asks the user whether to proceed
///
/// # Errors
///
/// - [`Error::Eject`] when run from the tool's own directory or when the
///   project already has a `config/` directory
/// - [`Error::ManifestParse`] if `package.json` is malformed
/// - I/O errors while copying
pub fn eject(
    paths: &ProjectPaths,
    options: &EjectOptions,
    confirm: impl FnOnce() -> Result<bool>,
) -> Result<EjectOutcome> {
    if paths.is_template() {
        return Err(Error::Eject(
            "the tool's own template cannot be ejected".to_string(),
        ));
    }

    let app = paths.app();
    let target = app.app_path.join("config");
    if target.exists() {
        return Err(Error::Eject(format!(
            "{} already exists, was the project ejected before?",
            target.display()
        )));
    }

    if !confirm()? {
        println!("{}", "Close one! Eject aborted.".cyan());
        return Ok(EjectOutcome::Aborted);
    }

    let manifest = load_manifest(&app.app_package_json)?;

    println!("Ejecting...");

    let source = options.own_directory.join("config");
    let written = write_ejected_files(app, &source, &target, manifest);
    let files = match written {
        Ok(files) => files,
        Err(e) => {
            if let Err(cleanup) = fs::remove_dir_all(&target) {
                warn!("Cannot remove {}: {cleanup}", target.display());
            }
            return Err(e);
        }
    };

    println!("{}", "Ejected successfully!".green());

    Ok(EjectOutcome::Ejected { files })
}

/// Copy the configuration, write the test runner config and update the
/// manifest. Returns the number of files written under `target`.
fn write_ejected_files(
    app: &AppPaths,
    source: &Path,
    target: &Path,
    manifest: Option<Value>,
) -> Result<usize> {
    let mut files = copy_tree(source, target)?;

    let config =
        TestRunnerConfig::create(|p| format!("<rootDir>/{p}"), None, true, app);
    let json = config
        .to_json()
        .map_err(|e| Error::Eject(format!("cannot serialize test runner config: {e}")))?;
    fs::write(app.app_path.join(TEST_RUNNER_CONFIG_FILE), format!("{json}\n"))?;
    files += 1;

    if let Some(manifest) = manifest {
        add_test_runner_to_manifest(&app.app_package_json, manifest, &config)?;
    }

    Ok(files)
}

/// Copy every file under `source` to `target`, creating `target` even when
/// `source` is missing.
fn copy_tree(source: &Path, target: &Path) -> Result<usize> {
    fs::create_dir_all(target)?;

    if !source.is_dir() {
        warn!("No packaged configuration at {}", source.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(source)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            debug!("Adding {}", dest.display());
            fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Read `package.json` as a JSON object; `None` when the file is missing.
fn load_manifest(manifest: &Path) -> Result<Option<Value>> {
    let content = match fs::read_to_string(manifest) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, skipping its update", manifest.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let value: Value = serde_json::from_str(&content).map_err(|source| Error::ManifestParse {
        path: manifest.to_path_buf(),
        source,
    })?;
    if !value.is_object() {
        return Err(Error::Eject(format!(
            "{} does not hold a JSON object",
            manifest.display()
        )));
    }

    Ok(Some(value))
}

/// Set the `jest` field of `package.json`, keeping every other field.
fn add_test_runner_to_manifest(
    manifest: &Path,
    mut value: Value,
    config: &TestRunnerConfig,
) -> Result<()> {
    let parse_error = |source| Error::ManifestParse {
        path: manifest.to_path_buf(),
        source,
    };
    let jest = serde_json::to_value(config).map_err(parse_error)?;
    if let Value::Object(fields) = &mut value {
        fields.insert("jest".to_string(), jest);
    }

    let updated = serde_json::to_string_pretty(&value).map_err(parse_error)?;
    fs::write(manifest, format!("{updated}\n"))?;

    Ok(())
}
