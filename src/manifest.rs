//! `package.json` access.
//!
//! Only the fields the path resolver and the scripts care about are
//! deserialized; everything else in the manifest is ignored.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::{Error, Result};

/// The subset of a `package.json` used by this tool.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: Option<String>,

    /// Absolute or relative URL the app is hosted at.
    pub homepage: Option<String>,

    /// Workspace globs of a monorepo root.
    pub workspaces: Option<Workspaces>,
}

/// The two shapes of the `workspaces` field.
///
/// npm and Yarn accept a plain array of globs; Yarn additionally accepts an
/// object with a `packages` array (and `nohoist`, which is ignored here).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Workspaces {
    Globs(Vec<String>),
    Config {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl Workspaces {
    #[must_use]
    pub fn globs(&self) -> &[String] {
        match self {
            Self::Globs(globs) => globs,
            Self::Config { packages } => packages,
        }
    }
}

impl PackageManifest {
    /// Parse a manifest from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestParse`] tagged with `path` when the text is not
    /// a JSON object of the expected shape.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The non-empty `homepage` field, if any.
    #[must_use]
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref().filter(|h| !h.is_empty())
    }

    /// The declared workspace globs, empty when the field is absent.
    #[must_use]
    pub fn workspace_globs(&self) -> &[String] {
        self.workspaces.as_ref().map_or(&[], Workspaces::globs)
    }
}

/// Source of package manifests, injected into the path resolver.
pub trait ManifestReader {
    /// Read the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::ManifestParse`] for malformed manifests
    /// and [`Error::Io`] for read failures other than "not found".
    fn read(&self, path: &Path) -> Result<Option<PackageManifest>>;

    /// Whether a manifest exists at `path`.
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Reads manifests straight from the filesystem.
///
/// A missing file is `Ok(None)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsManifestReader;

impl ManifestReader for FsManifestReader {
    fn read(&self, path: &Path) -> Result<Option<PackageManifest>> {
        match fs::read_to_string(path) {
            Ok(content) => PackageManifest::parse(&content, path).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Find the nearest `package.json` in `start` or any of its ancestors.
#[must_use]
pub fn find_nearest(start: &Path, reader: &impl ManifestReader) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("package.json"))
        .find(|candidate| reader.exists(candidate))
}
