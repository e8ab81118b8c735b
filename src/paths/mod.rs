//! Project path resolution.
//!
//! This module maps the well-known project locations (sources, public assets,
//! build output, manifest, ...) to absolute paths. Two layouts exist:
//!
//! - [`ProjectPaths::Ejected`] - paths point into the invoking project. This is
//!   the normal case, and the only one where monorepo siblings are added as
//!   extra source roots.
//! - [`ProjectPaths::Template`] - the tool is run from its own install
//!   directory, so paths point into the packaged `template/` instead.
//!
//! Resolution is a pure function of its inputs and the filesystem contents.

mod served;
mod workspace;

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{Error, Result},
    manifest::ManifestReader,
    utils::normalize_path,
};

pub use served::{ensure_slash, public_url, served_path};
pub use workspace::{WorkspaceMember, find_packages, monorepo_members};

/// Inputs of the path resolver.
#[derive(Clone, Debug)]
pub struct ResolveOptions {
    /// The directory the tool was invoked from.
    pub app_directory: PathBuf,

    /// The tool's own install directory, holding `template/` and `config/`.
    pub own_directory: PathBuf,

    /// Explicit public URL override (the `PUBLIC_URL` environment variable
    /// or `--public-url`).
    pub public_url: Option<String>,
}

/// Locations of a project, all absolute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppPaths {
    pub dotenv: PathBuf,
    pub app_path: PathBuf,
    pub app_build: PathBuf,
    pub app_public: PathBuf,
    pub app_html: PathBuf,
    pub app_index_js: PathBuf,
    pub app_package_json: PathBuf,
    pub app_src: PathBuf,
    pub yarn_lock_file: PathBuf,
    pub tests_setup: PathBuf,
    pub app_node_modules: PathBuf,
    pub public_url: Option<String>,
    pub served_path: String,

    /// Every directory compiled as app source. Starts with `app_src`.
    pub src_paths: Vec<PathBuf>,
}

/// Locations of the tool itself. Only present in the template layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnPaths {
    pub own_path: PathBuf,
    pub own_node_modules: PathBuf,
}

/// Resolved project locations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProjectPaths {
    Ejected(AppPaths),
    Template { app: AppPaths, own: OwnPaths },
}

impl ProjectPaths {
    #[must_use]
    pub const fn app(&self) -> &AppPaths {
        match self {
            Self::Ejected(app) | Self::Template { app, .. } => app,
        }
    }

    #[must_use]
    pub const fn own(&self) -> Option<&OwnPaths> {
        match self {
            Self::Ejected(_) => None,
            Self::Template { own, .. } => Some(own),
        }
    }

    #[must_use]
    pub const fn is_template(&self) -> bool {
        matches!(self, Self::Template { .. })
    }
}

/// Resolve every project location.
///
/// # Arguments
///
/// * `options` - Working directory, tool directory and public URL override
/// * `reader` - Source of `package.json` contents
///
/// # Returns
///
/// [`ProjectPaths::Template`] when the working directory is the tool's own
/// directory, [`ProjectPaths::Ejected`] otherwise.
///
/// # Errors
///
/// - [`Error::Resolution`] if the working directory cannot be canonicalized
/// - [`Error::ManifestParse`] if a consulted `package.json` is malformed
///
/// # Examples
///
/// ```no_run
/// # use spa_scripts::{manifest::FsManifestReader, paths::{resolve, ResolveOptions}};
/// let options = ResolveOptions {
///     app_directory: std::env::current_dir()?,
///     own_directory: "/usr/lib/spa-scripts".into(),
///     public_url: None,
/// };
/// let paths = resolve(&options, &FsManifestReader)?;
/// println!("Building into {}", paths.app().app_build.display());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve(options: &ResolveOptions, reader: &impl ManifestReader) -> Result<ProjectPaths> {
    let app_directory =
        fs::canonicalize(&options.app_directory).map_err(|source| Error::Resolution {
            path: options.app_directory.clone(),
            source,
        })?;

    // An own directory that cannot be resolved can never equal the app.
    let own_directory = fs::canonicalize(&options.own_directory).ok();
    let public_url_override = options.public_url.as_deref();

    if own_directory.as_deref() == Some(app_directory.as_path()) {
        debug!("Running from the tool directory, using the packaged template");
        let own = app_directory.clone();
        let app = template_paths(&app_directory, &own, public_url_override, reader)?;

        return Ok(ProjectPaths::Template {
            app,
            own: OwnPaths {
                own_node_modules: own.join("node_modules"),
                own_path: own,
            },
        });
    }

    let mut app = app_paths(&app_directory, public_url_override, reader)?;
    app.src_paths.extend(
        monorepo_members(&app_directory, reader)?
            .into_iter()
            .map(|member| member.path),
    );

    Ok(ProjectPaths::Ejected(app))
}

fn app_paths(
    app: &Path,
    public_url_override: Option<&str>,
    reader: &impl ManifestReader,
) -> Result<AppPaths> {
    let package_json = app.join("package.json");
    let (public_url, served_path) = hosting(&package_json, public_url_override, reader)?;
    let app_src = app.join("src");

    Ok(AppPaths {
        dotenv: app.join(".env"),
        app_path: app.to_path_buf(),
        app_build: app.join("build"),
        app_public: app.join("public"),
        app_html: app.join("public").join("index.html"),
        app_index_js: app_src.join("index.js"),
        app_package_json: package_json,
        yarn_lock_file: app.join("yarn.lock"),
        tests_setup: app_src.join("setupTests.js"),
        app_node_modules: app.join("node_modules"),
        public_url,
        served_path,
        src_paths: vec![app_src.clone()],
        app_src,
    })
}

fn template_paths(
    app: &Path,
    own: &Path,
    public_url_override: Option<&str>,
    reader: &impl ManifestReader,
) -> Result<AppPaths> {
    let template = own.join("template");
    let package_json = own.join("package.json");
    let (public_url, served_path) = hosting(&package_json, public_url_override, reader)?;
    let app_src = template.join("src");

    Ok(AppPaths {
        dotenv: template.join(".env"),
        app_path: app.to_path_buf(),
        app_build: normalize_path(&own.join("../../build")),
        app_public: template.join("public"),
        app_html: template.join("public").join("index.html"),
        app_index_js: app_src.join("index.js"),
        app_package_json: package_json,
        yarn_lock_file: template.join("yarn.lock"),
        tests_setup: app_src.join("setupTests.js"),
        app_node_modules: own.join("node_modules"),
        public_url,
        served_path,
        src_paths: vec![app_src.clone()],
        app_src,
    })
}

/// Public URL and served path derived from the manifest at `package_json`.
fn hosting(
    package_json: &Path,
    public_url_override: Option<&str>,
    reader: &impl ManifestReader,
) -> Result<(Option<String>, String)> {
    let manifest = reader.read(package_json)?.unwrap_or_default();
    let homepage = manifest.homepage();

    Ok((
        public_url(public_url_override, homepage),
        served_path(public_url_override, homepage),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{FsManifestReader, PackageManifest, Workspaces};
    use std::{cell::RefCell, collections::HashMap};
    use tempfile::TempDir;

    /// Manifest source backed by a map, recording every lookup.
    #[derive(Default)]
    struct MapReader {
        manifests: HashMap<PathBuf, PackageManifest>,
        reads: RefCell<Vec<PathBuf>>,
    }

    impl ManifestReader for MapReader {
        fn read(&self, path: &Path) -> Result<Option<PackageManifest>> {
            self.reads.borrow_mut().push(path.to_path_buf());
            Ok(self.manifests.get(path).cloned())
        }

        fn exists(&self, path: &Path) -> bool {
            self.manifests.contains_key(path)
        }
    }

    fn options(app: &Path, own: &Path) -> ResolveOptions {
        ResolveOptions {
            app_directory: app.to_path_buf(),
            own_directory: own.to_path_buf(),
            public_url: None,
        }
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        let app = root.join("my-app");
        let own = root.join("tool").join("node_modules").join("spa-scripts");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&own).unwrap();
        (temp_dir, app, own)
    }

    #[test]
    fn test_resolve_ejected_layout() {
        let (_temp_dir, app, own) = setup();
        fs::write(app.join("package.json"), r#"{ "name": "my-app" }"#).unwrap();

        let paths = resolve(&options(&app, &own), &FsManifestReader).unwrap();

        assert!(!paths.is_template());
        assert!(paths.own().is_none());
        let a = paths.app();
        assert_eq!(a.app_path, app);
        assert_eq!(a.dotenv, app.join(".env"));
        assert_eq!(a.app_build, app.join("build"));
        assert_eq!(a.app_public, app.join("public"));
        assert_eq!(a.app_html, app.join("public/index.html"));
        assert_eq!(a.app_index_js, app.join("src/index.js"));
        assert_eq!(a.app_package_json, app.join("package.json"));
        assert_eq!(a.app_src, app.join("src"));
        assert_eq!(a.yarn_lock_file, app.join("yarn.lock"));
        assert_eq!(a.tests_setup, app.join("src/setupTests.js"));
        assert_eq!(a.app_node_modules, app.join("node_modules"));
        assert_eq!(a.public_url, None);
        assert_eq!(a.served_path, "/");
        assert_eq!(a.src_paths, vec![app.join("src")]);
    }

    #[test]
    fn test_resolve_template_layout() {
        let (_temp_dir, _app, own) = setup();
        fs::write(
            own.join("package.json"),
            r#"{ "homepage": "http://user.github.io/template" }"#,
        )
        .unwrap();

        let paths = resolve(&options(&own, &own), &FsManifestReader).unwrap();

        let ProjectPaths::Template { app, own: own_paths } = &paths else {
            panic!("expected template layout, got {paths:?}");
        };
        let template = own.join("template");
        assert_eq!(app.app_path, own);
        assert_eq!(app.dotenv, template.join(".env"));
        assert_eq!(app.app_src, template.join("src"));
        assert_eq!(app.app_html, template.join("public/index.html"));
        assert_eq!(app.app_package_json, own.join("package.json"));
        assert_eq!(app.app_node_modules, own.join("node_modules"));
        assert_eq!(app.app_build, own.parent().unwrap().parent().unwrap().join("build"));
        assert_eq!(app.served_path, "/template/");
        assert_eq!(own_paths.own_path, own);
        assert_eq!(own_paths.own_node_modules, own.join("node_modules"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlinked_working_directory() {
        let (temp_dir, app, own) = setup();
        let link = temp_dir.path().join("link-to-app");
        std::os::unix::fs::symlink(&app, &link).unwrap();

        let paths = resolve(&options(&link, &own), &FsManifestReader).unwrap();

        assert_eq!(paths.app().app_path, app);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_broken_symlink_is_resolution_error() {
        let (temp_dir, _app, own) = setup();
        let link = temp_dir.path().join("dangling");
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), &link).unwrap();

        let result = resolve(&options(&link, &own), &FsManifestReader);

        assert!(matches!(result, Err(Error::Resolution { .. })));
    }

    #[test]
    fn test_resolve_missing_own_directory_is_not_template() {
        let (_temp_dir, app, own) = setup();

        let paths = resolve(&options(&app, &own.join("missing")), &FsManifestReader).unwrap();

        assert!(!paths.is_template());
    }

    #[test]
    fn test_resolve_malformed_manifest_errors() {
        let (_temp_dir, app, own) = setup();
        fs::write(app.join("package.json"), "{ nope").unwrap();

        let result = resolve(&options(&app, &own), &FsManifestReader);

        assert!(matches!(result, Err(Error::ManifestParse { .. })));
    }

    #[test]
    fn test_resolve_public_url_override_wins() {
        let (_temp_dir, app, own) = setup();
        let reader = MapReader {
            manifests: HashMap::from([(
                app.join("package.json"),
                PackageManifest {
                    homepage: Some("http://user.github.io/app".to_string()),
                    ..PackageManifest::default()
                },
            )]),
            ..MapReader::default()
        };
        let mut opts = options(&app, &own);

        let paths = resolve(&opts, &reader).unwrap();
        assert_eq!(
            paths.app().public_url.as_deref(),
            Some("http://user.github.io/app")
        );
        assert_eq!(paths.app().served_path, "/app/");

        opts.public_url = Some("/cdn".to_string());
        let paths = resolve(&opts, &reader).unwrap();
        assert_eq!(paths.app().public_url.as_deref(), Some("/cdn"));
        assert_eq!(paths.app().served_path, "/cdn/");
    }

    #[test]
    fn test_resolve_reads_app_manifest_through_reader() {
        let (_temp_dir, app, own) = setup();
        let reader = MapReader::default();

        resolve(&options(&app, &own), &reader).unwrap();

        assert!(reader.reads.borrow().contains(&app.join("package.json")));
    }

    #[test]
    fn test_resolve_finds_workspace_root_through_reader() {
        let (_temp_dir, app, own) = setup();
        let root = app.parent().unwrap().to_path_buf();
        fs::write(app.join("package.json"), "{}").unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("lib/package.json"), "{}").unwrap();
        let reader = MapReader {
            manifests: HashMap::from([(
                root.join("package.json"),
                PackageManifest {
                    workspaces: Some(Workspaces::Globs(vec!["*".to_string()])),
                    ..PackageManifest::default()
                },
            )]),
            ..MapReader::default()
        };

        let paths = resolve(&options(&app, &own), &reader).unwrap();

        assert_eq!(paths.app().src_paths, vec![app.join("src"), root.join("lib")]);
        assert!(reader.reads.borrow().contains(&root.join("package.json")));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let (_temp_dir, app, own) = setup();
        fs::write(
            app.join("package.json"),
            r#"{ "homepage": "https://example.com/x" }"#,
        )
        .unwrap();

        let first = resolve(&options(&app, &own), &FsManifestReader).unwrap();
        let second = resolve(&options(&app, &own), &FsManifestReader).unwrap();

        assert_eq!(first, second);
    }
}
