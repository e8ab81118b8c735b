//! Monorepo workspace detection.
//!
//! When the app lives inside a Yarn/npm/Lerna workspace, the sibling packages
//! are compiled as if they were app source. Siblings are only picked up when
//! the workspace itself lists the app as a member.

use std::{
    fs,
    path::{Path, PathBuf},
};

use glob::{MatchOptions, Pattern, glob_with};
use tracing::{debug, warn};

use crate::{
    error::Result,
    manifest::{ManifestReader, find_nearest},
};

/// A sibling package directory of the app inside a monorepo.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkspaceMember {
    pub path: PathBuf,
}

/// Expand workspace globs to the directories holding a `package.json`.
///
/// Each glob is resolved as `<root>/<glob>/package.json`; the directory of
/// every match is returned, canonicalized when possible. The result is sorted
/// and free of duplicates.
#[must_use]
pub fn find_packages(root: &Path, globs: &[String]) -> Vec<PathBuf> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let escaped_root = Pattern::escape(&root.to_string_lossy());

    let mut packages: Vec<PathBuf> = globs
        .iter()
        .flat_map(|glob| {
            let pattern = format!(
                "{escaped_root}/{}/package.json",
                glob.trim_end_matches('/')
            );

            match glob_with(&pattern, options) {
                Ok(paths) => paths.filter_map(std::result::Result::ok).collect(),
                Err(e) => {
                    warn!("Ignoring invalid workspace glob {glob:?}: {e}");
                    Vec::new()
                }
            }
        })
        .filter_map(|manifest| manifest.parent().map(Path::to_path_buf))
        .map(|dir| fs::canonicalize(&dir).unwrap_or(dir))
        .collect();

    packages.sort();
    packages.dedup();
    packages
}

/// Find the other members of the workspace the app belongs to.
///
/// The nearest `package.json` above `app_directory` is treated as the
/// workspace root. An empty list is returned when there is no such manifest,
/// when it declares no workspaces, or when the app is not one of the
/// expanded members.
///
/// # Arguments
///
/// * `app_directory` - Canonical app directory
/// * `reader` - Manifest source
///
/// # Errors
///
/// Returns an error if the workspace root manifest cannot be parsed.
pub fn monorepo_members(
    app_directory: &Path,
    reader: &impl ManifestReader,
) -> Result<Vec<WorkspaceMember>> {
    let Some(parent) = app_directory.parent() else {
        return Ok(Vec::new());
    };
    let Some(root_manifest) = find_nearest(parent, reader) else {
        return Ok(Vec::new());
    };
    let Some(manifest) = reader.read(&root_manifest)? else {
        return Ok(Vec::new());
    };

    let globs = manifest.workspace_globs();
    if globs.is_empty() {
        return Ok(Vec::new());
    }

    let root = root_manifest.parent().unwrap_or(parent);
    let packages = find_packages(root, globs);

    if !packages.iter().any(|p| p == app_directory) {
        debug!(
            "{} is not a member of the workspace at {}",
            app_directory.display(),
            root.display()
        );
        return Ok(Vec::new());
    }

    let members: Vec<WorkspaceMember> = packages
        .into_iter()
        .filter(|p| p != app_directory)
        .map(|path| WorkspaceMember { path })
        .collect();

    debug!(
        "Found {} workspace sibling(s) under {}",
        members.len(),
        root.display()
    );

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::FsManifestReader;
    use tempfile::TempDir;

    fn create_package(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();
    }

    fn canonical_root(temp_dir: &TempDir) -> PathBuf {
        fs::canonicalize(temp_dir.path()).unwrap()
    }

    #[test]
    fn test_find_packages_expands_globs() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_package(&root.join("packages/foo"));
        create_package(&root.join("packages/bar"));
        fs::create_dir_all(root.join("packages/no-manifest")).unwrap();

        let packages = find_packages(&root, &["packages/*".to_string()]);

        assert_eq!(
            packages,
            vec![root.join("packages/bar"), root.join("packages/foo")]
        );
    }

    #[test]
    fn test_find_packages_skips_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_package(&root.join("packages/foo"));
        create_package(&root.join("packages/.template"));

        let packages = find_packages(&root, &["packages/*".to_string()]);

        assert_eq!(packages, vec![root.join("packages/foo")]);
    }

    #[test]
    fn test_find_packages_dedups_overlapping_globs() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        create_package(&root.join("packages/foo"));

        let packages = find_packages(
            &root,
            &["packages/*".to_string(), "packages/foo/".to_string()],
        );

        assert_eq!(packages, vec![root.join("packages/foo")]);
    }

    #[test]
    fn test_members_include_siblings_when_app_is_member() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        fs::write(
            root.join("package.json"),
            r#"{ "workspaces": ["packages/*"] }"#,
        )
        .unwrap();
        create_package(&root.join("packages/app"));
        create_package(&root.join("packages/shared"));
        create_package(&root.join("packages/ui"));

        let members = monorepo_members(&root.join("packages/app"), &FsManifestReader).unwrap();
        let paths: Vec<_> = members.into_iter().map(|m| m.path).collect();

        assert_eq!(
            paths,
            vec![root.join("packages/shared"), root.join("packages/ui")]
        );
    }

    #[test]
    fn test_members_empty_when_app_outside_globs() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        fs::write(
            root.join("package.json"),
            r#"{ "workspaces": ["packages/*"] }"#,
        )
        .unwrap();
        create_package(&root.join("packages/foo"));
        create_package(&root.join("packages/bar"));
        create_package(&root.join("apps/web"));

        let members = monorepo_members(&root.join("apps/web"), &FsManifestReader).unwrap();

        assert!(members.is_empty());
    }

    #[test]
    fn test_members_empty_without_workspaces_field() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        fs::write(root.join("package.json"), r#"{ "name": "root" }"#).unwrap();
        create_package(&root.join("packages/app"));
        create_package(&root.join("packages/other"));

        let members = monorepo_members(&root.join("packages/app"), &FsManifestReader).unwrap();

        assert!(members.is_empty());
    }

    #[test]
    fn test_members_malformed_root_manifest_errors() {
        let temp_dir = TempDir::new().unwrap();
        let root = canonical_root(&temp_dir);
        fs::write(root.join("package.json"), "{ broken").unwrap();
        create_package(&root.join("packages/app"));

        let result = monorepo_members(&root.join("packages/app"), &FsManifestReader);

        assert!(matches!(
            result,
            Err(crate::error::Error::ManifestParse { .. })
        ));
    }
}
