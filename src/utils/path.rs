//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem.
///
/// # Examples
///
/// ```
/// # use std::path::{Path, PathBuf};
/// # use spa_scripts::utils::normalize_path;
/// assert_eq!(normalize_path(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Render a relative path with `/` separators, dropping any root or prefix.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
