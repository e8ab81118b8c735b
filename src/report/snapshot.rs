//! Gzip size snapshots of a build output directory.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::Path,
};

use flate2::{Compression, write::GzEncoder};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    utils::to_slash,
};

/// Hash-stripped asset name to gzip size in bytes.
pub type SizeSnapshot = BTreeMap<String, u64>;

/// Whether `name` is a script or stylesheet the report tracks.
#[must_use]
pub fn is_tracked_asset(name: &str) -> bool {
    name.ends_with(".js") || name.ends_with(".css")
}

/// Size of `contents` after gzip at the highest compression level.
///
/// # Errors
///
/// Returns the encoder's I/O error if compression fails.
pub fn gzip_size(contents: &[u8]) -> std::io::Result<u64> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(contents)?;

    Ok(encoder.finish()?.len() as u64)
}

/// Read a file and return its gzip size.
///
/// # Errors
///
/// Returns [`Error::AssetRead`] if the file cannot be read.
pub fn gzip_file_size(path: &Path) -> Result<u64> {
    let asset_read = |source| Error::AssetRead {
        path: path.to_path_buf(),
        source,
    };
    let contents = fs::read(path).map_err(asset_read)?;

    gzip_size(&contents).map_err(asset_read)
}

/// Remove the fingerprint hash the bundler inserts before the extension.
///
/// `static/js/main.3f2a1c9d.js` becomes `static/js/main.js`. Names without a
/// hash segment, and names that are not `.js`/`.css`, are returned with only
/// their separators normalized to `/`.
///
/// # Examples
///
/// ```
/// # use spa_scripts::report::remove_file_name_hash;
/// assert_eq!(remove_file_name_hash("main.3f2a1c9d.js"), "main.js");
/// assert_eq!(remove_file_name_hash("styles.css"), "styles.css");
/// ```
#[must_use]
pub fn remove_file_name_hash(name: &str) -> String {
    let name = name.replace('\\', "/");
    let name = name.trim_start_matches('/');

    let (dir, file) = match name.rfind('/') {
        Some(idx) => name.split_at(idx + 1),
        None => ("", name),
    };

    let Some(ext) = [".js", ".css"].into_iter().find(|ext| file.ends_with(ext)) else {
        return name.to_string();
    };

    let stem = &file[..file.len() - ext.len()];
    match stem.rfind('.') {
        Some(dot)
            if dot + 1 < stem.len()
                && stem[dot + 1..]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            format!("{dir}{}{ext}", &stem[..dot])
        }
        _ => name.to_string(),
    }
}

/// Measure every script and stylesheet currently in `build_dir`.
///
/// This has to run before the directory is cleared, so the new build can be
/// compared against it. A missing directory yields an empty snapshot.
///
/// # Errors
///
/// Returns [`Error::AssetRead`] if a tracked file cannot be read.
pub fn measure_file_sizes(build_dir: &Path) -> Result<SizeSnapshot> {
    let mut snapshot = SizeSnapshot::new();

    if !build_dir.is_dir() {
        return Ok(snapshot);
    }

    for entry in WalkDir::new(build_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let Ok(relative) = entry.path().strip_prefix(build_dir) else {
            continue;
        };
        let relative = to_slash(relative);

        if !is_tracked_asset(&relative) {
            continue;
        }

        let size = gzip_file_size(entry.path())?;
        snapshot.insert(remove_file_name_hash(&relative), size);
    }

    Ok(snapshot)
}

/// Remove everything inside `dir` but keep `dir` itself.
///
/// A shell whose working directory is `dir` stays valid afterwards. A missing
/// directory is left alone.
///
/// # Errors
///
/// Returns an I/O error if an entry cannot be removed.
pub fn clear_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}
