//! Build size reporting.
//!
//! Before a build, the gzip sizes of the existing scripts and stylesheets are
//! recorded ([`measure_file_sizes`]); the output directory is then emptied
//! ([`clear_directory`]). After the bundler ran, [`FileSizeReport`] measures the
//! new assets and prints them, largest first, with the size difference to the
//! previous build.
//!
//! ```text
//!   48.33 KiB (+1.2 KiB)  build/static/js/main.8b1a5c6d.js
//!   1.01 KiB              build/static/css/main.0d2e4f1a.css
//! ```

mod delta;
mod snapshot;

use std::path::Path;

use colored::Colorize;
use humansize::{BINARY, format_size};

use crate::error::Result;

pub use delta::{FIFTY_KILOBYTES, SizeDelta};
pub use snapshot::{
    SizeSnapshot, clear_directory, gzip_file_size, gzip_size, is_tracked_asset,
    measure_file_sizes, remove_file_name_hash,
};

/// One measured asset of the current build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSize {
    /// Folder shown in the report, e.g. `build/static/js`.
    pub folder: String,

    /// File name, including its fingerprint hash.
    pub name: String,

    /// Gzip size in bytes.
    pub size: u64,

    pub delta: SizeDelta,
}

impl AssetSize {
    /// The uncolored size column, e.g. `48.33 KiB (+1.2 KiB)`.
    #[must_use]
    pub fn size_label(&self) -> String {
        let size = format_size(self.size, BINARY);

        if self.delta.is_flagged() {
            format!("{size} ({})", self.delta.label())
        } else {
            size
        }
    }

    fn colored_size_label(&self) -> String {
        let size = format_size(self.size, BINARY);

        if self.delta.is_flagged() {
            format!("{size} ({})", self.delta.colored_label())
        } else {
            size
        }
    }
}

/// Gzip sizes of the current build, compared to the previous one.
#[derive(Clone, Debug, Default)]
pub struct FileSizeReport {
    assets: Vec<AssetSize>,
}

impl FileSizeReport {
    /// Measure the emitted assets and compare them with `previous`.
    ///
    /// # Arguments
    ///
    /// * `build_dir` - The build output directory
    /// * `asset_names` - Emitted asset names, relative to `build_dir`
    /// * `previous` - Snapshot taken before the output directory was cleared
    ///
    /// Only `.js` and `.css` assets are measured. The result is sorted by
    /// gzip size, largest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AssetRead`] if an emitted asset cannot be read.
    pub fn from_assets<'a>(
        build_dir: &Path,
        asset_names: impl IntoIterator<Item = &'a str>,
        previous: &SizeSnapshot,
    ) -> Result<Self> {
        let mut assets = Vec::new();

        for asset_name in asset_names {
            if !is_tracked_asset(asset_name) {
                continue;
            }

            let size = gzip_file_size(&build_dir.join(asset_name))?;
            let previous_size = previous.get(&remove_file_name_hash(asset_name)).copied();
            let (folder, name) = split_asset_name(asset_name);

            assets.push(AssetSize {
                folder,
                name,
                size,
                delta: SizeDelta::between(size, previous_size),
            });
        }

        Ok(Self::new(assets))
    }

    /// Build a report from already measured assets.
    #[must_use]
    pub fn new(mut assets: Vec<AssetSize>) -> Self {
        assets.sort_by(|a, b| b.size.cmp(&a.size));
        Self { assets }
    }

    #[must_use]
    pub fn assets(&self) -> &[AssetSize] {
        &self.assets
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Render one line per asset.
    ///
    /// Size labels are padded to the widest label. Widths are measured on the
    /// uncolored text so terminal escape codes do not break the alignment.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let longest = self
            .assets
            .iter()
            .map(|a| a.size_label().chars().count())
            .max()
            .unwrap_or(0);

        self.assets
            .iter()
            .map(|asset| {
                let padding = longest - asset.size_label().chars().count();
                format!(
                    "  {}{}  {}{}",
                    asset.colored_size_label(),
                    " ".repeat(padding),
                    format!("{}/", asset.folder).dimmed(),
                    asset.name.cyan()
                )
            })
            .collect()
    }

    /// Print the rendered report to stdout.
    pub fn print(&self) {
        for line in self.render() {
            println!("{line}");
        }
    }
}

/// Split `static/js/main.abc.js` into (`build/static/js`, `main.abc.js`).
fn split_asset_name(asset_name: &str) -> (String, String) {
    let normalized = asset_name.replace('\\', "/");
    let normalized = normalized.trim_start_matches('/');

    match normalized.rsplit_once('/') {
        Some((dir, name)) => (format!("build/{dir}"), name.to_string()),
        None => ("build".to_string(), normalized.to_string()),
    }
}
