//! Error types shared by the path resolver, the build reporter and the scripts.
//!
//! Every error is fatal to the current invocation: the binary prints it to
//! stderr and exits with a non-zero status code.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    /// A path (usually the working directory) could not be canonicalized,
    /// for example because it is a broken symlink.
    #[error("Failed to resolve {}: {source}", path.display())]
    Resolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `package.json` exists but is not valid JSON of the expected shape.
    #[error("Failed to parse {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A build artifact could not be read while measuring its gzip size.
    #[error("Failed to read build asset {}: {source}", path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bundler reported compile errors. Messages are kept verbatim.
    #[error("Failed to compile.\n\n{}", messages.join("\n\n"))]
    DelegatedBuild { messages: Vec<String> },

    #[error(
        "Bundler executable '{name}' not found. Install it with: npm install -g {name}\n\
         or point `bundler` in the config file at an existing executable."
    )]
    BundlerNotFound { name: String },

    /// The project cannot be ejected in its current state.
    #[error("Eject aborted: {0}")]
    Eject(String),

    /// The bundler could not be started or produced unusable output.
    #[error("Bundler failed: {0}")]
    Bundler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
