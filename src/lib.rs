//! # spa-scripts
//!
//! Build tooling for single-page web applications: resolves where a project's
//! sources, assets and manifest live, delegates compiling to an external
//! bundler, and reports how the gzip size of every emitted asset changed
//! since the previous build.
//!
//! This library provides the core functionality of the `spa-scripts` CLI:
//! path resolution ([`paths`]), size reporting ([`report`]), the bundler
//! interface ([`bundler`]) and the `build`, `start` and `eject` scripts
//! ([`scripts`]).

pub mod bundler;
pub mod config;
pub mod error;
pub mod html;
pub mod manifest;
pub mod paths;
pub mod report;
pub mod scripts;
pub mod test_runner;
pub mod utils;

pub use error::{Error, Result};
