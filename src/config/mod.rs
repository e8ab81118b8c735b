//! Configuration types and options for the application.
//!
//! This module contains the persistent configuration file and the resolved
//! options handed to the scripts.

pub mod file;
pub mod server;

pub use file::FileConfig;
pub use server::{DEFAULT_HOST, DEFAULT_PORT, ServerOptions};
