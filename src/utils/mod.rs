//! Utility functions and helpers.
//!
//! This module contains path helpers shared by the resolver, the reporter and
//! the bundler integration.

pub mod path;

pub use path::{expand_tilde, normalize_path, to_slash};

/// Remove terminal color escape sequences (`ESC [ ... m`) from `text`.
#[cfg(test)]
pub(crate) fn strip_ansi(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }

    plain
}
