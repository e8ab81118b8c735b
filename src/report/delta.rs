//! Size difference classification between two builds.

use colored::{ColoredString, Colorize};
use humansize::{BINARY, format_size};

/// Increases of at least this many bytes are flagged as large.
pub const FIFTY_KILOBYTES: i64 = 1024 * 50;

/// How an asset's gzip size changed since the previous build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeDelta {
    /// Grew by at least [`FIFTY_KILOBYTES`].
    LargeIncrease(u64),

    /// Grew by less than [`FIFTY_KILOBYTES`].
    SmallIncrease(u64),

    /// Shrank by the given number of bytes.
    Decrease(u64),

    /// Same size, or no previous build to compare with.
    Unchanged,
}

impl SizeDelta {
    /// Classify the change from `previous` to `current`.
    ///
    /// A missing `previous` is incomparable and yields [`SizeDelta::Unchanged`].
    #[must_use]
    pub fn between(current: u64, previous: Option<u64>) -> Self {
        let Some(previous) = previous else {
            return Self::Unchanged;
        };

        let difference = current as i64 - previous as i64;

        if difference >= FIFTY_KILOBYTES {
            Self::LargeIncrease(difference.unsigned_abs())
        } else if difference > 0 {
            Self::SmallIncrease(difference.unsigned_abs())
        } else if difference < 0 {
            Self::Decrease(difference.unsigned_abs())
        } else {
            Self::Unchanged
        }
    }

    /// The uncolored label, e.g. `+1.5 KiB` or `-200 B`. Empty when unchanged.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::LargeIncrease(bytes) | Self::SmallIncrease(bytes) => {
                format!("+{}", format_size(*bytes, BINARY))
            }
            Self::Decrease(bytes) => format!("-{}", format_size(*bytes, BINARY)),
            Self::Unchanged => String::new(),
        }
    }

    /// The label colored by severity: red, yellow, or green.
    #[must_use]
    pub fn colored_label(&self) -> ColoredString {
        let label = self.label();

        match self {
            Self::LargeIncrease(_) => label.red(),
            Self::SmallIncrease(_) => label.yellow(),
            Self::Decrease(_) => label.green(),
            Self::Unchanged => label.normal(),
        }
    }

    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::strip_ansi;

    #[test]
    fn test_fifty_kilobytes_is_51200() {
        assert_eq!(FIFTY_KILOBYTES, 51200);
    }

    #[test]
    fn test_exactly_fifty_kilobytes_is_large() {
        assert_eq!(
            SizeDelta::between(61_200, Some(10_000)),
            SizeDelta::LargeIncrease(51_200)
        );
    }

    #[test]
    fn test_just_below_fifty_kilobytes_is_small() {
        assert_eq!(
            SizeDelta::between(61_199, Some(10_000)),
            SizeDelta::SmallIncrease(51_199)
        );
    }

    #[test]
    fn test_one_byte_less_is_decrease() {
        assert_eq!(SizeDelta::between(999, Some(1000)), SizeDelta::Decrease(1));
    }

    #[test]
    fn test_zero_and_missing_are_unflagged() {
        assert_eq!(SizeDelta::between(1000, Some(1000)), SizeDelta::Unchanged);
        assert_eq!(SizeDelta::between(1000, None), SizeDelta::Unchanged);
        assert!(!SizeDelta::Unchanged.is_flagged());
        assert!(SizeDelta::Decrease(1).is_flagged());
    }

    #[test]
    fn test_labels() {
        assert_eq!(SizeDelta::SmallIncrease(200).label(), "+200 B");
        assert_eq!(SizeDelta::LargeIncrease(51_200).label(), "+50 KiB");
        assert_eq!(SizeDelta::Decrease(1).label(), "-1 B");
        assert_eq!(SizeDelta::Unchanged.label(), "");
    }

    #[test]
    fn test_colored_label_keeps_text() {
        assert_eq!(
            strip_ansi(&SizeDelta::LargeIncrease(2048).colored_label().to_string()),
            "+2 KiB"
        );
    }
}
