// Timestamp providers for console lines
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use std::fmt::Write;
use tracing::warn;

use crate::domain::config::default_timestamp_format;

/// Whether chrono can render `format` without a formatting error
pub fn is_valid_timestamp_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Supplies the timestamp text printed at the start of each console line
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Local wall-clock time rendered with a chrono format string
#[derive(Debug, Clone)]
pub struct SystemClock {
    format: String,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::with_format(default_timestamp_format())
    }

    /// Invalid formats fall back to the default one
    pub fn with_format(format: impl Into<String>) -> Self {
        let format = format.into();
        if is_valid_timestamp_format(&format) {
            return Self { format };
        }

        warn!("Invalid timestamp format '{}', using default", format);
        Self {
            format: default_timestamp_format(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> String {
        let now = Local::now();
        let mut stamp = String::new();
        if write!(stamp, "{}", now.format(&self.format)).is_err() {
            stamp.clear();
            let _ = write!(stamp, "{}", now.format(&default_timestamp_format()));
        }
        stamp
    }
}

/// Always reports the same timestamp
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
