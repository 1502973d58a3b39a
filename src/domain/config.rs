use serde::{Deserialize, Serialize};

use crate::core::clock::is_valid_timestamp_format;
use crate::domain::error::{CmdlogError, CmdlogResult};

/// Cmdlog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmdlogConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Message reporter settings
    #[serde(default)]
    pub reporter: ReporterConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level for the diagnostic subscriber
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Message reporter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Print progress lines to the console
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Category attached to records forwarded to the error sink
    #[serde(default = "default_category")]
    pub category: String,
    /// chrono format string for console timestamps
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_enabled() -> bool {
    true
}

pub(crate) fn default_category() -> String {
    "application".to_string()
}

pub(crate) fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ReporterConfig {
    /// Reject settings the reporter would have to replace at runtime
    pub fn validate(&self) -> CmdlogResult<()> {
        if !is_valid_timestamp_format(&self.timestamp_format) {
            return Err(CmdlogError::Config {
                message: format!("Invalid timestamp_format '{}'", self.timestamp_format),
            });
        }
        Ok(())
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            category: default_category(),
            timestamp_format: default_timestamp_format(),
        }
    }
}
