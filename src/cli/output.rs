use crate::cli::args::OutputFormat;
use crate::core::memory::MemorySnapshot;
use crate::domain::config::CmdlogConfig;
use serde_json;
use std::io::{self, Write};
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_memory(&self, snapshot: &MemorySnapshot) -> Result<(), OutputError>;
    fn write_config(&self, config: &CmdlogConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::CmdlogError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render an informational message in this writer's format
    pub fn render_message(&self, message: &str) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "message": message,
                "level": "info"
            }))?,
            _ => message.to_string(),
        })
    }

    /// Render an error in this writer's format
    pub fn render_error(&self, error: &str) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "error": error,
                "level": "error"
            }))?,
            _ => format!("Error: {}", error),
        })
    }

    /// Render a memory snapshot in this writer's format
    pub fn render_memory(&self, snapshot: &MemorySnapshot) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Text => snapshot.summary(),
            OutputFormat::Json => serde_json::to_string_pretty(&MemoryRow::from(snapshot))?,
            OutputFormat::Table => Table::new([MemoryRow::from(snapshot)]).to_string(),
        })
    }

    /// Render a configuration in this writer's format
    pub fn render_config(&self, config: &CmdlogConfig) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Text => {
                let mut text = String::from("Cmdlog Configuration:\n");
                text.push_str(&format!("  Log level: {}\n", config.global.log_level));
                text.push_str(&format!("  Console enabled: {}\n", config.reporter.enabled));
                text.push_str(&format!("  Category: {}\n", config.reporter.category));
                text.push_str(&format!("  Timestamp format: {}", config.reporter.timestamp_format));
                text
            }
            OutputFormat::Json => serde_json::to_string_pretty(config)?,
            OutputFormat::Table => Table::new(ConfigRow::rows(config)).to_string(),
        })
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_memory(&self, snapshot: &MemorySnapshot) -> Result<(), OutputError> {
        let rendered = self.render_memory(snapshot)?;
        writeln!(io::stdout(), "{}", rendered)?;
        Ok(())
    }

    fn write_config(&self, config: &CmdlogConfig) -> Result<(), OutputError> {
        let rendered = self.render_config(config)?;
        writeln!(io::stdout(), "{}", rendered)?;
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        let rendered = self.render_message(message)?;
        writeln!(io::stdout(), "{}", rendered)?;
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        let rendered = self.render_error(error)?;
        writeln!(io::stderr(), "{}", rendered)?;
        Ok(())
    }
}

/// Table row for memory usage
#[derive(Tabled, serde::Serialize)]
struct MemoryRow {
    #[tabled(rename = "Current (MB)")]
    current_mb: f64,
    #[tabled(rename = "Peak (MB)")]
    peak_mb: f64,
}

impl From<&MemorySnapshot> for MemoryRow {
    fn from(snapshot: &MemorySnapshot) -> Self {
        Self {
            current_mb: snapshot.current_mb(),
            peak_mb: snapshot.peak_mb(),
        }
    }
}

/// Table row for configuration entries
#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl ConfigRow {
    fn rows(config: &CmdlogConfig) -> Vec<Self> {
        vec![
            Self {
                key: "global.log_level",
                value: config.global.log_level.clone(),
            },
            Self {
                key: "reporter.enabled",
                value: config.reporter.enabled.to_string(),
            },
            Self {
                key: "reporter.category",
                value: config.reporter.category.clone(),
            },
            Self {
                key: "reporter.timestamp_format",
                value: config.reporter.timestamp_format.clone(),
            },
        ]
    }
}
