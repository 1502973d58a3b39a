use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for Cmdlog
#[derive(Parser, Debug)]
#[command(
    name = "cmdlog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Timestamped progress reporting for command-line tasks",
    long_about = concat!(
        "Prints timestamped, memory-annotated progress messages, sleeps for fixed or ",
        "randomized durations, and forwards errors to the diagnostic log."
    )
)]
pub struct Args {
    /// Enable verbose diagnostic logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Mute console progress lines (errors are still logged)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Category attached to forwarded errors
    #[arg(long, global = true)]
    pub category: Option<String>,

    /// Output format for `memory` and `config show`
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an interpolated progress message
    Msg {
        /// Message template with {name} placeholders
        template: String,
        /// Placeholder value as name=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Sleep for a fixed or random number of seconds
    Sleep {
        /// Seconds to sleep, or lower bound with --to
        seconds: u64,
        /// Upper bound (inclusive) for a random duration
        #[arg(long)]
        to: Option<u64>,
    },
    /// Report an error message
    Error {
        /// Message template with {name} placeholders
        template: String,
        /// Placeholder value as name=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Read a file, reporting the failure as an exception
    Check {
        /// File to read
        path: PathBuf,
        /// Include the trace in the console output
        #[arg(long)]
        trace: bool,
    },
    /// Display current and peak memory usage
    Memory,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Create .cmdlog/config.toml in a directory
    Init {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,
    },
}

/// Parse a `name=value` placeholder argument
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("s=5"), Ok(("s".to_string(), "5".to_string())));
        assert_eq!(parse_param("eq=a=b"), Ok(("eq".to_string(), "a=b".to_string())));
        assert_eq!(parse_param("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_msg_args() {
        let args =
            Args::try_parse_from(["cmdlog", "--quiet", "msg", "hi {who}", "-p", "who=bob"])
                .unwrap();
        assert!(args.quiet);
        match args.command {
            Command::Msg { template, params } => {
                assert_eq!(template, "hi {who}");
                assert_eq!(params, vec![("who".to_string(), "bob".to_string())]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_sleep_args() {
        let args = Args::try_parse_from(["cmdlog", "sleep", "2", "--to", "4"]).unwrap();
        assert!(matches!(args.command, Command::Sleep { seconds: 2, to: Some(4) }));
    }

    #[test]
    fn test_output_format() {
        let args = Args::try_parse_from(["cmdlog", "-o", "json", "memory"]).unwrap();
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.output.to_string(), "json");
    }
}
