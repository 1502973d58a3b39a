use crate::cli::args::{Args, Command, ConfigCommand, OutputFormat};
use crate::cli::output::{ConsoleWriter, OutputError, OutputWriter};
use crate::core::exception::Exception;
use crate::core::reporter::MessageReporter;
use crate::core::sink::TracingSink;
use crate::core::template::Params;
use crate::domain::config::{CmdlogConfig, ReporterConfig};
use crate::domain::error::CmdlogResult;
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

/// Reporter for command `T`, forwarding errors to the tracing subscriber
fn reporter_for<T>(settings: &ReporterConfig) -> MessageReporter {
    MessageReporter::for_owner::<T>(TracingSink).with_config(settings)
}

/// Prints one interpolated progress message
pub struct MessageCommand {
    reporter: MessageReporter,
}

impl MessageCommand {
    pub fn new(settings: &ReporterConfig) -> Self {
        Self {
            reporter: reporter_for::<Self>(settings),
        }
    }

    pub fn run(&self, template: &str, params: &Params) {
        self.reporter.emit(template, params);
    }
}

/// Sleeps for a fixed or randomized duration
pub struct SleepCommand {
    reporter: MessageReporter,
}

impl SleepCommand {
    pub fn new(settings: &ReporterConfig) -> Self {
        Self {
            reporter: reporter_for::<Self>(settings),
        }
    }

    pub fn run(&self, seconds: u64, seconds_to: Option<u64>) -> u64 {
        self.reporter.delay(seconds, seconds_to)
    }
}

/// Reports a user-supplied error
pub struct ErrorCommand {
    reporter: MessageReporter,
}

impl ErrorCommand {
    pub fn new(settings: &ReporterConfig) -> Self {
        Self {
            reporter: reporter_for::<Self>(settings),
        }
    }

    pub fn run(&self, template: &str, params: &Params) {
        self.reporter.report_error(template, params);
    }
}

/// Reads a file; a read failure is reported as an exception
pub struct CheckCommand {
    reporter: MessageReporter,
}

impl CheckCommand {
    pub fn new(settings: &ReporterConfig) -> Self {
        Self {
            reporter: reporter_for::<Self>(settings),
        }
    }

    /// Returns whether the file could be read
    pub fn run(&self, path: &Path, include_trace: bool) -> bool {
        match fs::read(path) {
            Ok(bytes) => {
                self.reporter.emit(
                    "Read {bytes} bytes from {path}",
                    &Params::new()
                        .with("bytes", bytes.len())
                        .with("path", path.display()),
                );
                true
            }
            Err(e) => {
                let exception = Exception::capture(e);
                self.reporter.report_exception(&exception, include_trace);
                false
            }
        }
    }
}

/// Prints current and peak memory usage
pub struct MemoryCommand {
    reporter: MessageReporter,
}

impl MemoryCommand {
    pub fn new(settings: &ReporterConfig) -> Self {
        Self {
            reporter: reporter_for::<Self>(settings),
        }
    }

    pub fn run(&self, writer: &ConsoleWriter) -> Result<(), OutputError> {
        match writer.format() {
            OutputFormat::Text => writer.write_message(&self.reporter.memory_usage_summary()),
            _ => writer.write_memory(&self.reporter.memory_snapshot()),
        }
    }
}

/// Execute CLI command
pub fn execute_command(args: Args) -> CmdlogResult<ExitCode> {
    let writer = ConsoleWriter::new(args.output);

    // Load configuration using ConfigManager
    let config_manager = ConfigManager::new();
    let mut config = match &args.config {
        Some(config_path) => config_manager.load_config_from_path(config_path)?,
        None => config_manager.load_config()?,
    };

    // Errors reach the sink even when the console is muted
    init_logging(&config.global.log_level, args.verbose);

    apply_overrides(&mut config.reporter, &args);
    let settings = &config.reporter;

    match args.command {
        Command::Msg { template, params } => {
            MessageCommand::new(settings).run(&template, &params.into_iter().collect());
            Ok(ExitCode::SUCCESS)
        }
        Command::Sleep { seconds, to } => {
            SleepCommand::new(settings).run(seconds, to);
            Ok(ExitCode::SUCCESS)
        }
        Command::Error { template, params } => {
            ErrorCommand::new(settings).run(&template, &params.into_iter().collect());
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { path, trace } => {
            if CheckCommand::new(settings).run(&path, trace) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Memory => {
            MemoryCommand::new(settings).run(&writer)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(config_args) => {
            execute_config_command(config_args.command, &writer, &config, &config_manager)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Version => {
            writer.write_message(&format!("cmdlog {}", env!("CARGO_PKG_VERSION")))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn execute_config_command(
    command: ConfigCommand,
    writer: &ConsoleWriter,
    config: &CmdlogConfig,
    config_manager: &ConfigManager,
) -> CmdlogResult<()> {
    match command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Init { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let written = config_manager.init_project_config(&dir)?;
            writer.write_message(&format!(
                "Project configuration initialized at '{}'",
                written.display()
            ))?;
            Ok(())
        }
    }
}

/// Command-line flags win over configuration files
fn apply_overrides(settings: &mut ReporterConfig, args: &Args) {
    if args.quiet {
        settings.enabled = false;
    }
    if let Some(category) = &args.category {
        settings.category = category.clone();
    }
}
