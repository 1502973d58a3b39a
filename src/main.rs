// Cmdlog - Progress reporting for command-line tasks
use clap::Parser;
use cmdlog::cli::args::Args;
use cmdlog::cli::commands::execute_command;
use cmdlog::cli::output::{ConsoleWriter, OutputWriter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    let writer = ConsoleWriter::new(args.output);

    match execute_command(args) {
        Ok(code) => code,
        Err(e) => {
            // Nothing left to report to if stderr is gone
            let _ = writer.write_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
