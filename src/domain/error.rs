use thiserror::Error;

/// Cmdlog unified error type
///
/// The reporter never produces these; they come from the configuration
/// layer and the host command binary.
#[derive(Error, Debug)]
pub enum CmdlogError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(String),
}

pub type CmdlogResult<T> = Result<T, CmdlogError>;
