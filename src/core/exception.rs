// Captured errors with their originating location and trace
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::panic::Location;

/// An error plus the place it was captured.
///
/// Construct with [`Exception::capture`] at the point the error is handled;
/// the caller's file and line are recorded along with a backtrace.
pub struct Exception {
    error: Box<dyn Error + Send + Sync + 'static>,
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl Exception {
    #[track_caller]
    pub fn capture<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        Self {
            error: error.into(),
            location: Location::caller(),
            backtrace: Backtrace::force_capture(),
        }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    pub fn line(&self) -> u32 {
        self.location.line()
    }

    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }

    /// Cause chain followed by the captured backtrace
    pub fn trace(&self) -> String {
        let mut out = String::new();
        let mut source = self.error.source();
        while let Some(cause) = source {
            out.push_str("Caused by: ");
            out.push_str(&cause.to_string());
            out.push('\n');
            source = cause.source();
        }
        out.push_str(&self.backtrace.to_string());
        out
    }

    /// `<message> (<file>:<line>)`, optionally followed by the trace
    pub fn describe(&self, include_trace: bool) -> String {
        let mut text = format!("{} ({}:{})", self.message(), self.file(), self.line());
        if include_trace {
            text.push('\n');
            text.push_str(&self.trace());
        }
        text
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exception")
            .field("error", &self.error)
            .field("location", &self.location)
            .finish()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.error, self.file(), self.line())
    }
}
