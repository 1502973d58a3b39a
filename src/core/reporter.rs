// Reporter module - Console progress messages and error forwarding
use rand::Rng;
use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::clock::{Clock, SystemClock};
use crate::core::exception::Exception;
use crate::core::memory::{MemoryProbe, MemorySnapshot, ProcessMemory};
use crate::core::sink::ErrorSink;
use crate::core::template::{interpolate, Params};
use crate::domain::config::{default_category, ReporterConfig};

/// Blocks the calling thread for a delay
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// `std::thread::sleep`, no cancellation
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Pick the delay length: `seconds` as-is, or uniformly from the inclusive
/// range up to `seconds_to`. Reversed bounds are swapped.
pub fn resolve_delay<R: Rng + ?Sized>(seconds: u64, seconds_to: Option<u64>, rng: &mut R) -> u64 {
    match seconds_to {
        Some(to) => {
            let (low, high) = if to < seconds { (to, seconds) } else { (seconds, to) };
            rng.random_range(low..=high)
        }
        None => seconds,
    }
}

/// Reporting capability composed into a command.
///
/// Console lines look like `[<timestamp>] [<memory>MB] <message>\r\n` and are
/// only written while `enabled` is set. Errors and exceptions are forwarded
/// to the error sink regardless of `enabled`.
pub struct MessageReporter {
    enabled: bool,
    category: String,
    owner: &'static str,
    out: Mutex<Box<dyn Write + Send>>,
    clock: Box<dyn Clock>,
    memory: Box<dyn MemoryProbe>,
    sink: Box<dyn ErrorSink>,
    sleeper: Box<dyn Sleeper>,
}

impl MessageReporter {
    /// Reporter on stdout, labelled with `owner` in forwarded records
    pub fn new(owner: &'static str, sink: impl ErrorSink + 'static) -> Self {
        Self {
            enabled: true,
            category: default_category(),
            owner,
            out: Mutex::new(Box::new(io::stdout())),
            clock: Box::new(SystemClock::new()),
            memory: Box::new(ProcessMemory::new()),
            sink: Box::new(sink),
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Reporter labelled with the type name of the owning command
    pub fn for_owner<T: ?Sized>(sink: impl ErrorSink + 'static) -> Self {
        Self::new(std::any::type_name::<T>(), sink)
    }

    /// Apply enabled flag, category and timestamp format
    pub fn with_config(mut self, config: &ReporterConfig) -> Self {
        self.enabled = config.enabled;
        self.category = config.category.clone();
        self.clock = Box::new(SystemClock::with_format(config.timestamp_format.clone()));
        self
    }

    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Mutex::new(Box::new(out));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_memory(mut self, memory: impl MemoryProbe + 'static) -> Self {
        self.memory = Box::new(memory);
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Print an interpolated progress line
    pub fn emit(&self, template: &str, params: &Params) {
        if !self.enabled {
            return;
        }
        self.write_line(&interpolate(template, params));
    }

    /// Announce and then block for `seconds`, or a random whole number of
    /// seconds in `[seconds, seconds_to]`. Returns the seconds slept.
    pub fn delay(&self, seconds: u64, seconds_to: Option<u64>) -> u64 {
        let resolved = resolve_delay(seconds, seconds_to, &mut rand::rng());
        self.emit("Sleep for {s} seconds", &Params::new().with("s", resolved));
        self.sleeper.sleep(Duration::from_secs(resolved));
        resolved
    }

    /// Echo an error to the console and forward it to the sink
    pub fn report_error(&self, message: &str, params: &Params) {
        let message = interpolate(message, params);
        self.forward(&format!("{} Error: {}", self.owner, message));
        self.emit(&message, &Params::new());
    }

    /// Echo an exception to the console and forward it, with trace, to the sink
    pub fn report_exception(&self, exception: &Exception, include_trace: bool) {
        self.forward(&format!("{} exception: {}", self.owner, exception.describe(true)));
        self.emit(&exception.describe(include_trace), &Params::new());
    }

    /// Current and peak process memory, e.g. `Memory usage: 12.3MB (peak: 45.6MB)`
    pub fn memory_usage_summary(&self) -> String {
        self.memory_snapshot().summary()
    }

    /// Raw memory reading behind `memory_usage_summary`
    pub fn memory_snapshot(&self) -> MemorySnapshot {
        self.memory.sample()
    }

    fn forward(&self, message: &str) {
        debug!(category = %self.category, "Forwarding record to error sink");
        self.sink.write(&self.category, message);
    }

    fn write_line(&self, message: &str) {
        let line = format!(
            "[{}] [{}MB] {}\r\n",
            self.clock.now(),
            self.memory.sample().current_mb(),
            message
        );

        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
            warn!("Failed to write console message: {}", e);
        }
    }
}

impl fmt::Debug for MessageReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageReporter")
            .field("enabled", &self.enabled)
            .field("category", &self.category)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::memory::ScriptedMemory;
    use crate::core::sink::MemorySink;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io;
    use std::sync::Arc;

    const MB: u64 = 1024 * 1024;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn new() -> Self {
            Self::default()
        }

        /// Everything written so far, lossily decoded
        fn contents(&self) -> String {
            let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ImportCommand;

    #[derive(Default)]
    struct RecordingSleeper(Mutex<Vec<Duration>>);

    impl Sleeper for Arc<RecordingSleeper> {
        fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn reporter() -> (MessageReporter, SharedBuffer, Arc<MemorySink>) {
        let out = SharedBuffer::new();
        let sink = Arc::new(MemorySink::new());
        let reporter = MessageReporter::for_owner::<ImportCommand>(sink.clone())
            .with_output(out.clone())
            .with_clock(FixedClock::new("2024-05-01 10:00:00"))
            .with_memory(ScriptedMemory::new([12 * MB + 300 * 1024]));
        (reporter, out, sink)
    }

    #[test]
    fn test_defaults() {
        let (reporter, _, _) = reporter();
        assert!(reporter.enabled());
        assert_eq!(reporter.category(), "application");
        assert!(reporter.owner().ends_with("ImportCommand"));
    }

    #[test]
    fn test_emit_line_shape() {
        let (reporter, out, _) = reporter();
        reporter.emit("Sleep for {s} seconds", &Params::new().with("s", 5));
        assert_eq!(
            out.contents(),
            "[2024-05-01 10:00:00] [12.3MB] Sleep for 5 seconds\r\n"
        );
    }

    #[test]
    fn test_emit_disabled_is_silent() {
        let (mut reporter, out, sink) = reporter();
        reporter.set_enabled(false);
        reporter.emit("hello {who}", &Params::new().with("who", "world"));
        assert!(out.contents().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_report_error_disabled_still_forwards() {
        let (mut reporter, out, sink) = reporter();
        reporter.set_enabled(false);
        reporter.set_category("import");

        reporter.report_error("disk full", &Params::new());

        assert!(out.contents().is_empty());
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "import");
        assert!(records[0].message.contains("disk full"));
        assert!(records[0].message.contains("ImportCommand Error: "));
    }

    #[test]
    fn test_report_error_echoes_interpolated_message() {
        let (reporter, out, sink) = reporter();
        reporter.report_error("row {n} rejected", &Params::new().with("n", 42));

        assert!(out.contents().ends_with("] row 42 rejected\r\n"));
        assert!(sink.records()[0].message.ends_with("Error: row 42 rejected"));
    }

    #[test]
    fn test_report_exception_terse_console_full_sink() {
        let (reporter, out, sink) = reporter();
        let exception = Exception::capture(io::Error::new(io::ErrorKind::Other, "timeout"));

        reporter.report_exception(&exception, false);

        let console = out.contents();
        assert!(console.ends_with(&format!("] {}\r\n", exception.describe(false))));
        assert_eq!(console.matches('\n').count(), 1);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].message.contains(" exception: timeout ("));
        assert_eq!(
            records[0].message,
            format!("{} exception: {}", reporter.owner(), exception.describe(true))
        );
    }

    #[test]
    fn test_report_exception_disabled_still_forwards() {
        let (mut reporter, out, sink) = reporter();
        reporter.set_enabled(false);
        reporter.report_exception(&Exception::capture("lost connection"), true);
        assert!(out.contents().is_empty());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_delay_fixed() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let (reporter, out, _) = reporter();
        let reporter = reporter.with_sleeper(sleeper.clone());

        assert_eq!(reporter.delay(5, None), 5);
        assert_eq!(*sleeper.0.lock().unwrap(), vec![Duration::from_secs(5)]);
        assert!(out.contents().ends_with("Sleep for 5 seconds\r\n"));
    }

    #[test]
    fn test_delay_range_bounds() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let (reporter, _, _) = reporter();
        let reporter = reporter.with_sleeper(sleeper.clone());

        for _ in 0..50 {
            let slept = reporter.delay(2, Some(4));
            assert!((2..=4).contains(&slept));
        }
        assert_eq!(sleeper.0.lock().unwrap().len(), 50);
    }

    #[test]
    fn test_resolve_delay_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0u32; 3];
        for _ in 0..3000 {
            let value = resolve_delay(2, Some(4), &mut rng);
            counts[(value - 2) as usize] += 1;
        }
        for count in counts {
            assert!(count > 800, "skewed distribution: {:?}", counts);
        }
    }

    #[test]
    fn test_resolve_delay_reversed_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!((1..=3).contains(&resolve_delay(3, Some(1), &mut rng)));
        }
        assert_eq!(resolve_delay(4, Some(4), &mut rng), 4);
    }

    #[test]
    fn test_memory_usage_summary() {
        let out = SharedBuffer::new();
        let reporter = MessageReporter::new("Job", MemorySink::new())
            .with_output(out)
            .with_memory(ScriptedMemory::new([10 * MB, 20 * MB, 15 * MB]));

        reporter.memory_usage_summary();
        reporter.memory_usage_summary();
        assert_eq!(
            reporter.memory_usage_summary(),
            "Memory usage: 15MB (peak: 20MB)"
        );
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let reporter = MessageReporter::new("Job", MemorySink::new()).with_output(BrokenPipe);
        reporter.emit("still fine", &Params::new());
    }

    #[test]
    fn test_with_config() {
        let config = ReporterConfig {
            enabled: false,
            category: "billing".to_string(),
            timestamp_format: "%H:%M".to_string(),
        };
        let reporter = MessageReporter::new("Job", MemorySink::new()).with_config(&config);
        assert!(!reporter.enabled());
        assert_eq!(reporter.category(), "billing");
    }

    #[test]
    fn test_configured_timestamp_format_reaches_console() {
        let config = ReporterConfig {
            timestamp_format: "stamp-%Y".to_string(),
            ..ReporterConfig::default()
        };
        let out = SharedBuffer::new();
        let reporter = MessageReporter::new("Job", MemorySink::new())
            .with_output(out.clone())
            .with_config(&config);

        reporter.emit("tick", &Params::new());

        let line = out.contents();
        assert!(line.starts_with("[stamp-"), "unexpected line: {:?}", line);
        assert!(line["[stamp-".len().."[stamp-".len() + 4]
            .chars()
            .all(|c| c.is_ascii_digit()));
        assert!(line.ends_with("] tick\r\n"));
    }

    #[test]
    fn test_invalid_timestamp_format_does_not_break_reporting() {
        let config = ReporterConfig {
            timestamp_format: "%Q".to_string(),
            ..ReporterConfig::default()
        };
        let out = SharedBuffer::new();
        let sink = Arc::new(MemorySink::new());
        let reporter = MessageReporter::new("Job", sink.clone())
            .with_output(out.clone())
            .with_config(&config);

        reporter.emit("hello", &Params::new());
        reporter.report_error("disk full", &Params::new());

        let console = out.contents();
        let first = console.lines().next().unwrap();
        // Default format: [YYYY-MM-DD HH:MM:SS]
        assert_eq!(first.find(']'), Some(20));
        assert!(first.ends_with("] hello"));
        assert_eq!(sink.len(), 1);
    }
}
