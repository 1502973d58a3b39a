// Memory module - Process memory sampling for progress lines and usage summaries
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use sysinfo::{Pid, System};
use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Source of memory readings for the current process
pub trait MemoryProbe: Send + Sync {
    /// Take a reading. Must never fail; `peak_bytes >= current_bytes`.
    fn sample(&self) -> MemorySnapshot;
}

/// One memory reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    pub current_bytes: u64,
    pub peak_bytes: u64,
}

impl MemorySnapshot {
    /// Current usage in megabytes, rounded to one decimal place
    pub fn current_mb(&self) -> f64 {
        round_mb(self.current_bytes)
    }

    /// Peak usage in megabytes, rounded to one decimal place
    pub fn peak_mb(&self) -> f64 {
        round_mb(self.peak_bytes)
    }

    /// Human readable usage line
    pub fn summary(&self) -> String {
        format!(
            "Memory usage: {}MB (peak: {}MB)",
            self.current_mb(),
            self.peak_mb()
        )
    }
}

fn round_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 10.0).round() / 10.0
}

/// Resident memory of the running process, read through `sysinfo`.
///
/// The peak is the operating system's high-water mark where one is
/// available, so allocations freed between samples still count.
pub struct ProcessMemory {
    system: Mutex<System>,
    pid: Option<Pid>,
    tracker: PeakTracker,
}

impl ProcessMemory {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                debug!("Process memory unavailable: {}", e);
                None
            }
        };

        Self {
            system: Mutex::new(System::new()),
            pid,
            tracker: PeakTracker::default(),
        }
    }

    fn query(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !system.refresh_process(pid) {
            return None;
        }
        system.process(pid).map(|process| process.memory())
    }
}

impl Default for ProcessMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemory {
    fn sample(&self) -> MemorySnapshot {
        self.tracker.record(self.query(), os_peak_bytes())
    }
}

/// Peak resident set size reported by the operating system, in bytes
fn os_peak_bytes() -> Option<u64> {
    #[cfg(unix)]
    {
        proc_status_peak().or_else(rusage_peak)
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(target_os = "linux")]
fn proc_status_peak() -> Option<u64> {
    match std::fs::read_to_string("/proc/self/status") {
        Ok(status) => parse_vm_hwm(&status),
        Err(e) => {
            debug!("Cannot read /proc/self/status: {}", e);
            None
        }
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
fn proc_status_peak() -> Option<u64> {
    None
}

#[cfg(unix)]
fn rusage_peak() -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
    // SAFETY: getrusage only writes into the struct we hand it.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    // SAFETY: zero-initialised and filled in by a successful call.
    let max_rss = u64::try_from(unsafe { usage.assume_init() }.ru_maxrss).ok()?;

    // Bytes on Apple platforms, kilobytes everywhere else
    if cfg!(any(target_os = "macos", target_os = "ios")) {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

/// `VmHWM` line of a `/proc/<pid>/status` document, in bytes
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn parse_vm_hwm(status: &str) -> Option<u64> {
    let line = status.lines().find(|line| line.starts_with("VmHWM:"))?;
    let kilobytes: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kilobytes * 1024)
}

/// Last reading and running peak shared by the memory sources
#[derive(Debug, Default)]
struct PeakTracker {
    last_usage: AtomicU64,
    peak_usage: AtomicU64,
}

impl PeakTracker {
    /// Missing readings reuse the previous value. `os_peak` raises the
    /// running peak but never lowers it.
    fn record(&self, reading: Option<u64>, os_peak: Option<u64>) -> MemorySnapshot {
        let current = match reading {
            Some(bytes) => {
                self.last_usage.store(bytes, Ordering::Relaxed);
                bytes
            }
            None => self.last_usage.load(Ordering::Relaxed),
        };
        let candidate = os_peak.map_or(current, |peak| peak.max(current));
        let previous_peak = self.peak_usage.fetch_max(candidate, Ordering::Relaxed);

        MemorySnapshot {
            current_bytes: current,
            peak_bytes: previous_peak.max(candidate),
        }
    }
}

/// Probe that replays a fixed sequence of readings, tracking the peak
/// the same way `ProcessMemory` does.
pub struct ScriptedMemory {
    readings: Mutex<VecDeque<u64>>,
    tracker: PeakTracker,
}

impl ScriptedMemory {
    pub fn new(readings: impl IntoIterator<Item = u64>) -> Self {
        Self {
            readings: Mutex::new(readings.into_iter().collect()),
            tracker: PeakTracker::default(),
        }
    }
}

impl MemoryProbe for ScriptedMemory {
    fn sample(&self) -> MemorySnapshot {
        let next = self
            .readings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        self.tracker.record(next, None)
    }
}
