// Destinations for forwarded error and exception records
use serde::Serialize;
use std::sync::Mutex;

/// External logger that receives category-tagged error strings
pub trait ErrorSink: Send + Sync {
    fn write(&self, category: &str, message: &str);
}

/// Forwards records to the process-wide `tracing` subscriber at ERROR level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn write(&self, category: &str, message: &str) {
        tracing::error!(category = %category, "{}", message);
    }
}

/// A record captured by `MemorySink`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkRecord {
    pub category: String,
    pub message: String,
}

/// Keeps every forwarded record in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SinkRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the records received so far
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for MemorySink {
    fn write(&self, category: &str, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SinkRecord {
                category: category.to_string(),
                message: message.to_string(),
            });
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for std::sync::Arc<S> {
    fn write(&self, category: &str, message: &str) {
        (**self).write(category, message)
    }
}
