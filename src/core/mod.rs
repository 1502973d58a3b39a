// Core module - Message reporting and its collaborators
pub mod clock;
pub mod exception;
pub mod memory;
pub mod reporter;
pub mod sink;
pub mod template;

pub use clock::{Clock, FixedClock, SystemClock};
pub use exception::Exception;
pub use memory::{MemoryProbe, MemorySnapshot, ProcessMemory, ScriptedMemory};
pub use reporter::{resolve_delay, MessageReporter, Sleeper, ThreadSleeper};
pub use sink::{ErrorSink, MemorySink, SinkRecord, TracingSink};
pub use template::{interpolate, Params};
