//! JVM heap sizing for Joern launches.

use std::fmt;

use crate::host::{MemoryProbe, SystemMemory};

/// Lowest heap ever allocated in auto mode, in GB
pub const MIN_HEAP_GB: u64 = 2;

/// Memory left to the rest of the system in auto mode, in GB
pub const RESERVED_SYSTEM_GB: u64 = 2;

/// Target heap in auto mode when the caller has no preference, in GB
pub const DEFAULT_HEAP_GB: u64 = 4;

/// Heap size setting from `joern.max_heap_size`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapSize {
    /// Derive from total system memory
    Auto,
    /// Passed to the JVM verbatim (e.g. "8G", "512m")
    Explicit(String),
}

impl From<&str> for HeapSize {
    fn from(value: &str) -> Self {
        if value == "auto" {
            HeapSize::Auto
        } else {
            HeapSize::Explicit(value.to_string())
        }
    }
}

impl fmt::Display for HeapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapSize::Auto => f.write_str("auto"),
            HeapSize::Explicit(size) => f.write_str(size),
        }
    }
}

/// Build the `-Xmx` flag for `setting`.
///
/// In auto mode the heap is `max(2, min(total_gb - 2, default_gb))`. The
/// floor is applied last, so on hosts with 4 GB or less the result is 2 GB
/// even when that exceeds `total_gb - 2`.
pub fn heap_flag(setting: &HeapSize, default_gb: u64, memory: &dyn MemoryProbe) -> String {
    match setting {
        HeapSize::Auto => {
            let total_gb = memory.total_memory_gb();
            let ceiling = total_gb.saturating_sub(RESERVED_SYSTEM_GB);
            let allocated = ceiling.min(default_gb).max(MIN_HEAP_GB);
            tracing::debug!(total_gb, default_gb, allocated, "Auto-sized Joern heap");
            format!("-Xmx{allocated}G")
        }
        HeapSize::Explicit(size) => format!("-Xmx{size}"),
    }
}

/// Build the `-Xmx` flag using this machine's memory
pub fn format_heap_size(setting: &HeapSize, default_gb: u64) -> String {
    heap_flag(setting, default_gb, &SystemMemory)
}
