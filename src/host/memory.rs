//! Total system memory lookup.

use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// Bytes in one gibibyte
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Trait abstracting the total memory query
pub trait MemoryProbe: Send + Sync {
    /// Total physical memory in bytes
    fn total_memory_bytes(&self) -> u64;

    /// Total physical memory in whole gigabytes (rounded down)
    fn total_memory_gb(&self) -> u64 {
        self.total_memory_bytes() / BYTES_PER_GB
    }
}

/// Real implementation backed by `sysinfo`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMemory;

impl MemoryProbe for SystemMemory {
    fn total_memory_bytes(&self) -> u64 {
        let system = System::new_with_specifics(
            RefreshKind::new().with_memory(MemoryRefreshKind::new().with_ram()),
        );
        system.total_memory()
    }
}

/// Fixed memory size for testing
#[derive(Debug, Clone, Copy)]
pub struct FixedMemory(pub u64);

impl FixedMemory {
    /// A host reporting exactly `gb` gigabytes
    pub fn gigabytes(gb: u64) -> Self {
        Self(gb * BYTES_PER_GB)
    }
}

impl MemoryProbe for FixedMemory {
    fn total_memory_bytes(&self) -> u64 {
        self.0
    }
}
