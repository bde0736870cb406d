//! Host capability layer.
//!
//! Everything the toolchain logic needs from the machine it runs on goes
//! through one of these traits so that discovery, validation and config
//! resolution can be exercised without touching the real system:
//! - [`FileSystem`] for existence checks and file reads
//! - [`Environment`] for environment variables and the home directory
//! - [`CommandRunner`] for bounded, synchronous process invocations
//! - [`MemoryProbe`] for total system memory
//!
//! Each trait has a `System*`/`Os*` implementation bound to the real host
//! and a `Mock*`/`Fixed*` implementation for tests.

mod env;
mod fs;
mod memory;
mod process;

pub use env::{Environment, MockEnvironment, SystemEnvironment};
pub use fs::{FileSystem, MockFileSystem, OsFileSystem};
pub use memory::{FixedMemory, MemoryProbe, SystemMemory, BYTES_PER_GB};
pub use process::{
    CommandError, CommandOutput, CommandRunner, MockCommand, MockCommandRunner,
    SystemCommandRunner,
};
