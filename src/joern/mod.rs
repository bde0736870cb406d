//! Joern toolchain discovery, validation and launch sizing.
//!
//! The three parts compose only through the caller: locate an installation
//! directory, validate it, then compute the heap flag from configuration.
//!
//! ```rust,ignore
//! use bingo::joern::{find_joern, format_heap_size, validate_joern};
//!
//! if let Some(dir) = find_joern() {
//!     let result = validate_joern(&dir);
//!     println!("{:?} {}", result.version(), format_heap_size(&config.joern.heap_size(), 4));
//! }
//! ```

mod heap;
mod locator;
mod validator;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use heap::{
    format_heap_size, heap_flag, HeapSize, DEFAULT_HEAP_GB, MIN_HEAP_GB, RESERVED_SYSTEM_GB,
};
pub use locator::{JoernLocator, COMMON_INSTALL_PATHS};
pub use validator::{JoernValidator, ValidationResult, EXECUTABLE_NOT_FOUND};

use crate::host::{OsFileSystem, SystemCommandRunner, SystemEnvironment};

/// Name of the Joern executable inside an installation directory
pub const JOERN_EXECUTABLE: &str = "joern";

/// Environment variable pointing at the Joern installation directory
pub const JOERN_HOME_VAR: &str = "JOERN_HOME";

/// Upper bound for every external process BinGo runs
pub const PROCESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the Joern executable inside `install_dir`
pub fn executable_path(install_dir: &Path) -> PathBuf {
    install_dir.join(JOERN_EXECUTABLE)
}

/// Locate Joern on this machine using the real environment
pub fn find_joern() -> Option<PathBuf> {
    JoernLocator::new(&OsFileSystem, &SystemEnvironment, &SystemCommandRunner).locate()
}

/// Validate a Joern installation directory on this machine
pub fn validate_joern(install_dir: &Path) -> ValidationResult {
    JoernValidator::new(&OsFileSystem, &SystemCommandRunner).validate(install_dir)
}
