//! Filesystem access behind a trait.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Trait abstracting the filesystem reads the toolchain logic performs
pub trait FileSystem: Send + Sync {
    /// Whether anything (file or directory) exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real implementation backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory filesystem for testing.
///
/// Files carry content; directories are either added explicitly or implied
/// by the files beneath them. Every read attempt is recorded.
#[derive(Debug, Default, Clone)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    dirs: Arc<Mutex<HashSet<PathBuf>>>,
    /// Paths passed to `read_to_string`, in call order
    pub reads: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content
    pub fn add_file(&self, path: impl Into<PathBuf>, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.to_string());
    }

    /// Add an empty directory
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.dirs.lock().unwrap().insert(path.into());
    }

    /// Paths that were read so far (for test assertions)
    pub fn get_reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        if self.files.lock().unwrap().contains_key(path) {
            return true;
        }
        if self.dirs.lock().unwrap().iter().any(|d| d.starts_with(path)) {
            return true;
        }
        self.files
            .lock()
            .unwrap()
            .keys()
            .any(|f| f != path && f.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());

        if let Some(content) = self.files.lock().unwrap().get(path) {
            return Ok(content.clone());
        }

        if self.exists(path) {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ))
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        }
    }
}
