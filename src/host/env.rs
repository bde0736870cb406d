//! Environment variable and home directory access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Trait abstracting process environment lookups
pub trait Environment: Send + Sync {
    /// Value of an environment variable, `None` when unset or not valid UTF-8
    fn var(&self, name: &str) -> Option<String>;

    /// The user's home directory
    fn home_dir(&self) -> Option<PathBuf>;

    /// Expand a leading `~` to the home directory.
    ///
    /// Returns `None` when the path needs the home directory and none is known.
    fn expand_home(&self, path: &str) -> Option<PathBuf> {
        match path.strip_prefix('~') {
            Some(rest) => {
                let home = self.home_dir()?;
                let rest = rest.trim_start_matches('/');
                Some(if rest.is_empty() {
                    home
                } else {
                    home.join(rest)
                })
            }
            None => Some(PathBuf::from(path)),
        }
    }
}

/// Real implementation reading the current process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// Fixed environment for testing
#[derive(Debug, Default, Clone)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment with only a home directory set
    pub fn with_home(home: impl AsRef<Path>) -> Self {
        Self {
            vars: HashMap::new(),
            home: Some(home.as_ref().to_path_buf()),
        }
    }

    /// Set a variable (builder style)
    pub fn set_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl Environment for MockEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}
