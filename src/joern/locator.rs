//! Joern installation discovery.

use std::path::{Path, PathBuf};

use crate::config::JoernConfig;
use crate::host::{CommandRunner, Environment, FileSystem};

use super::{executable_path, JOERN_EXECUTABLE, JOERN_HOME_VAR, PROCESS_TIMEOUT};

/// Conventional install locations, checked in order. `~` is the home directory.
pub const COMMON_INSTALL_PATHS: &[&str] = &[
    "~/joern",
    "~/bin/joern",
    "/opt/joern",
    "/usr/local/joern",
    "/usr/local/bin/joern",
];

/// Searches the environment, conventional paths and PATH for Joern
pub struct JoernLocator<'a> {
    fs: &'a dyn FileSystem,
    env: &'a dyn Environment,
    runner: &'a dyn CommandRunner,
}

impl<'a> JoernLocator<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        env: &'a dyn Environment,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self { fs, env, runner }
    }

    /// Find the first usable installation directory.
    ///
    /// Order: `$JOERN_HOME` (only if it holds the executable), the
    /// conventional install paths, then `which joern`. Never fails.
    pub fn locate(&self) -> Option<PathBuf> {
        self.from_env()
            .or_else(|| self.from_common_paths())
            .or_else(|| self.from_search_path())
    }

    /// Locate according to `joern.auto_detect`.
    ///
    /// With auto-detection off only `$JOERN_HOME` is consulted; no
    /// conventional path is checked and no process is spawned.
    pub fn locate_for(&self, config: &JoernConfig) -> Option<PathBuf> {
        if config.auto_detect {
            self.locate()
        } else {
            tracing::debug!("joern.auto_detect is off, only checking {}", JOERN_HOME_VAR);
            self.from_env()
        }
    }

    /// `$JOERN_HOME`, if set and it contains the executable
    pub fn from_env(&self) -> Option<PathBuf> {
        let home = self.env.var(JOERN_HOME_VAR).filter(|v| !v.is_empty())?;
        let home = PathBuf::from(home);

        if self.fs.exists(&executable_path(&home)) {
            tracing::debug!(path = %home.display(), "Found Joern via {}", JOERN_HOME_VAR);
            Some(home)
        } else {
            tracing::debug!(
                path = %home.display(),
                "{} is set but does not contain the joern executable",
                JOERN_HOME_VAR
            );
            None
        }
    }

    /// First conventional install path that exists on disk.
    ///
    /// Home-relative entries are skipped when no home directory is known.
    pub fn from_common_paths(&self) -> Option<PathBuf> {
        let found = COMMON_INSTALL_PATHS
            .iter()
            .filter_map(|p| self.env.expand_home(p))
            .find(|p| self.fs.exists(p));

        if let Some(ref path) = found {
            tracing::debug!(path = %path.display(), "Found Joern in a common install path");
        }
        found
    }

    /// Directory containing the `joern` that `which` resolves, if any
    pub fn from_search_path(&self) -> Option<PathBuf> {
        let output = match self.runner.run("which", &[JOERN_EXECUTABLE], PROCESS_TIMEOUT) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(error = %e, "joern not found in PATH");
                return None;
            }
        };

        let resolved = output.stdout.trim();
        if resolved.is_empty() {
            return None;
        }

        let dir = Path::new(resolved).parent()?.to_path_buf();
        tracing::debug!(path = %dir.display(), "Found Joern in PATH");
        Some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CommandError, MockCommandRunner, MockEnvironment, MockFileSystem};

    const HOME: &str = "/home/analyst";

    fn locate(fs: &MockFileSystem, env: &MockEnvironment, runner: &MockCommandRunner) -> Option<PathBuf> {
        JoernLocator::new(fs, env, runner).locate()
    }

    #[test]
    fn test_joern_home_has_priority() {
        let fs = MockFileSystem::new();
        fs.add_file("/custom/joern-cli/joern", "");
        fs.add_dir("/home/analyst/joern");
        fs.add_dir("/opt/joern");
        let env = MockEnvironment::with_home(HOME).set_var("JOERN_HOME", "/custom/joern-cli");
        let runner = MockCommandRunner::new();
        runner.respond_ok("which joern", "/usr/bin/joern\n");

        assert_eq!(
            locate(&fs, &env, &runner),
            Some(PathBuf::from("/custom/joern-cli"))
        );
        assert!(runner.get_commands().is_empty());
    }

    #[test]
    fn test_joern_home_without_executable_falls_through() {
        let fs = MockFileSystem::new();
        fs.add_dir("/custom/joern-cli");
        fs.add_dir("/opt/joern");
        let env = MockEnvironment::with_home(HOME).set_var("JOERN_HOME", "/custom/joern-cli");
        let runner = MockCommandRunner::new();

        assert_eq!(locate(&fs, &env, &runner), Some(PathBuf::from("/opt/joern")));
    }

    #[test]
    fn test_empty_joern_home_is_ignored() {
        let fs = MockFileSystem::new();
        fs.add_file("joern", "");
        let env = MockEnvironment::with_home(HOME).set_var("JOERN_HOME", "");
        let runner = MockCommandRunner::new();

        assert_eq!(JoernLocator::new(&fs, &env, &runner).from_env(), None);
    }

    #[test]
    fn test_common_paths_in_order() {
        let fs = MockFileSystem::new();
        fs.add_dir("/home/analyst/bin/joern");
        fs.add_dir("/usr/local/joern");
        let env = MockEnvironment::with_home(HOME);
        let runner = MockCommandRunner::new();

        assert_eq!(
            locate(&fs, &env, &runner),
            Some(PathBuf::from("/home/analyst/bin/joern"))
        );

        fs.add_dir("/home/analyst/joern");
        assert_eq!(
            locate(&fs, &env, &runner),
            Some(PathBuf::from("/home/analyst/joern"))
        );
    }

    #[test]
    fn test_common_paths_without_home() {
        let fs = MockFileSystem::new();
        fs.add_dir("/usr/local/bin/joern");
        let env = MockEnvironment::new();
        let runner = MockCommandRunner::new();

        assert_eq!(
            locate(&fs, &env, &runner),
            Some(PathBuf::from("/usr/local/bin/joern"))
        );
    }

    #[test]
    fn test_search_path_fallback() {
        let fs = MockFileSystem::new();
        let env = MockEnvironment::with_home(HOME);
        let runner = MockCommandRunner::new();
        runner.respond_ok("which joern", "/usr/share/joern-cli/joern\n");

        assert_eq!(
            locate(&fs, &env, &runner),
            Some(PathBuf::from("/usr/share/joern-cli"))
        );

        let commands = runner.get_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "which");
        assert_eq!(commands[0].timeout, PROCESS_TIMEOUT);
    }

    #[test]
    fn test_search_path_failure_is_not_found() {
        let fs = MockFileSystem::new();
        let env = MockEnvironment::with_home(HOME);
        let runner = MockCommandRunner::new();
        runner.respond(
            "which joern",
            Err(CommandError::Failed {
                program: "which".to_string(),
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            }),
        );

        assert_eq!(locate(&fs, &env, &runner), None);
    }

    #[test]
    fn test_search_path_empty_output() {
        let fs = MockFileSystem::new();
        let env = MockEnvironment::with_home(HOME);
        let runner = MockCommandRunner::new();
        runner.respond_ok("which joern", "  \n");

        assert_eq!(locate(&fs, &env, &runner), None);
    }

    #[test]
    fn test_auto_detect_off_skips_search() {
        let fs = MockFileSystem::new();
        fs.add_dir("/opt/joern");
        let env = MockEnvironment::with_home(HOME);
        let runner = MockCommandRunner::new();
        runner.respond_ok("which joern", "/usr/bin/joern\n");
        let config = JoernConfig {
            auto_detect: false,
            ..JoernConfig::default()
        };

        let locator = JoernLocator::new(&fs, &env, &runner);
        assert_eq!(locator.locate_for(&config), None);
        assert!(runner.get_commands().is_empty());

        // Auto-detection on finds the same install
        assert_eq!(
            locator.locate_for(&JoernConfig::default()),
            Some(PathBuf::from("/opt/joern"))
        );
    }

    #[test]
    fn test_auto_detect_off_still_uses_joern_home() {
        let fs = MockFileSystem::new();
        fs.add_file("/custom/joern-cli/joern", "");
        let env = MockEnvironment::with_home(HOME).set_var("JOERN_HOME", "/custom/joern-cli");
        let runner = MockCommandRunner::new();
        let config = JoernConfig {
            auto_detect: false,
            ..JoernConfig::default()
        };

        assert_eq!(
            JoernLocator::new(&fs, &env, &runner).locate_for(&config),
            Some(PathBuf::from("/custom/joern-cli"))
        );
        assert!(runner.get_commands().is_empty());
    }

    #[test]
    fn test_nothing_found() {
        let fs = MockFileSystem::new();
        let env = MockEnvironment::new();
        let runner = MockCommandRunner::new();

        assert_eq!(locate(&fs, &env, &runner), None);
        assert_eq!(runner.get_commands().len(), 1);
    }
}
