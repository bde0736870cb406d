//! Joern installation validation.

use std::path::Path;

use serde::Serialize;

use crate::host::{CommandRunner, FileSystem};

use super::{executable_path, PROCESS_TIMEOUT};

/// Error reported when the installation directory has no `joern` executable
pub const EXECUTABLE_NOT_FOUND: &str = "executable not found";

/// Outcome of validating an installation directory.
///
/// Either valid with a version string, or invalid with an error message.
/// Serializes as `{"valid": .., "version": .., "error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    version: Option<String>,
    error: Option<String>,
}

impl ValidationResult {
    pub fn valid(version: impl Into<String>) -> Self {
        Self {
            valid: true,
            version: Some(version.into()),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            version: None,
            error: Some(error.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Confirms an installation directory holds a working `joern`
pub struct JoernValidator<'a> {
    fs: &'a dyn FileSystem,
    runner: &'a dyn CommandRunner,
}

impl<'a> JoernValidator<'a> {
    pub fn new(fs: &'a dyn FileSystem, runner: &'a dyn CommandRunner) -> Self {
        Self { fs, runner }
    }

    /// Check the executable exists, then ask it for its version.
    ///
    /// All failures are reported in the result; nothing is spawned when the
    /// executable is missing.
    pub fn validate(&self, install_dir: &Path) -> ValidationResult {
        let exec = executable_path(install_dir);

        if !self.fs.exists(&exec) {
            tracing::debug!(path = %exec.display(), "joern executable not found");
            return ValidationResult::invalid(EXECUTABLE_NOT_FOUND);
        }

        let program = exec.to_string_lossy();
        match self.runner.run(&program, &["--version"], PROCESS_TIMEOUT) {
            Ok(output) => {
                let version = output.stdout.trim().to_string();
                tracing::debug!(path = %exec.display(), version = %version, "Joern validated");
                ValidationResult::valid(version)
            }
            Err(e) => {
                tracing::warn!(path = %exec.display(), error = %e, "Joern version check failed");
                ValidationResult::invalid(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CommandError, MockCommandRunner, MockFileSystem};
    use std::time::Duration;

    #[test]
    fn test_missing_executable_does_not_spawn() {
        let fs = MockFileSystem::new();
        fs.add_dir("/opt/joern");
        let runner = MockCommandRunner::new();

        let result = JoernValidator::new(&fs, &runner).validate(Path::new("/opt/joern"));

        assert!(!result.is_valid());
        assert_eq!(result.version(), None);
        assert_eq!(result.error(), Some(EXECUTABLE_NOT_FOUND));
        assert!(runner.get_commands().is_empty());
    }

    #[test]
    fn test_valid_installation_trims_version() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/joern/joern", "");
        let runner = MockCommandRunner::new();
        runner.respond_ok("/opt/joern/joern --version", "  v2.0.448\n");

        let result = JoernValidator::new(&fs, &runner).validate(Path::new("/opt/joern"));

        assert_eq!(result, ValidationResult::valid("v2.0.448"));
        assert_eq!(result.error(), None);

        let commands = runner.get_commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].args, vec!["--version".to_string()]);
        assert_eq!(commands[0].timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_is_captured() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/joern/joern", "");
        let runner = MockCommandRunner::new();
        runner.respond(
            "/opt/joern/joern --version",
            Err(CommandError::Timeout {
                program: "/opt/joern/joern".to_string(),
                timeout: PROCESS_TIMEOUT,
            }),
        );

        let result = JoernValidator::new(&fs, &runner).validate(Path::new("/opt/joern"));

        assert!(!result.is_valid());
        assert_eq!(result.version(), None);
        assert_eq!(
            result.error(),
            Some("/opt/joern/joern timed out after 5000ms")
        );
    }

    #[test]
    fn test_non_zero_exit_is_captured() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/joern/joern", "");
        let runner = MockCommandRunner::new();
        runner.respond(
            "/opt/joern/joern --version",
            Err(CommandError::Failed {
                program: "/opt/joern/joern".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "no java".to_string(),
            }),
        );

        let result = JoernValidator::new(&fs, &runner).validate(Path::new("/opt/joern"));
        assert!(!result.is_valid());
        assert!(result.error().unwrap().contains("no java"));
    }

    #[test]
    fn test_result_serialization() {
        let ok = serde_json::to_value(ValidationResult::valid("v4.0.0")).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"valid": true, "version": "v4.0.0", "error": null})
        );

        let bad = serde_json::to_value(ValidationResult::invalid(EXECUTABLE_NOT_FOUND)).unwrap();
        assert_eq!(
            bad,
            serde_json::json!({"valid": false, "version": null, "error": "executable not found"})
        );
    }
}
