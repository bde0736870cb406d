//! Readers for JSON analysis artifacts.
//!
//! Artifacts are produced by the decompilation and audit stages. There is no
//! sensible default for analysis data, so every failure is returned to the
//! caller.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::host::{FileSystem, OsFileSystem};

/// Kind of artifact being read, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `binary_info.json`
    BinaryInfo,
    /// Vulnerability findings JSON
    Vulnerabilities,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::BinaryInfo => f.write_str("Binary info"),
            ArtifactKind::Vulnerabilities => f.write_str("Vulnerabilities file"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("{kind} not found: {}", .path.display())]
    NotFound { kind: ArtifactKind, path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse a JSON artifact through `fs`
pub fn read_artifact(
    fs: &dyn FileSystem,
    kind: ArtifactKind,
    path: &Path,
) -> Result<Value, ArtifactError> {
    if !fs.exists(path) {
        return Err(ArtifactError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }

    let content = fs.read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a `binary_info.json` artifact
pub fn parse_binary_info(path: &Path) -> Result<Value, ArtifactError> {
    read_artifact(&OsFileSystem, ArtifactKind::BinaryInfo, path)
}

/// Parse a vulnerability findings artifact
pub fn parse_vulnerabilities(path: &Path) -> Result<Value, ArtifactError> {
    read_artifact(&OsFileSystem, ArtifactKind::Vulnerabilities, path)
}
