//! Skill discovery by scanning the plugin's `skills/` directory for SKILL.md files

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::host::Environment;

/// Environment variable overriding the plugin root directory
pub const PLUGIN_ROOT_VAR: &str = "BINGO_PLUGIN_ROOT";

/// Marker file every skill directory contains
pub const SKILL_MARKER: &str = "SKILL.md";

/// A skill shipped with the plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    /// Directory name of the skill
    pub name: String,
    /// Path to its SKILL.md
    pub path: PathBuf,
}

/// Skills directory: `$BINGO_PLUGIN_ROOT/skills`, else `./skills`
pub fn skills_root(env: &dyn Environment) -> PathBuf {
    let plugin_root = env
        .var(PLUGIN_ROOT_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    plugin_root.join("skills")
}

/// List skills under `root`
///
/// Returns every immediate subdirectory containing a SKILL.md, sorted by name.
/// A missing or unreadable root yields an empty list.
pub fn list_skills(root: &Path) -> Vec<Skill> {
    let mut skills = Vec::new();

    let Ok(entries) = fs::read_dir(root) else {
        tracing::debug!(path = %root.display(), "Skills directory not readable");
        return skills;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let skill_file = path.join(SKILL_MARKER);
        if skill_file.exists() {
            if let Some(name) = path.file_name() {
                skills.push(Skill {
                    name: name.to_string_lossy().to_string(),
                    path: skill_file,
                });
            }
        }
    }

    skills.sort_by(|a, b| a.name.cmp(&b.name));
    skills
}
