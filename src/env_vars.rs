//! Centralized environment variable registry.
//!
//! Single source of truth for every environment variable BinGo reads. It is
//! printed by `bingo env` and checked against the constants the lookups use.

use crate::joern::JOERN_HOME_VAR;
use crate::skills::PLUGIN_ROOT_VAR;

/// An environment variable definition
#[derive(Debug, Clone)]
pub struct EnvVar {
    /// Environment variable name (e.g., "JOERN_HOME")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Category for grouping in output
    pub category: EnvVarCategory,
    /// Default value if not set
    pub default: Option<&'static str>,
    /// Example value for documentation
    pub example: Option<&'static str>,
}

/// Categories for organizing environment variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvVarCategory {
    /// Joern toolchain discovery
    Toolchain,
    /// Config and plugin file locations
    Paths,
    /// Logging configuration
    Logging,
}

impl EnvVarCategory {
    /// Display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            EnvVarCategory::Toolchain => "Toolchain",
            EnvVarCategory::Paths => "Paths",
            EnvVarCategory::Logging => "Logging",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [EnvVarCategory] {
        &[
            EnvVarCategory::Toolchain,
            EnvVarCategory::Paths,
            EnvVarCategory::Logging,
        ]
    }
}

/// Static registry of all environment variables BinGo reads
pub static ENV_VARS: &[EnvVar] = &[
    EnvVar {
        name: JOERN_HOME_VAR,
        description: "Joern installation directory; used first if it contains the joern executable",
        category: EnvVarCategory::Toolchain,
        default: None,
        example: Some("/opt/joern/joern-cli"),
    },
    EnvVar {
        name: "PATH",
        description: "Searched with `which joern` when no other install location matches",
        category: EnvVarCategory::Toolchain,
        default: None,
        example: None,
    },
    EnvVar {
        name: "HOME",
        description: "Expands ~ in install paths and locates ~/.config/bingo and ~/.bingo configs",
        category: EnvVarCategory::Paths,
        default: None,
        example: Some("/home/analyst"),
    },
    EnvVar {
        name: PLUGIN_ROOT_VAR,
        description: "Plugin root directory containing skills/",
        category: EnvVarCategory::Paths,
        default: Some("."),
        example: Some("/usr/share/bingo"),
    },
    EnvVar {
        name: "RUST_LOG",
        description: "Log filter directive; overrides the default level and --debug",
        category: EnvVarCategory::Logging,
        default: Some("warn"),
        example: Some("bingo=debug"),
    },
];

/// Get all environment variables for a given category
pub fn env_vars_for_category(category: EnvVarCategory) -> impl Iterator<Item = &'static EnvVar> {
    ENV_VARS.iter().filter(move |v| v.category == category)
}

/// Get environment variables grouped by category
pub fn env_vars_by_category() -> Vec<(EnvVarCategory, Vec<&'static EnvVar>)> {
    EnvVarCategory::all()
        .iter()
        .map(|cat| {
            let vars: Vec<&EnvVar> = env_vars_for_category(*cat).collect();
            (*cat, vars)
        })
        .filter(|(_, vars)| !vars.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_env_vars_have_descriptions() {
        for var in ENV_VARS {
            assert!(
                !var.description.is_empty(),
                "EnvVar {} has empty description",
                var.name
            );
        }
    }

    #[test]
    fn test_registry_covers_lookup_constants() {
        let names: Vec<&str> = ENV_VARS.iter().map(|v| v.name).collect();
        assert!(names.contains(&"JOERN_HOME"));
        assert!(names.contains(&"BINGO_PLUGIN_ROOT"));
        assert!(names.contains(&"HOME"));
    }

    #[test]
    fn test_env_vars_by_category() {
        let grouped = env_vars_by_category();
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].0, EnvVarCategory::Toolchain);
        assert_eq!(grouped[0].1[0].name, "JOERN_HOME");
    }

    #[test]
    fn test_category_display_names() {
        assert_eq!(EnvVarCategory::Toolchain.display_name(), "Toolchain");
        assert_eq!(EnvVarCategory::Paths.display_name(), "Paths");
        assert_eq!(EnvVarCategory::Logging.display_name(), "Logging");
    }
}
