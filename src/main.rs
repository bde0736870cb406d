use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use bingo::artifacts::{parse_binary_info, parse_vulnerabilities};
use bingo::config::{Config, ConfigResolver, ResolvedConfig};
use bingo::env_vars::env_vars_by_category;
use bingo::host::{OsFileSystem, SystemCommandRunner, SystemEnvironment, SystemMemory};
use bingo::joern::{heap_flag, HeapSize, JoernLocator, JoernValidator, DEFAULT_HEAP_GB};
use bingo::logging::init_logging;
use bingo::skills::{list_skills, skills_root};

#[derive(Parser)]
#[command(name = "bingo")]
#[command(about = "Joern toolchain discovery and configuration for BinGo")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (checked before ./bingo-config.json and ~/.config/bingo)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Config,

    /// Print the Joern installation directory
    Locate,

    /// Check that a Joern installation works
    Validate {
        /// Installation directory (located automatically if omitted)
        dir: Option<PathBuf>,
    },

    /// Print the JVM heap flag for launching Joern
    Heap {
        /// Heap setting ("auto" or a size like "8G"); defaults to joern.max_heap_size
        #[arg(short, long)]
        setting: Option<String>,

        /// Target heap in GB for auto mode
        #[arg(long, default_value_t = DEFAULT_HEAP_GB)]
        default_gb: u64,
    },

    /// List available skills
    Skills {
        /// Skills directory (defaults to $BINGO_PLUGIN_ROOT/skills)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Pretty-print a JSON analysis artifact
    Artifact {
        kind: ArtifactArg,
        path: PathBuf,
    },

    /// List environment variables bingo reads
    Env,

    /// Run config, discovery, validation and heap sizing together
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
enum ArtifactArg {
    BinaryInfo,
    Vulns,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.debug) {
        eprintln!("Warning: {e}");
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(explicit: Option<&Path>) -> ResolvedConfig {
    ConfigResolver::new(&OsFileSystem, &SystemEnvironment).resolve_with_source(explicit)
}

fn locate(config: &Config) -> Option<PathBuf> {
    JoernLocator::new(&OsFileSystem, &SystemEnvironment, &SystemCommandRunner)
        .locate_for(&config.joern)
}

/// Returns Ok(false) when the command ran but its check failed
fn run(cli: &Cli) -> Result<bool> {
    let resolved = resolve_config(cli.config.as_deref());
    let config = &resolved.config;

    match &cli.command {
        Commands::Config => {
            eprintln!("Source: {}", resolved.source);
            let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{json}");
            Ok(true)
        }

        Commands::Locate => match locate(config) {
            Some(dir) => {
                println!("{}", dir.display());
                Ok(true)
            }
            None => {
                eprintln!("Joern not found. Set JOERN_HOME or add joern to PATH.");
                Ok(false)
            }
        },

        Commands::Validate { dir } => {
            let Some(dir) = dir.clone().or_else(|| locate(config)) else {
                eprintln!("Joern not found. Set JOERN_HOME or pass an installation directory.");
                return Ok(false);
            };
            let result = JoernValidator::new(&OsFileSystem, &SystemCommandRunner).validate(&dir);
            let json =
                serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
            println!("{json}");
            Ok(result.is_valid())
        }

        Commands::Heap {
            setting,
            default_gb,
        } => {
            let setting = setting
                .as_deref()
                .map(HeapSize::from)
                .unwrap_or_else(|| config.joern.heap_size());
            println!("{}", heap_flag(&setting, *default_gb, &SystemMemory));
            Ok(true)
        }

        Commands::Skills { root } => {
            let root = root.clone().unwrap_or_else(|| skills_root(&SystemEnvironment));
            let skills = list_skills(&root);
            if skills.is_empty() {
                eprintln!("No skills found in {}", root.display());
            }
            for skill in skills {
                println!("{}\t{}", skill.name, skill.path.display());
            }
            Ok(true)
        }

        Commands::Artifact { kind, path } => {
            let value = match kind {
                ArtifactArg::BinaryInfo => parse_binary_info(path)?,
                ArtifactArg::Vulns => parse_vulnerabilities(path)?,
            };
            let json = serde_json::to_string_pretty(&value).context("Failed to format artifact")?;
            println!("{json}");
            Ok(true)
        }

        Commands::Env => {
            for (category, vars) in env_vars_by_category() {
                println!("{}:", category.display_name());
                for var in vars {
                    let current = std::env::var(var.name).unwrap_or_else(|_| "(unset)".to_string());
                    println!("  {:<20} {}", var.name, var.description);
                    println!("  {:<20} current: {}", "", current);
                    if let Some(default) = var.default {
                        println!("  {:<20} default: {}", "", default);
                    }
                    if let Some(example) = var.example {
                        println!("  {:<20} example: {}", "", example);
                    }
                }
            }
            Ok(true)
        }

        Commands::Doctor => {
            println!("Config:  {}", resolved.source);
            let heap = heap_flag(&config.joern.heap_size(), DEFAULT_HEAP_GB, &SystemMemory);
            println!("Heap:    {heap}");
            match config.reporting.severity() {
                Ok(threshold) => println!("Report:  severity >= {threshold}"),
                Err(e) => println!("Report:  {e}"),
            }

            let Some(dir) = locate(config) else {
                println!("Joern:   not found");
                return Ok(false);
            };
            println!("Joern:   {}", dir.display());

            let result = JoernValidator::new(&OsFileSystem, &SystemCommandRunner).validate(&dir);
            match (result.version(), result.error()) {
                (Some(version), _) => println!("Version: {version}"),
                (None, Some(error)) => println!("Invalid: {error}"),
                (None, None) => {}
            }
            Ok(result.is_valid())
        }
    }
}
