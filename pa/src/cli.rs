//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::template::TemplateRegistry;

/// promptauthor - multi-step LLM prompt templates
#[derive(Parser)]
#[command(
    name = "pa",
    about = "Run multi-step LLM prompt templates",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the template described by a config file and print its output
    Run {
        /// Path to the run config
        #[arg(short, long)]
        config: PathBuf,

        /// Log every prompt and response
        #[arg(short, long)]
        verbose: bool,
    },

    /// List available templates
    Templates,
}

impl Command {
    /// Config file the command reads, if any
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Run { config, .. } => Some(config),
            Command::Templates => None,
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptauthor")
        .join("logs")
        .join("promptauthor.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text listing templates and the log location
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Templates:\n");
    for name in TemplateRegistry::builtin().names() {
        help.push_str(&format!("  {}\n", name));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}", get_log_path().display()));
    help
}
