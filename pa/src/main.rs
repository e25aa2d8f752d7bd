//! promptauthor - multi-step LLM prompt templates
//!
//! CLI entry point for running templates.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use promptauthor::TemplateError;
use promptauthor::cli::{Cli, Command, generate_after_help};
use promptauthor::config::Config;
use promptauthor::runner;
use promptauthor::template::TemplateRegistry;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptauthor")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("promptauthor.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = cli.command.config_path().and_then(|path| Config::load_log_level(path));
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let registry = TemplateRegistry::builtin();

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run { config, verbose } => {
            debug!(?config, verbose, "main: matched Run command");
            cmd_run(&registry, &config, verbose).await
        }
        Command::Templates => {
            debug!("main: matched Templates command");
            cmd_templates(&registry);
            Ok(())
        }
    }
}

/// Run a template and print its output
async fn cmd_run(registry: &TemplateRegistry, config_path: &Path, verbose: bool) -> Result<()> {
    debug!(?config_path, verbose, "cmd_run: called");
    let config = Config::load(config_path).context("Failed to load configuration")?;
    info!("Running template '{}' with persona {:?}", config.template, config.persona);

    let output = runner::run(&config, registry, verbose).await?;
    println!("{}", output);
    Ok(())
}

/// List registered templates
fn cmd_templates(registry: &TemplateRegistry) {
    debug!("cmd_templates: called");
    for name in registry.names() {
        println!("{}", name);
    }
}

/// Print a failure as `<kind>: <message>` on stderr
fn report(err: &eyre::Report) {
    let kind = err
        .downcast_ref::<TemplateError>()
        .map(TemplateError::kind)
        .unwrap_or("Error");
    eprintln!("{} {:#}", format!("{}:", kind).red().bold(), err);
}
