//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use roundtable_application::{ConversationLogger, SessionRegistry};
use roundtable_domain::{ConfigIssue, RosterSpec, SessionId, SessionMode};
use roundtable_infrastructure::{ConfigLoader, FileConfig, JsonlConversationLogger, build_backend};
use roundtable_presentation::{ChatRepl, Cli, ConsoleFormatter, OutputFormat};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are written on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting roundtable");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = match (cli.no_config, cli.config.as_ref()) {
        (true, None) => ConfigLoader::load_defaults(),
        (true, Some(path)) => ConfigLoader::load_file(path)
            .map_err(|e| anyhow!("Failed to load {}: {}", path.display(), e))?,
        (false, path) => ConfigLoader::load(path)
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?,
    };

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.list_personas {
        println!("{}", ConsoleFormatter::format_personas(&config.persona_catalog()));
        return Ok(());
    }

    report_issues(&config.validate())?;

    // === Dependency Injection ===
    let mut params = config.driver_params();
    if let Some(seed) = cli.seed {
        params = params.with_seed(seed);
    }

    let backend = build_backend(&config)?;
    let mut registry = SessionRegistry::new(config.persona_catalog(), backend, params);
    if let Some(logger) = conversation_logger(&config) {
        registry = registry.with_conversation_logger(logger);
    }
    let registry = Arc::new(registry);

    let mut roster = RosterSpec::of(cli.member.iter().cloned());
    if let Some(mode) = cli.mode {
        roster = roster.with_mode(SessionMode::from(mode));
    }
    let session = registry
        .start_or_resolve_session(cli.session.clone().map(SessionId::from), &roster)?;

    let format = cli
        .output
        .or(config.output.format.map(OutputFormat::from))
        .unwrap_or(OutputFormat::Text);
    let repl = ChatRepl::new(Arc::clone(&registry), session).with_format(format);

    let outcome = tokio::select! {
        result = async {
            if cli.messages.is_empty() {
                repl.run().await.map_err(anyhow::Error::from)
            } else {
                repl.run_batch(&cli.messages)
                    .await
                    .map(|_| ())
                    .map_err(anyhow::Error::from)
            }
        } => result,
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!("Interrupted");
            Ok(())
        }
    };

    registry.shutdown();
    outcome
}

/// Install the tracing subscriber, writing to `log_file` when given
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file needs a file name: {}", path.display()))?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Print every issue; fail if any of them is an error
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        if issue.is_error() {
            eprintln!("{} {}", "error:".red().bold(), issue.message);
        } else {
            warn!("{}", issue.message);
            eprintln!("{} {}", "warning:".yellow().bold(), issue.message);
        }
    }

    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("Configuration has {} error(s)", errors);
    }
    Ok(())
}

fn conversation_logger(config: &FileConfig) -> Option<Arc<dyn ConversationLogger>> {
    let path = config.logging.conversation_log.as_ref()?;
    match JsonlConversationLogger::new(path) {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Some(Arc::new(logger))
        }
        None => {
            warn!("Conversation log disabled");
            None
        }
    }
}
