//! Argument parsing and command execution

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use connswitch_core::prelude::*;
use connswitch_core::{create_backup, mask_sensitive, ConfigFileHandler};
use std::io::Write;
use std::path::PathBuf;

const LIST_RULE_WIDTH: usize = 50;

pub(crate) fn build_cli() -> Command {
    Command::new("connswitch")
        .version(connswitch_core::VERSION)
        .about("A tool for managing connection strings across different environments")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("environment")
                .short('e')
                .long("environment")
                .value_parser(value_parser!(EnvironmentType))
                .help("Target environment (Development, QA, Production)"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List all available connection strings"),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .help("Connection string name pattern (default: {Environment}Connection)"),
        )
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .help("Connection string to update (default: DefaultConnection)"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .default_value("default")
                .value_parser(value_parser!(SwitchMode))
                .help("Update mode: 'default' (copy into the target key) or 'comment' (toggle commented blocks)"),
        )
        .arg(
            Arg::new("no-backup")
                .long("no-backup")
                .action(ArgAction::SetTrue)
                .help("Skip creating a backup file"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with engine settings"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
}

/// Parsed command line
#[derive(Debug, Clone)]
pub(crate) struct Options {
    file: PathBuf,
    environment: Option<EnvironmentType>,
    list: bool,
    name_pattern: Option<String>,
    target: Option<String>,
    mode: SwitchMode,
    backup: bool,
    config: Option<PathBuf>,
}

impl Options {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            file: matches
                .get_one::<PathBuf>("file")
                .cloned()
                .context("File path is required. Use -f or --file option.")?,
            environment: matches.get_one::<EnvironmentType>("environment").copied(),
            list: matches.get_flag("list"),
            name_pattern: matches.get_one::<String>("name").cloned(),
            target: matches.get_one::<String>("target").cloned(),
            mode: matches.get_one::<SwitchMode>("mode").copied().unwrap_or_default(),
            backup: !matches.get_flag("no-backup"),
            config: matches.get_one::<PathBuf>("config").cloned(),
        })
    }
}

pub(crate) async fn run(options: &Options, out: &mut impl Write) -> Result<()> {
    let config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = ConnectionStringEngine::new(config);

    if options.list {
        return list(&engine, options, out).await;
    }

    let Some(environment) = options.environment else {
        anyhow::bail!(
            "Environment is required when not listing. Use -e or --environment option.\nValid environments: {}",
            EnvironmentType::ALL.map(EnvironmentType::as_str).join(", ")
        );
    };

    let mut request = SwitchRequest::new(&options.file, environment)
        .with_name_pattern(
            options
                .name_pattern
                .clone()
                .unwrap_or_else(|| engine.config().default_name_pattern.clone()),
        )
        .with_mode(options.mode);
    if let Some(target) = &options.target {
        request = request.with_target_connection(target.clone());
    }

    let handler = engine.preflight(&options.file).await?;
    if handler.effective_mode(request.mode) == SwitchMode::Default {
        request.source_key()?;
    }
    if options.backup {
        let backup = create_backup(&options.file).await?;
        writeln!(out, "Backup created: {}", backup.display())?;
    }

    let outcome = engine.switch(&request).await?;
    if let Some(report) = &outcome.comment_report {
        tracing::info!(
            "{} blocks, {} lines commented, {} uncommented",
            report.blocks.len(),
            report.commented,
            report.uncommented
        );
    }
    writeln!(out, "Connection string successfully switched to {environment}")?;
    Ok(())
}

async fn list(engine: &ConnectionStringEngine, options: &Options, out: &mut impl Write) -> Result<()> {
    let entries = engine.list(&options.file).await?;

    writeln!(out, "Available connection strings:")?;
    writeln!(out, "{}", "-".repeat(LIST_RULE_WIDTH))?;
    for entry in &entries {
        let environment = entry.environment.map_or("Unknown", EnvironmentType::as_str);
        writeln!(out, "{:<25} [{}]", entry.name, environment)?;
        writeln!(
            out,
            "  {}",
            mask_sensitive(&entry.raw_value, &engine.config().sensitive_keys)
        )?;
        writeln!(out)?;
    }
    Ok(())
}
