mod config;
mod script;
mod storage;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rollup::{ChangeStatus, SaveDecision, Session, StationDefaults};

use config::{Config, ConfigSource};
use script::EditScript;
use storage::FileStorage;

#[derive(Parser)]
#[command(name = "rollup")]
#[command(about = "Capability rollup override editor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: nearest rollup.toml upward from cwd)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Resolved station defaults (JSON)
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Override records directory
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every capability tree in its wire form
    Show {
        /// Only trees of this station group
        #[arg(short, long)]
        group: Option<String>,

        /// Only trees that differ from their default
        #[arg(long)]
        changed: bool,
    },

    /// Validate every tree and report conflicts
    Check,

    /// Apply an edit script and save the result
    Apply {
        /// TOML file of [[edit]] tables
        script: PathBuf,

        /// Print save decisions without touching the override directory
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?.with_flags(cli.defaults, cli.overrides);
    match &config.source {
        ConfigSource::File(path) => log::info!("Using config {}", path.display()),
        ConfigSource::Default => log::info!("No rollup.toml found, using defaults"),
    }

    let storage = FileStorage::new(config.overrides.clone());
    let mut session = load_session(&config, &storage)?;

    match cli.command {
        Commands::Show { group, changed } => show(&session, group.as_deref(), changed)?,
        Commands::Check => check(&session)?,
        Commands::Apply { script, dry_run } => {
            let script = EditScript::from_file(&script)?;
            session
                .apply_all(&script.edit)
                .context("Edit script rejected")?;
            println!("Applied {} edit(s)", script.edit.len());
            check(&session)?;
            save(&session, &storage, dry_run)?;
        }
    }

    Ok(())
}

/// Load the defaults bundle and resume from any stored overrides.
fn load_session(config: &Config, storage: &FileStorage) -> Result<Session> {
    let content = std::fs::read_to_string(&config.defaults)
        .with_context(|| format!("Failed to read defaults: {}", config.defaults.display()))?;
    let defaults: StationDefaults = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse defaults: {}", config.defaults.display()))?;
    let mut session = Session::from_defaults(&defaults)
        .with_context(|| format!("Failed to load station {}", defaults.station_name))?;

    let scopes: Vec<_> = session.scopes().cloned().collect();
    for scope in &scopes {
        if let Some(option) = storage.load(&scope.override_name())? {
            session.restore(scope, option.parameters.operands())?;
        }
    }
    Ok(session)
}

fn show(session: &Session, group: Option<&str>, changed_only: bool) -> Result<()> {
    let statuses = session.change_status();
    for (scope, status) in statuses {
        if group.is_some_and(|group| scope.group_name.as_deref() != Some(group)) {
            continue;
        }
        if changed_only && status == ChangeStatus::Unchanged {
            continue;
        }
        let tree = session.tree(&scope)?;
        let operands = tree.serialize(session.universe(&scope)?);
        let marker = match status {
            ChangeStatus::Unchanged => "",
            ChangeStatus::Changed => " (changed)",
        };
        println!("{}{marker}", scope.override_name());
        println!("{}", serde_json::to_string_pretty(&operands)?);
    }
    Ok(())
}

fn check(session: &Session) -> Result<()> {
    for (scope, conflicted) in session.conflicts() {
        println!("warning: {scope} selects unknown {}", conflicted.join(", "));
    }
    let errors = session.errors();
    if errors.is_empty() {
        println!("No validation errors");
        return Ok(());
    }
    for record in errors.records() {
        println!("error: {}: {}", record.key(), record.message);
    }
    bail!("{} validation error(s)", errors.len())
}

fn save(session: &Session, storage: &FileStorage, dry_run: bool) -> Result<()> {
    let decisions = session.save_decisions(storage)?;
    if dry_run {
        for (scope, decision) in &decisions {
            match decision {
                SaveDecision::None => {}
                SaveDecision::Delete { name } => println!("would delete {name} ({scope})"),
                SaveDecision::Persist(option) => {
                    println!("would persist {}", option.name);
                    println!("{}", serde_json::to_string_pretty(option)?);
                }
            }
        }
        return Ok(());
    }

    let summary = storage.save(&decisions)?;
    for name in &summary.persisted {
        println!("Persisted {name}");
    }
    for name in &summary.deleted {
        println!("Deleted {name}");
    }
    if summary.persisted.is_empty() && summary.deleted.is_empty() {
        println!("Nothing to save");
    }
    Ok(())
}
