//! CLI interface for linecrew.
//!
//! - `linecrew shell`: read commands from stdin against one session.
//! - `linecrew catalog`: summarize the catalog a session would start from.
//! - `linecrew theme <light|dark>`: persist the theme preference.
//!
//! `--catalog <path>` overrides the configured catalog for any command.

mod format;
mod shell;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::Catalog;
use crate::config::{Config, Theme};
use crate::session::Session;

/// linecrew: shift checklists and as-built point data for field crews.
#[derive(Debug, Parser)]
#[command(name = "linecrew", after_long_help = SHELL_HELP)]
pub struct Cli {
    /// Catalog JSON file. Defaults to the configured catalog, then the built-in sample.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const SHELL_HELP: &str = r#"Shell session: opening a shift
  linecrew shell
  > go open-shift
  > show-checklist apr
  > answer apr c1 i1 "Base North"
  > complete apr
  > open-shift
  > execute-point work1 pt2 '{"pruning": {"performed": true}}'"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and read shell commands from stdin until EOF or `quit`.
    ///
    /// Type `help` for the list of shell commands.
    Shell,

    /// Summarize the catalog.
    Catalog,

    /// Set the theme preference.
    Theme {
        #[arg(value_enum)]
        theme: Theme,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(mut config: Config) -> Result<(), String> {
    let cli = Cli::parse();
    if let Some(path) = cli.catalog {
        config.catalog = Some(path);
    }

    match cli.command {
        Command::Shell => {
            let catalog = load_catalog(&config)?;
            let mut session =
                Session::login(catalog, &config).map_err(|e| format!("login failed: {e}"))?;
            let result = shell::cmd_shell(&mut session, io::stdin().lock());
            session.logout();
            result
        }
        Command::Catalog => cmd_catalog(&load_catalog(&config)?),
        Command::Theme { theme } => cmd_theme(theme),
    }
}

fn load_catalog(config: &Config) -> Result<Catalog, String> {
    match &config.catalog {
        Some(path) => Catalog::load(path),
        None => Catalog::builtin(),
    }
    .map_err(|e| format!("failed to load catalog: {e}"))
}

fn cmd_catalog(catalog: &Catalog) -> Result<(), String> {
    let points: usize = catalog.works.iter().map(|w| w.points.len()).sum();
    let user = catalog
        .member(&catalog.user)
        .map_or_else(|| catalog.user.to_string(), |m| m.name.clone());
    println!("user: {user}");
    println!(
        "roster: {} member(s), team: {}",
        catalog.roster.len(),
        catalog.team.len()
    );
    println!(
        "vehicles: {} (assigned: {})",
        catalog.vehicles.len(),
        catalog.initial_vehicle().map_or("none", |v| v.plate.as_str())
    );
    println!("works: {} with {points} point(s)", catalog.works.len());
    let roles: Vec<_> = catalog
        .checklists
        .individual
        .keys()
        .map(ToString::to_string)
        .collect();
    println!(
        "checklist templates: apr + {} (default: {})",
        roles.join(", "),
        catalog.checklists.default_role
    );
    Ok(())
}

fn cmd_theme(theme: Theme) -> Result<(), String> {
    let path = Config::path().ok_or("could not determine home directory")?;
    let mut config = Config::load_from(&path).map_err(|e| e.to_string())?;
    config.theme = theme;
    config.save_to(&path).map_err(|e| e.to_string())?;
    eprintln!("Theme set to {theme:?} in {}", path.display());
    Ok(())
}
