use crate::config_loader::load_config;
use crate::engine::PermissionEngine;
use crate::role::Role;
use crate::schema::FeatureArea;
use crate::training::training_access;
use crate::user::User;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

/// Top-level CLI interface for the permission resolver
#[derive(Parser)]
#[command(
    name = "fleetflow_access",
    version = "0.1.0",
    about = "Section-level permission resolver for the FleetFlow dashboard"
)]
pub struct Cli {
    /// TOML config file (defaults to fleetflow_access.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every feature area and its capability keys
    Schema,

    /// Print the effective permission matrix for a user record
    Resolve {
        #[arg(short, long)]
        user: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the effective matrix with the layer that decided each cell
    Explain {
        #[arg(short, long)]
        user: PathBuf,
    },

    /// Check a single capability
    Check {
        #[arg(short, long)]
        user: PathBuf,
        #[arg(long)]
        area: String,
        #[arg(long)]
        key: String,
    },

    /// Evaluate a named legacy composite check
    Legacy {
        #[arg(short, long)]
        user: PathBuf,
        #[arg(long)]
        name: String,
    },

    /// Print the training curriculum for a role
    Training {
        #[arg(long)]
        role: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Build the engine from configuration and report any schema violation
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Toml,
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Toml => toml::to_string_pretty(value)?,
    })
}

fn build_engine(cli_config: Option<&PathBuf>) -> anyhow::Result<PermissionEngine> {
    let config = load_config(cli_config.map(PathBuf::as_path)).context("loading configuration")?;
    PermissionEngine::from_config(&config).context("building permission engine")
}

fn load_user(path: &PathBuf) -> anyhow::Result<User> {
    User::from_file(path).with_context(|| format!("loading user from {}", path.display()))
}

pub fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Schema => {
            for area in FeatureArea::ALL {
                println!("{area}");
                for key in area.key_names() {
                    println!("  {key}");
                }
            }
        }
        Commands::Resolve { user, format } => {
            let engine = build_engine(cli.config.as_ref())?;
            let permissions = engine.resolve(&load_user(&user)?);
            println!("{}", render(&permissions, format)?);
        }
        Commands::Explain { user } => {
            let engine = build_engine(cli.config.as_ref())?;
            let trace = engine.explain(&load_user(&user)?);
            println!("{}", serde_json::to_string_pretty(&trace)?);
        }
        Commands::Check { user, area, key } => {
            let engine = build_engine(cli.config.as_ref())?;
            let area: FeatureArea = area.parse()?;
            let allowed = engine.can_named(&load_user(&user)?, area, &key)?;
            println!("{allowed}");
        }
        Commands::Legacy { user, name } => {
            let engine = build_engine(cli.config.as_ref())?;
            let allowed = engine.check_legacy_named(&load_user(&user)?, &name)?;
            println!("{allowed}");
        }
        Commands::Training { role, format } => {
            let role = Role::from(role);
            println!("{}", render(&training_access(&role), format)?);
        }
        Commands::Validate => {
            let engine = build_engine(cli.config.as_ref())?;
            println!(
                "Configuration valid: {} plans, merge mode {:?}",
                engine.plans().plan_ids().count(),
                engine.plans().merge_mode()
            );
        }
    }
    Ok(())
}
