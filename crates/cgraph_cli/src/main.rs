//! cgraph CLI
//!
//! Prints and checks the runtime configuration a compiled graph would run
//! with in the current environment.

#![warn(missing_docs)]
#![warn(clippy::all)]

use cgraph_config::{
    get_current, ConfigField, ConfigSource, EnvSource, FieldKind, FieldValue, RuntimeConfig,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cgraph")]
#[command(about = "cgraph - compiled task-graph runtime tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect runtime configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ConfigAction {
    /// Show the resolved configuration
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List override variables, defaults and current settings
    Env {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the overrides set in the environment
    Check,
}

/// One override variable as seen in the environment
#[derive(Debug, Serialize)]
struct EnvRow {
    variable: String,
    field: &'static str,
    kind: FieldKind,
    default: FieldValue,
    value: Option<String>,
    description: &'static str,
}

fn env_rows(source: &EnvSource) -> Result<Vec<EnvRow>> {
    ConfigField::ALL
        .into_iter()
        .map(|field| {
            Ok(EnvRow {
                variable: source.qualified_key(field.name()),
                field: field.name(),
                kind: field.kind(),
                default: field.default_value(),
                value: source.lookup(field.name())?,
                description: field.description(),
            })
        })
        .collect()
}

fn render_env(rows: &[EnvRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let value = row.value.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "{:<34} {:<22} default={:<10} set={}\n",
            row.variable, row.kind, row.default, value
        ));
    }
    out
}

fn render_config(config: &RuntimeConfig) -> String {
    let mut out = String::new();
    for field in ConfigField::ALL {
        let value = config.get(field);
        let marker = if value == field.default_value() { ' ' } else { '*' };
        out.push_str(&format!(
            "{:<26} {:>12}{}  {}\n",
            field.name(),
            value,
            marker,
            field.description()
        ));
    }
    out
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            let config = get_current().wrap_err("failed to resolve runtime configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.snapshot())?);
            } else {
                print!("{}", render_config(&config));
            }
            Ok(())
        }
        ConfigAction::Env { json } => {
            let rows = env_rows(&EnvSource::default())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", render_env(&rows));
            }
            Ok(())
        }
        ConfigAction::Check => {
            let source = EnvSource::default();
            RuntimeConfig::from_source(&source).wrap_err("invalid runtime configuration")?;
            let overrides = env_rows(&source)?
                .iter()
                .filter(|row| row.value.is_some())
                .count();
            tracing::debug!(overrides, "configuration check passed");
            println!("ok ({} override(s) applied)", overrides);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cgraph_config=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Config { action } => run_config(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse_action(args: &[&str]) -> ConfigAction {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Config { action } => action,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show() {
        assert_eq!(
            parse_action(&["cgraph", "config", "show"]),
            ConfigAction::Show { json: false }
        );
        assert_eq!(
            parse_action(&["cgraph", "config", "show", "--json"]),
            ConfigAction::Show { json: true }
        );
    }

    #[test]
    fn test_parse_env_and_check() {
        assert_eq!(
            parse_action(&["cgraph", "config", "env"]),
            ConfigAction::Env { json: false }
        );
        assert_eq!(parse_action(&["cgraph", "config", "check"]), ConfigAction::Check);
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["cgraph", "config", "apply"]).is_err());
    }

    #[test]
    fn test_render_config_marks_changes() {
        let config = RuntimeConfig::defaults();
        config.set_max_inflight_executions(3);
        let out = render_config(&config);

        assert_eq!(out.lines().count(), ConfigField::ALL.len());
        let inflight = out
            .lines()
            .find(|l| l.starts_with("max_inflight_executions"))
            .unwrap();
        assert!(inflight.contains("3*"));
        let submit = out.lines().find(|l| l.starts_with("submit_timeout")).unwrap();
        assert!(!submit.contains('*'));
    }

    #[test]
    fn test_env_rows_cover_every_field() {
        let source = EnvSource::with_prefix("CGRAPH_CLI_TEST_UNSET_");
        let rows = env_rows(&source).unwrap();
        assert_eq!(rows.len(), ConfigField::ALL.len());
        assert_eq!(rows[0].variable, "CGRAPH_CLI_TEST_UNSET_SUBMIT_TIMEOUT");
        assert!(rows.iter().all(|row| row.value.is_none()));

        let out = render_env(&rows);
        assert!(out.contains("default=1000000"));
    }
}
