//! Config command: show, create and edit the JSON configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use ddtx_core::ExtractionConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Destination (default: the user configuration file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, addressed as "section.field"
    Get { key: String },

    /// Change one value, addressed as "section.field"
    Set { key: String, value: String },

    /// Print where the configuration file lives
    Path,
}

/// Runs against `--config` when given, the user configuration file otherwise.
pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(user_config_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} {} not found, using defaults", style("ℹ").blue(), path.display());
            }
            println!("{}", serde_json::to_string_pretty(&load(&path)?)?);
        }
        ConfigCommand::Init { output, force } => init(&output.unwrap_or(path), force)?,
        ConfigCommand::Get { key } => {
            let json = to_json(&load(&path)?)?;
            println!("{}", serde_json::to_string_pretty(lookup(&json, &key)?)?);
        }
        ConfigCommand::Set { key, value } => set(&path, &key, &value)?,
        ConfigCommand::Path => {
            let status = if path.exists() {
                style("exists").green()
            } else {
                style("not created, run 'ddtx config init'").yellow()
            };
            println!("{} ({})", path.display(), status);
        }
    }

    Ok(())
}

fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ddtx")
        .join("config.json")
}

fn load(path: &Path) -> anyhow::Result<ExtractionConfig> {
    if path.exists() {
        Ok(ExtractionConfig::from_file(path)?)
    } else {
        Ok(ExtractionConfig::default())
    }
}

fn save(path: &Path, config: &ExtractionConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    save(path, &ExtractionConfig::default())?;
    println!("{} Created {}", style("✓").green(), path.display());
    Ok(())
}

/// JSON tree of the configuration.
///
/// Goes through the text form so `f32` fields keep their shortest decimal
/// spelling (`0.9`, not `0.8999999761581421`).
fn to_json(config: &ExtractionConfig) -> anyhow::Result<Value> {
    Ok(serde_json::from_str(&serde_json::to_string(config)?)?)
}

fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    // Anything that is not valid JSON is taken as a string.
    let value: Value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = to_json(&load(path)?)?;
    let (section, field) = key.rsplit_once('.').unwrap_or(("", key));

    let parent = if section.is_empty() {
        Some(&mut json)
    } else {
        section
            .split('.')
            .try_fold(&mut json, |current, part| current.get_mut(part))
    };
    let slot = parent
        .and_then(|parent| parent.get_mut(field))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value.clone();

    let config = ExtractionConfig::from_json(&json.to_string())?;
    save(path, &config)?;

    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}
