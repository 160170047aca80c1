// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layers, lowest first: built-in defaults, an optional TOML file, then
//! `MEALBOARD_*` environment variables.

use crate::projection::DEFAULT_INDENTATION_WIDTH;
use crate::week::WeekStart;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MEALBOARD";

/// Keys accepted by `mealboard config`
pub const KEYS: [&str; 4] = ["data_dir", "indentation_width", "week_starts_on", "log_level"];

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `board.json` and the journal
    pub data_dir: PathBuf,
    /// Horizontal pixels per depth level while dragging
    pub indentation_width: f64,
    /// First day of a displayed week
    pub week_starts_on: WeekStart,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            indentation_width: DEFAULT_INDENTATION_WIDTH,
            week_starts_on: WeekStart::Monday,
            log_level: "info".to_string(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "hyperpolymath", "mealboard")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".mealboard"))
}

/// Default location of the TOML file
#[must_use]
pub fn default_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("mealboard.toml"))
}

/// Load configuration from defaults, `path` (if it exists) and the environment
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = Config::default();
    let mut builder = config::Config::builder()
        .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
        .set_default("indentation_width", defaults.indentation_width)?
        .set_default("week_starts_on", "monday")?
        .set_default("log_level", defaults.log_level)?;

    let file = path.map_or_else(default_path, Path::to_path_buf);
    builder = builder.add_source(config::File::from(file.as_path()).required(false));

    let config: Config = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .with_context(|| format!("Failed to read configuration from {}", file.display()))?
        .try_deserialize()
        .context("Invalid configuration")?;

    if config.indentation_width.is_nan() || config.indentation_width <= 0.0 {
        bail!("indentation_width must be positive, got {}", config.indentation_width);
    }
    Ok(config)
}

/// Read one key of the effective configuration
pub fn get(config: &Config, key: &str) -> Result<String> {
    Ok(match key {
        "data_dir" => config.data_dir.display().to_string(),
        "indentation_width" => config.indentation_width.to_string(),
        "week_starts_on" => match config.week_starts_on {
            WeekStart::Monday => "monday".to_string(),
            WeekStart::Sunday => "sunday".to_string(),
        },
        "log_level" => config.log_level.clone(),
        _ => bail!("Unknown config key: {}. Use one of {}", key, KEYS.join(", ")),
    })
}

/// Set one key in the TOML file at `path`, creating it if needed
pub fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut table = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse::<toml::Table>()
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        toml::Table::new()
    };

    let parsed = match key {
        "data_dir" | "log_level" => toml::Value::String(value.to_string()),
        "indentation_width" => {
            let width: f64 = value
                .parse()
                .with_context(|| format!("indentation_width must be a number, got {value}"))?;
            if width.is_nan() || width <= 0.0 {
                bail!("indentation_width must be positive, got {}", value);
            }
            toml::Value::Float(width)
        }
        "week_starts_on" => match value {
            "monday" | "sunday" => toml::Value::String(value.to_string()),
            _ => bail!("week_starts_on must be monday or sunday, got {}", value),
        },
        _ => bail!("Unknown config key: {}. Use one of {}", key, KEYS.join(", ")),
    };
    table.insert(key.to_string(), parsed);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, toml::to_string_pretty(&table)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
