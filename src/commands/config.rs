// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command implementation

use anyhow::Result;

use super::Context;
use crate::config;

/// Print the effective configuration, one key, or set a key
pub fn run(ctx: &Context, key: Option<&str>, value: Option<&str>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            } else {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
            }
        }
        (Some(key), None) => println!("{}", config::get(&ctx.config, key)?),
        (Some(key), Some(value)) => {
            config::set(&ctx.config_path, key, value)?;
            tracing::info!("Set {} = {} in {}", key, value, ctx.config_path.display());
            println!("{key} = {value}");
        }
    }
    Ok(())
}
