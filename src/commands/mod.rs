// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod drag;
pub mod init;
pub mod project;
pub mod show;
pub mod table;

use crate::bridge::MutationBridge;
use crate::config::Config;
use crate::engine::Board;
use crate::store::JsonStore;
use crate::week::WeekWindow;
use anyhow::{bail, Context as _, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// TOML file that `config <key> <value>` writes
    pub config_path: PathBuf,
    /// Print JSON instead of text
    pub json: bool,
    /// Colour text output
    pub color: bool,
}

impl Context {
    /// Store under the configured data directory
    #[must_use]
    pub fn store(&self) -> JsonStore {
        JsonStore::new(&self.config.data_dir)
    }

    /// Bridge that reads and writes the store
    #[must_use]
    pub fn bridge(&self) -> MutationBridge {
        let store = Arc::new(self.store());
        MutationBridge::new(store.clone(), store)
    }

    /// Week containing `date`, or the current week
    #[must_use]
    pub fn window(&self, date: Option<NaiveDate>) -> WeekWindow {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        WeekWindow::containing(date, self.config.week_starts_on)
    }

    /// Load the board for a week from an initialized store
    pub async fn board(&self, week: Option<NaiveDate>) -> Result<Board> {
        let store = self.store();
        if !store.exists() {
            bail!(
                "No board found in {}. Run `mealboard init` first",
                store.dir().display()
            );
        }
        let board = self
            .bridge()
            .load(self.window(week))
            .await
            .context("Failed to load board")?;
        Ok(board.with_indentation_width(self.config.indentation_width))
    }
}
