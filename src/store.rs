// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! JSON file store
//!
//! Keeps the board and the weekly table in `board.json` under the data
//! directory, and appends every accepted persistence intent to
//! `journal.jsonl`, one JSON object per line. Serves as both the read path
//! and the write path of the mutation bridge for local runs.

use crate::bridge::{MutationSurface, ScheduleSource};
use crate::error::{BoardError, BoardResult, SurfaceError};
use crate::intents::{Intent, SwitchAssignment, UpdateOrder};
use crate::table::{MealGroupRow, PlanTable};
use crate::types::{DaySchedule, Group, Meal, ScheduleItem};
use crate::week::WeekWindow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

const BOARD_FILE: &str = "board.json";
const JOURNAL_FILE: &str = "journal.jsonl";

/// Everything stored in `board.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFile {
    /// Day schedules, any week
    #[serde(default)]
    pub days: Vec<DaySchedule>,
    /// Weekly table rows
    #[serde(default)]
    pub rows: Vec<MealGroupRow>,
}

impl BoardFile {
    /// Two days of sample meals and a two-row table
    #[must_use]
    pub fn demo() -> Self {
        let date = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap_or_default();
        let group = |id: &str, name: &str, meals: Vec<Meal>| Group {
            id: id.into(),
            name: name.into(),
            meals,
        };

        let days = vec![
            DaySchedule {
                id: "day1".into(),
                serving_date: date(1),
                items: vec![
                    ScheduleItem::meal("schedule1", Meal::new("meal1", "pizza")),
                    ScheduleItem::meal("schedule2", Meal::new("meal2", "bread")),
                    ScheduleItem::group(
                        "schedule3",
                        group("group1", "breakfast", vec![Meal::new("meal3", "tea"), Meal::new("meal4", "sandwich")]),
                    ),
                ],
            },
            DaySchedule {
                id: "day2".into(),
                serving_date: date(2),
                items: vec![
                    ScheduleItem::meal("schedule4", Meal::new("meal5", "pasta")),
                    ScheduleItem::meal("schedule5", Meal::new("meal6", "salad")),
                    ScheduleItem::group(
                        "schedule6",
                        group("group2", "lunch", vec![Meal::new("meal7", "soup"), Meal::new("meal8", "burger")]),
                    ),
                ],
            },
        ];

        let rows = vec![
            MealGroupRow {
                id: "row-breakfast".into(),
                name: "breakfast".into(),
                color: Some("#f6c177".into()),
                order_index: 0,
                cells: [Some("meal3".into()), Some("meal4".into()), None, None, None, None, None],
            },
            MealGroupRow {
                id: "row-lunch".into(),
                name: "lunch".into(),
                color: Some("#9ccfd8".into()),
                order_index: 1,
                cells: [Some("meal7".into()), None, Some("meal8".into()), None, None, None, None],
            },
        ];

        Self { days, rows }
    }
}

/// One accepted intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Deterministic intent id
    pub id: String,
    /// When it was accepted
    pub recorded_at: DateTime<Utc>,
    /// The intent itself
    pub intent: Intent,
}

/// Board persisted as JSON under a data directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Store rooted at `dir`; nothing is touched until the first read or write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `board.json` exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.dir.join(BOARD_FILE).exists()
    }

    /// Read `board.json`, or an empty board if it does not exist
    pub async fn load(&self) -> BoardResult<BoardFile> {
        let path = self.dir.join(BOARD_FILE);
        if !path.exists() {
            return Ok(BoardFile::default());
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write `board.json`
    pub async fn save(&self, file: &BoardFile) -> BoardResult<()> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(file)?;
        fs::write(self.dir.join(BOARD_FILE), json).await?;
        debug!("Saved {} days and {} rows", file.days.len(), file.rows.len());
        Ok(())
    }

    /// Replace the stored schedules of one week, keeping every other day
    pub async fn save_week(&self, window: &WeekWindow, days: &[DaySchedule]) -> BoardResult<()> {
        let mut file = self.load().await?;
        file.days.retain(|d| !window.contains(d.serving_date));
        file.days.extend(days.iter().filter(|d| window.contains(d.serving_date)).cloned());
        file.days.sort_by_key(|d| d.serving_date);
        self.save(&file).await
    }

    /// Load the weekly table
    pub async fn table(&self) -> BoardResult<PlanTable> {
        Ok(PlanTable::new(self.load().await?.rows))
    }

    /// Replace the stored table rows, keeping the days
    pub async fn save_table(&self, table: &PlanTable) -> BoardResult<()> {
        let mut file = self.load().await?;
        file.rows = table.rows.clone();
        self.save(&file).await
    }

    /// Accepted intents, oldest first
    pub async fn journal(&self) -> BoardResult<Vec<JournalEntry>> {
        let path = self.dir.join(JOURNAL_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(BoardError::from))
            .collect()
    }

    async fn append(&self, intent: Intent) -> BoardResult<()> {
        let entry = JournalEntry {
            id: intent.generate_id(),
            recorded_at: Utc::now(),
            intent,
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(JOURNAL_FILE))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!("Journaled {}", entry.id);
        Ok(())
    }
}

#[async_trait]
impl ScheduleSource for JsonStore {
    async fn fetch(&self, window: &WeekWindow) -> Result<Vec<DaySchedule>, SurfaceError> {
        let file = self.load().await.map_err(|e| SurfaceError::Unavailable(e.to_string()))?;
        Ok(file
            .days
            .into_iter()
            .filter(|d| window.contains(d.serving_date))
            .collect())
    }
}

#[async_trait]
impl MutationSurface for JsonStore {
    async fn update_order(&self, order: &UpdateOrder) -> Result<(), SurfaceError> {
        self.append(Intent::UpdateOrder(order.clone()))
            .await
            .map_err(|e| SurfaceError::Internal(e.to_string()))
    }

    async fn switch_assignment(&self, switch: &SwitchAssignment) -> Result<(), SurfaceError> {
        self.append(Intent::SwitchAssignment(switch.clone()))
            .await
            .map_err(|e| SurfaceError::Internal(e.to_string()))
    }
}
