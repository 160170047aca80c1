// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Weekly plan table: meal-group rows by seven weekday cells
//!
//! Rows are sortable among themselves and cells can be dragged onto other
//! cells. Dropping a cell onto an occupied one swaps the two meals.

use crate::error::{BoardError, BoardResult};
use crate::intents::{Intent, SwitchAssignment, UpdateOrder};
use crate::types::DayKey;
use crate::week::WeekWindow;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One meal-group row of the weekly table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealGroupRow {
    /// Row identifier
    pub id: String,
    /// Display name (e.g. "breakfast")
    pub name: String,
    /// Display colour
    #[serde(default)]
    pub color: Option<String>,
    /// Display rank among rows
    pub order_index: usize,
    /// Meal id per column, first day of the week first
    #[serde(default)]
    pub cells: [Option<String>; 7],
}

/// A cell address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    /// Row identifier
    pub row_id: &'a str,
    /// Column, 0-based from the first day of the week
    pub column: usize,
}

/// The weekly plan table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTable {
    /// Rows in storage order
    pub rows: Vec<MealGroupRow>,
}

impl PlanTable {
    /// Create a table from rows
    #[must_use]
    pub fn new(rows: Vec<MealGroupRow>) -> Self {
        Self { rows }
    }

    /// Rows in display order
    #[must_use]
    pub fn sorted(&self) -> Vec<&MealGroupRow> {
        let mut rows: Vec<&MealGroupRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| a.order_index.cmp(&b.order_index).then_with(|| a.id.cmp(&b.id)));
        rows
    }

    fn row_position(&self, id: &str) -> BoardResult<usize> {
        self.rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| BoardError::InvalidMove(format!("no table row {id}")))
    }

    /// Drop row `active` onto row `over`: their ranks are swapped
    ///
    /// Returns the two rank updates, or nothing when a row is dropped onto
    /// itself.
    pub fn reorder_rows(&mut self, active: &str, over: &str) -> BoardResult<Vec<Intent>> {
        let a = self.row_position(active)?;
        let b = self.row_position(over)?;
        if a == b {
            return Ok(Vec::new());
        }

        let rank = self.rows[a].order_index;
        self.rows[a].order_index = self.rows[b].order_index;
        self.rows[b].order_index = rank;
        debug!("Swapped row ranks of {} and {}", active, over);

        Ok([a, b]
            .into_iter()
            .map(|i| {
                Intent::UpdateOrder(UpdateOrder {
                    day: None,
                    container_id: self.rows[i].id.clone(),
                    order_index: self.rows[i].order_index,
                })
            })
            .collect())
    }

    /// Drop cell `from` onto cell `to`, swapping their meals
    ///
    /// Dragging an empty cell is an invalid move. The meal previously in
    /// `to` is reported as replaced and lands in `from`.
    pub fn switch_cells(&mut self, window: &WeekWindow, from: Cell<'_>, to: Cell<'_>) -> BoardResult<Option<Intent>> {
        if from.column > 6 || to.column > 6 {
            return Err(BoardError::InvalidMove("column out of range".into()));
        }
        if from == to {
            return Ok(None);
        }
        let source = self.row_position(from.row_id)?;
        let target = self.row_position(to.row_id)?;

        let meal_id = self.rows[source].cells[from.column]
            .clone()
            .ok_or_else(|| BoardError::InvalidMove(format!("cell {}/{} is empty", from.row_id, from.column)))?;
        let replaced = self.rows[target].cells[to.column].replace(meal_id.clone());
        self.rows[source].cells[from.column] = replaced.clone();

        let days = window.days();
        Ok(Some(Intent::SwitchAssignment(SwitchAssignment {
            previous_day: DayKey(days[from.column]),
            previous_container_id: Some(from.row_id.to_string()),
            meal_id,
            new_day: DayKey(days[to.column]),
            new_container_id: Some(to.row_id.to_string()),
            replaced_meal_id: replaced,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(id: &str, order_index: usize, cells: [Option<&str>; 7]) -> MealGroupRow {
        MealGroupRow {
            id: id.into(),
            name: id.into(),
            color: None,
            order_index,
            cells: cells.map(|c| c.map(String::from)),
        }
    }

    fn table() -> PlanTable {
        PlanTable::new(vec![
            row("lunch", 1, [Some("soup"), None, None, None, None, None, None]),
            row("breakfast", 0, [Some("tea"), Some("toast"), None, None, None, None, None]),
        ])
    }

    fn window() -> WeekWindow {
        WeekWindow::starting(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_sorted_by_rank() {
        let table = table();
        let ids: Vec<&str> = table.sorted().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["breakfast", "lunch"]);
    }

    #[test]
    fn test_reorder_swaps_ranks() {
        let mut table = table();
        let intents = table.reorder_rows("lunch", "breakfast").unwrap();
        assert_eq!(intents.len(), 2);
        let ids: Vec<&str> = table.sorted().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["lunch", "breakfast"]);
        assert!(table.reorder_rows("lunch", "lunch").unwrap().is_empty());
    }

    #[test]
    fn test_switch_into_empty_cell() {
        let mut table = table();
        let intent = table
            .switch_cells(&window(), Cell { row_id: "breakfast", column: 1 }, Cell { row_id: "lunch", column: 2 })
            .unwrap()
            .unwrap();
        let Intent::SwitchAssignment(switch) = intent else {
            panic!("expected a switch");
        };
        assert_eq!(switch.meal_id, "toast");
        assert_eq!(switch.replaced_meal_id, None);
        assert_eq!(switch.new_day.to_string(), "2024-01-03");
        assert_eq!(table.rows[0].cells[2].as_deref(), Some("toast"));
        assert_eq!(table.rows[1].cells[1], None);
    }

    #[test]
    fn test_switch_swaps_occupied_cells() {
        let mut table = table();
        let intent = table
            .switch_cells(&window(), Cell { row_id: "breakfast", column: 0 }, Cell { row_id: "lunch", column: 0 })
            .unwrap();
        assert!(matches!(
            intent,
            Some(Intent::SwitchAssignment(SwitchAssignment { replaced_meal_id: Some(ref r), .. })) if r == "soup"
        ));
        assert_eq!(table.rows[0].cells[0].as_deref(), Some("tea"));
        assert_eq!(table.rows[1].cells[0].as_deref(), Some("soup"));
    }

    #[test]
    fn test_moving_empty_cell_is_invalid() {
        let mut table = table();
        let err = table
            .switch_cells(&window(), Cell { row_id: "lunch", column: 3 }, Cell { row_id: "breakfast", column: 0 })
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidMove(_)));
    }
}
