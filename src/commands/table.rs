// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Weekly table command implementations

use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use super::Context;
use crate::intents::Intent;
use crate::table::{Cell, PlanTable};
use crate::week::WeekWindow;

/// Run a table action
pub async fn run(ctx: &Context, action: &str, args: &[String], week: Option<NaiveDate>) -> Result<()> {
    let window = ctx.window(week);
    match action {
        "show" => show(ctx, &window).await,
        "reorder" => {
            let [active, over] = args else {
                bail!("Usage: table reorder <ACTIVE_ROW> <OVER_ROW>");
            };
            reorder(ctx, active, over).await
        }
        "switch" => {
            let [from_row, from_col, to_row, to_col] = args else {
                bail!("Usage: table switch <ROW> <COLUMN> <ROW> <COLUMN>");
            };
            let from = Cell {
                row_id: from_row,
                column: parse_column(&window, from_col)?,
            };
            let to = Cell {
                row_id: to_row,
                column: parse_column(&window, to_col)?,
            };
            switch(ctx, &window, from, to).await
        }
        _ => bail!("Unknown action: {}. Use show, reorder, or switch", action),
    }
}

/// Column index 0-6, or a date inside the week
fn parse_column(window: &WeekWindow, raw: &str) -> Result<usize> {
    if let Ok(column) = raw.parse::<usize>() {
        if column < 7 {
            return Ok(column);
        }
        bail!("Column {} out of range 0-6", column);
    }
    let date: NaiveDate = raw
        .parse()
        .with_context(|| format!("Column must be 0-6 or a date, got {raw}"))?;
    window
        .position(date)
        .with_context(|| format!("{date} is not in the week of {}", window.days()[0]))
}

async fn load(ctx: &Context) -> Result<PlanTable> {
    let store = ctx.store();
    if !store.exists() {
        bail!("No board found in {}. Run `mealboard init` first", store.dir().display());
    }
    store.table().await.context("Failed to load table")
}

async fn show(ctx: &Context, window: &WeekWindow) -> Result<()> {
    let table = load(ctx).await?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&table.sorted())?);
        return Ok(());
    }

    let header: Vec<String> = window
        .days()
        .iter()
        .map(|d| format!("{:<8}", d.format("%a").to_string()))
        .collect();
    let header = format!("{:<16}{}", "group", header.join(" ").trim_end());
    if ctx.color {
        println!("{}", header.bold());
    } else {
        println!("{header}");
    }
    for row in table.sorted() {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|c| format!("{:<8}", c.as_deref().unwrap_or("-")))
            .collect();
        println!("{:<16}{}", row.name, cells.join(" ").trim_end());
    }
    Ok(())
}

async fn reorder(ctx: &Context, active: &str, over: &str) -> Result<()> {
    let mut table = load(ctx).await?;
    let intents = table.reorder_rows(active, over)?;
    commit(ctx, &table, &intents).await
}

async fn switch(ctx: &Context, window: &WeekWindow, from: Cell<'_>, to: Cell<'_>) -> Result<()> {
    let mut table = load(ctx).await?;
    let intents: Vec<Intent> = table.switch_cells(window, from, to)?.into_iter().collect();
    commit(ctx, &table, &intents).await
}

/// Persist through the bridge first, then save the table
async fn commit(ctx: &Context, table: &PlanTable, intents: &[Intent]) -> Result<()> {
    if intents.is_empty() {
        println!("Nothing moved");
        return Ok(());
    }
    ctx.bridge()
        .send(intents)
        .await
        .context("Table change was not persisted")?;
    ctx.store().save_table(table).await.context("Failed to save table")?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(intents)?);
    } else {
        for intent in intents {
            println!("{intent}");
        }
    }
    Ok(())
}
