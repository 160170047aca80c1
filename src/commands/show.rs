// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Show command implementation

use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use std::fmt::Write as _;

use super::Context;
use crate::index::DayGroups;

/// Print the day groups of one week
pub async fn run(ctx: &Context, week: Option<NaiveDate>) -> Result<()> {
    let board = ctx.board(week).await?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(board.groups())?);
    } else {
        print!("{}", render(board.groups(), ctx.color));
    }
    Ok(())
}

/// Indented text rendering: one heading per day, members one level deeper
#[must_use]
pub fn render(groups: &DayGroups, color: bool) -> String {
    let mut out = String::new();
    for (day, entries) in groups {
        let heading = format!("{} {}", day, day.date().format("%a"));
        if color {
            let _ = writeln!(out, "{}", heading.bold());
        } else {
            let _ = writeln!(out, "{heading}");
        }

        if entries.is_empty() {
            let _ = writeln!(out, "  -");
            continue;
        }
        for entry in entries {
            let indent = "  ".repeat(usize::from(entry.depth) + 1);
            let label = if entry.is_container() {
                format!("[{}]", entry.label())
            } else {
                entry.label().to_string()
            };
            if color {
                let _ = writeln!(out, "{indent}{}  {}", label, entry.flat_id.dimmed());
            } else {
                let _ = writeln!(out, "{indent}{label}  {}", entry.flat_id);
            }
        }
    }
    out
}
