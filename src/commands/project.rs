// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project command implementation

use anyhow::{bail, Result};
use chrono::NaiveDate;

use super::Context;
use crate::engine::DragState;

/// Preview where `active` would land while hovering `hover`
///
/// The board is loaded, dragged and thrown away; nothing is persisted.
pub async fn run(ctx: &Context, active: &str, hover: &str, offset: f64, week: Option<NaiveDate>) -> Result<()> {
    let mut board = ctx.board(week).await?;

    board.on_drag_start(active);
    if board.state() == &DragState::Idle {
        bail!("Cannot drag {}: not on the board for this week", active);
    }
    board.on_drag_move(offset);
    board.on_drag_over(active, Some(hover));

    let projection = board.project();
    board.on_drag_cancel();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
        return Ok(());
    }
    match projection {
        Some(p) => {
            println!("depth: {} (allowed {}..={})", p.depth, p.min_depth, p.max_depth);
            println!("parent: {}", p.parent_id.as_deref().unwrap_or("-"));
        }
        None => println!("No projection for {} over {}", active, hover),
    }
    Ok(())
}
