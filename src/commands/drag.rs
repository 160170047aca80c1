// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Drag command implementation

use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use serde::Serialize;

use super::{show, Context};
use crate::engine::{DragState, DropOutcome};
use crate::error::BoardError;
use crate::intents::Intent;

/// Arguments for one drag gesture
pub struct DragArgs {
    /// Flat id to pick up
    pub active: String,
    /// Flat id or day key to release over; `None` releases outside
    pub hover: Option<String>,
    /// Horizontal pointer offset in pixels
    pub offset: f64,
    /// Any date inside the week to load
    pub week: Option<NaiveDate>,
    /// Compute the outcome without persisting
    pub dry_run: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    outcome: &'static str,
    persisted: bool,
    intents: &'a [Intent],
}

/// Run start, move, over and end against the stored board
pub async fn run(ctx: &Context, args: DragArgs) -> Result<()> {
    let mut board = ctx.board(args.week).await?;

    board.on_drag_start(&args.active);
    if board.state() == &DragState::Idle {
        bail!("Cannot drag {}: not on the board for this week", args.active);
    }
    board.on_drag_move(args.offset);
    board.on_drag_over(&args.active, args.hover.as_deref());
    let outcome = board.on_drag_end(&args.active, args.hover.as_deref());

    let (label, intents) = match &outcome {
        DropOutcome::Committed(commit) => ("committed", commit.intents.as_slice()),
        DropOutcome::Unchanged => ("unchanged", &[][..]),
        DropOutcome::Aborted => ("aborted", &[][..]),
    };

    let mut persisted = false;
    if !intents.is_empty() && !args.dry_run {
        let bridge = ctx.bridge();
        match bridge.persist(&mut board, intents).await {
            Ok(()) => {
                ctx.store()
                    .save_week(board.window(), board.schedules())
                    .await
                    .context("Failed to save board")?;
                persisted = true;
            }
            Err(e @ BoardError::PersistenceFailure { .. }) => {
                return Err(e).context("Drop was rolled back to the stored board");
            }
            Err(e) => return Err(e).context("Failed to persist drop"),
        }
    }

    if ctx.json {
        let report = Report {
            outcome: label,
            persisted,
            intents,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Drop {}", label);
    for intent in intents {
        println!("  {}", intent);
    }
    if args.dry_run && !intents.is_empty() {
        println!("(dry run, nothing persisted)");
    }
    print!("{}", show::render(board.groups(), ctx.color));
    Ok(())
}
