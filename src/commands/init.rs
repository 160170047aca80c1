// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Init command implementation

use anyhow::{bail, Context as _, Result};

use super::Context;
use crate::store::BoardFile;

/// Create `board.json`, optionally filled with sample meals
pub async fn run(ctx: &Context, demo: bool, force: bool) -> Result<()> {
    let store = ctx.store();
    if store.exists() && !force {
        bail!(
            "Board already exists in {}. Use --force to overwrite",
            store.dir().display()
        );
    }

    let file = if demo { BoardFile::demo() } else { BoardFile::default() };
    store
        .save(&file)
        .await
        .with_context(|| format!("Failed to write board to {}", store.dir().display()))?;

    tracing::info!("Initialized board with {} days", file.days.len());
    println!("Initialized board in {}", store.dir().display());
    Ok(())
}
