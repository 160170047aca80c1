// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Persistence and snap-back tests for the mutation bridge

use chrono::NaiveDate;
use mealboard::bridge::{LocalSurface, MutationBridge, ScheduleSource};
use mealboard::engine::DropOutcome;
use mealboard::error::{BoardError, SurfaceError};
use mealboard::intents::Intent;
use mealboard::store::{BoardFile, JsonStore};
use mealboard::types::DayKey;
use mealboard::week::WeekWindow;
use std::sync::Arc;
use tempfile::TempDir;

fn week() -> WeekWindow {
    WeekWindow::starting(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
}

fn local_bridge() -> (LocalSurface, MutationBridge) {
    let surface = LocalSurface::new(BoardFile::demo().days);
    let bridge = MutationBridge::new(Arc::new(surface.clone()), Arc::new(surface.clone()));
    (surface, bridge)
}

fn commit_of(outcome: DropOutcome) -> Vec<Intent> {
    match outcome {
        DropOutcome::Committed(commit) => commit.intents,
        other => panic!("expected a commit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_persist_sends_intents_in_order() {
    let (surface, bridge) = local_bridge();
    let mut board = bridge.load(week()).await.unwrap();

    board.on_drag_start("schedule1#meal1");
    let intents = commit_of(board.on_drag_end("schedule1#meal1", Some("2024-01-02")));
    bridge.persist(&mut board, &intents).await.unwrap();

    assert_eq!(surface.calls().await, intents);
    assert!(matches!(surface.calls().await[0], Intent::SwitchAssignment(_)));
    // Success keeps the optimistic state
    assert_eq!(board.groups()[&DayKey(week().days()[1])].len(), 6);
    assert_eq!(surface.fetches().await, 1);
}

#[tokio::test]
async fn test_failure_snaps_back_to_source() {
    let (surface, bridge) = local_bridge();
    let mut board = bridge.load(week()).await.unwrap();
    let authoritative = board.regroup();
    surface.fail_at(0).await;

    board.on_drag_start("schedule3#group1");
    let intents = commit_of(board.on_drag_end("schedule3#group1", Some("2024-01-02")));
    assert_ne!(*board.regroup(), *authoritative);

    let err = bridge.persist(&mut board, &intents).await.unwrap_err();
    match err {
        BoardError::PersistenceFailure { intent, source } => {
            assert_eq!(*intent, intents[0]);
            assert!(matches!(source, SurfaceError::Rejected(_)));
        }
        other => panic!("expected persistence failure, got {other:?}"),
    }

    assert_eq!(*board.regroup(), *authoritative);
    assert_eq!(surface.fetches().await, 2);
    assert_eq!(surface.calls().await.len(), 1);
}

#[tokio::test]
async fn test_failed_refetch_reports_source_error() {
    let (surface, bridge) = local_bridge();
    let mut board = bridge.load(week()).await.unwrap();
    surface.set_healthy(false).await;

    board.on_drag_start("schedule1#meal1");
    let intents = commit_of(board.on_drag_end("schedule1#meal1", Some("schedule2#meal2")));
    let err = bridge.persist(&mut board, &intents).await.unwrap_err();

    assert!(matches!(err, BoardError::Source(SurfaceError::Unavailable(_))));
}

#[tokio::test]
async fn test_refresh_picks_up_new_truth() {
    let (surface, bridge) = local_bridge();
    let mut board = bridge.load(week()).await.unwrap();
    let mut rx = board.subscribe();

    let mut days = BoardFile::demo().days;
    days.truncate(1);
    surface.set_schedules(days).await;
    bridge.refresh(&mut board).await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update()[&DayKey(week().days()[1])].is_empty());
}

#[tokio::test]
async fn test_json_store_roundtrip_through_bridge() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(JsonStore::new(temp.path()));
    store.save(&BoardFile::demo()).await.unwrap();
    let bridge = MutationBridge::new(store.clone(), store.clone());

    let mut board = bridge.load(week()).await.unwrap();
    board.on_drag_start("schedule2#meal2");
    let intents = commit_of(board.on_drag_end("schedule2#meal2", Some("schedule1#meal1")));
    bridge.persist(&mut board, &intents).await.unwrap();
    store.save_week(board.window(), board.schedules()).await.unwrap();

    let journal = store.journal().await.unwrap();
    assert_eq!(journal.len(), intents.len());
    assert_eq!(journal[0].id, intents[0].generate_id());

    let reloaded = store.fetch(&week()).await.unwrap();
    assert_eq!(reloaded[0].items[0].id, "schedule2");
    assert_eq!(reloaded[0].items[1].id, "schedule1");
}
