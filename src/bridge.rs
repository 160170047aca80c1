// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Mutation bridge: persists committed drops and snaps back on failure
//!
//! The board mutates optimistically. Once a drop is committed its intents are
//! sent to a [`MutationSurface`] in order. The first failing call stops the
//! batch; the bridge then refetches the visible week from the
//! [`ScheduleSource`] and rebuilds the board from it instead of undoing the
//! local move by hand.

use crate::engine::Board;
use crate::error::{BoardError, BoardResult, SurfaceError};
use crate::intents::{Intent, SwitchAssignment, UpdateOrder};
use crate::types::DaySchedule;
use crate::week::WeekWindow;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Read path: authoritative schedules for a week
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch every day schedule served inside `window`
    async fn fetch(&self, window: &WeekWindow) -> Result<Vec<DaySchedule>, SurfaceError>;
}

/// Write path: the two persistence operations
#[async_trait]
pub trait MutationSurface: Send + Sync {
    /// `updateOrder(containerId, orderIndex)`
    async fn update_order(&self, order: &UpdateOrder) -> Result<(), SurfaceError>;

    /// `switchAssignment(previousDay, previousContainerId, mealId, newDay, newContainerId, replacedMealId?)`
    async fn switch_assignment(&self, switch: &SwitchAssignment) -> Result<(), SurfaceError>;
}

/// Sends intents and reconciles the board on failure
#[derive(Clone)]
pub struct MutationBridge {
    surface: Arc<dyn MutationSurface>,
    source: Arc<dyn ScheduleSource>,
}

impl MutationBridge {
    /// Create a bridge over a write path and a read path
    pub fn new(surface: Arc<dyn MutationSurface>, source: Arc<dyn ScheduleSource>) -> Self {
        Self { surface, source }
    }

    /// Build a board for `window` from the read path
    pub async fn load(&self, window: WeekWindow) -> BoardResult<Board> {
        let schedules = self.source.fetch(&window).await.map_err(BoardError::Source)?;
        debug!("Loaded {} day schedules for week of {}", schedules.len(), window.days()[0]);
        Ok(Board::new(window, schedules))
    }

    /// Replace the board's contents with authoritative state
    pub async fn refresh(&self, board: &mut Board) -> BoardResult<()> {
        let schedules = self
            .source
            .fetch(board.window())
            .await
            .map_err(BoardError::Source)?;
        board.reload(schedules);
        Ok(())
    }

    /// Persist intents in order
    ///
    /// On the first failure the board snaps back to server truth and the
    /// failing intent is reported. If the refetch fails too, the fetch error
    /// is returned and the board keeps its optimistic state.
    pub async fn persist(&self, board: &mut Board, intents: &[Intent]) -> BoardResult<()> {
        match self.send(intents).await {
            Err(failure @ BoardError::PersistenceFailure { .. }) => {
                warn!("{}; refetching", failure);
                self.refresh(board).await?;
                info!("Board restored from authoritative schedules");
                Err(failure)
            }
            other => other,
        }
    }

    /// Send intents in order, stopping at the first rejected call
    pub async fn send(&self, intents: &[Intent]) -> BoardResult<()> {
        for intent in intents {
            let result = match intent {
                Intent::SwitchAssignment(switch) => self.surface.switch_assignment(switch).await,
                Intent::UpdateOrder(order) => self.surface.update_order(order).await,
            };
            if let Err(source) = result {
                return Err(BoardError::PersistenceFailure {
                    intent: Box::new(intent.clone()),
                    source,
                });
            }
            debug!("Persisted {}", intent);
        }
        Ok(())
    }
}

/// In-memory collaborator for tests and local runs
///
/// Serves a fixed set of schedules and records every mutation call. Calls
/// are recorded, not applied. Failures can be injected per call count or
/// for the whole surface.
#[derive(Clone)]
pub struct LocalSurface {
    data: Arc<Mutex<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    schedules: Vec<DaySchedule>,
    calls: Vec<Intent>,
    fail_at: Option<usize>,
    is_healthy: bool,
    fetches: usize,
}

impl LocalSurface {
    /// Create a healthy surface serving `schedules`
    #[must_use]
    pub fn new(schedules: Vec<DaySchedule>) -> Self {
        Self {
            data: Arc::new(Mutex::new(LocalData {
                schedules,
                is_healthy: true,
                ..Default::default()
            })),
        }
    }

    /// Reject the mutation call with this 0-based number
    pub async fn fail_at(&self, call: usize) {
        self.data.lock().await.fail_at = Some(call);
    }

    /// Toggle reachability of both paths
    pub async fn set_healthy(&self, healthy: bool) {
        self.data.lock().await.is_healthy = healthy;
    }

    /// Replace the authoritative schedules
    pub async fn set_schedules(&self, schedules: Vec<DaySchedule>) {
        self.data.lock().await.schedules = schedules;
    }

    /// Mutation calls received so far, including the rejected one
    pub async fn calls(&self) -> Vec<Intent> {
        self.data.lock().await.calls.clone()
    }

    /// Number of fetches served
    pub async fn fetches(&self) -> usize {
        self.data.lock().await.fetches
    }

    async fn record(&self, intent: Intent) -> Result<(), SurfaceError> {
        let mut data = self.data.lock().await;
        if !data.is_healthy {
            return Err(SurfaceError::Unavailable("local surface is offline".into()));
        }
        let call = data.calls.len();
        data.calls.push(intent);
        if data.fail_at == Some(call) {
            return Err(SurfaceError::Rejected(format!("call {call} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleSource for LocalSurface {
    async fn fetch(&self, window: &WeekWindow) -> Result<Vec<DaySchedule>, SurfaceError> {
        let mut data = self.data.lock().await;
        if !data.is_healthy {
            return Err(SurfaceError::Unavailable("local surface is offline".into()));
        }
        data.fetches += 1;
        Ok(data
            .schedules
            .iter()
            .filter(|d| window.contains(d.serving_date))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MutationSurface for LocalSurface {
    async fn update_order(&self, order: &UpdateOrder) -> Result<(), SurfaceError> {
        self.record(Intent::UpdateOrder(order.clone())).await
    }

    async fn switch_assignment(&self, switch: &SwitchAssignment) -> Result<(), SurfaceError> {
        self.record(Intent::SwitchAssignment(switch.clone())).await
    }
}
