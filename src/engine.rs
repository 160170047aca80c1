// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Drag reconciliation engine
//!
//! [`Board`] owns the local mirror of the day schedules and is the only
//! writer of the day-groups index. A gesture runs through two states, `Idle`
//! and `Dragging`. Moving over another day relocates the dragged unit at once
//! so the preview shows it in place; the schedules captured at drag start are
//! kept until the drop, so a cancel or an aborted drop restores them whole.
//!
//! Every mutation folds the touched lists back into schedules, regroups, and
//! publishes one new snapshot to subscribers.

use crate::codec::FlatId;
use crate::error::{BoardError, BoardResult};
use crate::index::{self, DayGroups};
use crate::intents::{self, Intent, Placement};
use crate::projection::{self, Projection, DEFAULT_INDENTATION_WIDTH};
use crate::types::{DayKey, DaySchedule, FlatEntry};
use crate::week::WeekWindow;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drag gesture state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    /// No active drag
    #[default]
    Idle,
    /// A drag is in progress
    Dragging(DragSession),
}

/// Everything tracked while a drag is in progress
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Flat id the drag started with
    pub origin_id: String,
    /// Current flat id of the dragged entry; changes when it is relocated
    pub active_id: String,
    /// Entry or day currently hovered
    pub hover_id: Option<String>,
    /// Horizontal pointer offset since drag start
    pub offset_x: f64,
    origin: Placement,
    origin_depth: u8,
    snapshot: Vec<DaySchedule>,
    relocated: bool,
    placed_over: Option<String>,
}

impl DragSession {
    fn is_for(&self, active_id: &str) -> bool {
        self.active_id == active_id || self.origin_id == active_id
    }

    /// Whether the last cross-day hover was a day column rather than an entry
    fn placed_on_column(&self) -> bool {
        self.placed_over
            .as_deref()
            .is_some_and(|hover| hover.parse::<DayKey>().is_ok())
    }
}

/// Result of a drop
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// The board changed; persist these intents
    Committed(Commit),
    /// Nothing moved
    Unchanged,
    /// The gesture was abandoned and the pre-drag schedules restored
    Aborted,
}

/// A committed gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    /// Where the dragged unit started
    pub from: Placement,
    /// Where it ended
    pub to: Placement,
    /// Calls the mutation bridge has to make
    pub intents: Vec<Intent>,
}

/// Where a hover id points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// The unit's current slot; only the depth follows the pointer
    InPlace,
    /// End of a day column
    Day(DayKey),
    /// The slot of an entry
    Entry { day: DayKey, index: usize },
}

/// A computed landing slot, before it is applied
struct Landing {
    source_day: DayKey,
    source_index: usize,
    day: DayKey,
    unit: Vec<FlatEntry>,
    /// Source list without the unit
    remaining: Vec<FlatEntry>,
    /// Destination list without the unit
    destination: Vec<FlatEntry>,
    at: usize,
    depth: u8,
    min_depth: u8,
    max_depth: u8,
}

impl Landing {
    fn is_noop(&self) -> bool {
        self.day == self.source_day && self.at == self.source_index && self.unit[0].depth == self.depth
    }

    fn projection(&self) -> Projection {
        let prev = self.at.checked_sub(1).and_then(|i| self.destination.get(i));
        Projection {
            depth: self.depth,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            parent_id: projection::parent_for(self.depth, prev),
        }
    }
}

/// The scheduling board: local schedules, derived index and drag state
pub struct Board {
    window: WeekWindow,
    schedules: Vec<DaySchedule>,
    groups: Arc<DayGroups>,
    drag: DragState,
    indentation_width: f64,
    observers: watch::Sender<Arc<DayGroups>>,
}

impl Board {
    /// Build a board for `window` from fetched schedules
    #[must_use]
    pub fn new(window: WeekWindow, schedules: Vec<DaySchedule>) -> Self {
        let groups = Arc::new(index::regroup(&schedules, &window));
        let (observers, _) = watch::channel(Arc::clone(&groups));
        Self {
            window,
            schedules,
            groups,
            drag: DragState::Idle,
            indentation_width: DEFAULT_INDENTATION_WIDTH,
            observers,
        }
    }

    /// Override the pixels-per-depth-level threshold
    #[must_use]
    pub fn with_indentation_width(mut self, width: f64) -> Self {
        self.indentation_width = width;
        self
    }

    /// Receive a new day-groups snapshot after every mutation
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<DayGroups>> {
        self.observers.subscribe()
    }

    /// Current day-key → flattened-list mapping
    #[must_use]
    pub fn regroup(&self) -> Arc<DayGroups> {
        Arc::clone(&self.groups)
    }

    /// Borrow the current mapping
    #[must_use]
    pub fn groups(&self) -> &DayGroups {
        &self.groups
    }

    /// Local mirror of the schedules, including days outside the window
    #[must_use]
    pub fn schedules(&self) -> &[DaySchedule] {
        &self.schedules
    }

    /// Visible week
    #[must_use]
    pub fn window(&self) -> &WeekWindow {
        &self.window
    }

    /// Current gesture state
    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.drag
    }

    /// Show another week; keys are recomputed from scratch
    pub fn set_week(&mut self, window: WeekWindow) {
        self.window = window;
        self.rebuild();
    }

    /// Replace the local mirror with authoritative schedules
    ///
    /// An in-flight drag is dropped: its snapshot no longer describes the
    /// board.
    pub fn reload(&mut self, schedules: Vec<DaySchedule>) {
        if matches!(self.drag, DragState::Dragging(_)) {
            warn!("Reload during a drag; gesture discarded");
            self.drag = DragState::Idle;
        }
        self.schedules = schedules;
        self.rebuild();
    }

    /// Preview depth and parent for the dragged entry
    ///
    /// Computed from the same landing slot a drop over the current hover
    /// would use, so the committed depth always equals the last preview.
    #[must_use]
    pub fn project(&self) -> Option<Projection> {
        let DragState::Dragging(session) = &self.drag else {
            return None;
        };
        let hover = session.hover_id.as_deref()?;
        let target = self.target_for(session, hover).ok()?;
        self.land(session, target).ok().map(|landing| landing.projection())
    }

    // =========================================================================
    // Drag handlers
    // =========================================================================

    /// Pointer picked up an entry
    pub fn on_drag_start(&mut self, active_id: &str) {
        if let DragState::Dragging(previous) = std::mem::take(&mut self.drag) {
            warn!("Drag started while {} was still active; restoring", previous.origin_id);
            self.restore(previous);
        }

        match self.begin(active_id) {
            Ok(session) => {
                debug!("Drag start: {}", active_id);
                self.drag = DragState::Dragging(session);
            }
            Err(e) => warn!("Ignoring drag start: {}", e),
        }
    }

    /// Pointer moved; only the offset changes
    pub fn on_drag_move(&mut self, delta_x: f64) {
        if let DragState::Dragging(session) = &mut self.drag {
            session.offset_x = delta_x;
        }
    }

    /// Pointer is over `hover_id`; crossing into another day relocates now
    pub fn on_drag_over(&mut self, active_id: &str, hover_id: Option<&str>) {
        let DragState::Dragging(mut session) = std::mem::take(&mut self.drag) else {
            return;
        };
        if !session.is_for(active_id) {
            debug!("Drag over for {} ignored; {} is active", active_id, session.active_id);
            self.drag = DragState::Dragging(session);
            return;
        }

        session.hover_id = hover_id.map(str::to_string);
        let Some(hover) = hover_id else {
            self.drag = DragState::Dragging(session);
            return;
        };

        match self.cross_day_preview(&session, hover) {
            Ok(Some(new_id)) => {
                session.active_id = new_id;
                session.relocated = true;
                session.placed_over = Some(hover.to_string());
                self.drag = DragState::Dragging(session);
            }
            Ok(None) => self.drag = DragState::Dragging(session),
            Err(e) if e.is_local() && !matches!(e, BoardError::MalformedIdentifier { .. }) => {
                debug!("Drag over ignored: {}", e);
                self.drag = DragState::Dragging(session);
            }
            Err(e) => {
                warn!("Drag aborted: {}", e);
                self.restore(session);
            }
        }
    }

    /// Pointer released over `hover_id`
    pub fn on_drag_end(&mut self, active_id: &str, hover_id: Option<&str>) -> DropOutcome {
        let DragState::Dragging(mut session) = std::mem::take(&mut self.drag) else {
            return DropOutcome::Unchanged;
        };
        if !session.is_for(active_id) {
            warn!("Drop for {} does not match active {}; aborting", active_id, session.active_id);
            self.restore(session);
            return DropOutcome::Aborted;
        }
        let Some(hover) = hover_id else {
            debug!("Dropped outside any target");
            self.restore(session);
            return DropOutcome::Aborted;
        };

        match self.drop_on(&session, hover) {
            Ok(active) => session.active_id = active,
            Err(e @ BoardError::MalformedIdentifier { .. }) => {
                warn!("Drop aborted: {}", e);
                self.restore(session);
                return DropOutcome::Aborted;
            }
            Err(e) => debug!("Drop ignored: {}", e),
        }

        self.finish(session)
    }

    /// Input layer interrupted the gesture
    pub fn on_drag_cancel(&mut self) {
        if let DragState::Dragging(session) = std::mem::take(&mut self.drag) {
            debug!("Drag cancelled: {}", session.origin_id);
            self.restore(session);
        }
    }

    // =========================================================================
    // Gesture internals
    // =========================================================================

    fn begin(&self, active_id: &str) -> BoardResult<DragSession> {
        FlatId::decode(active_id)?;
        let (day, position) = index::locate(&self.groups, active_id)
            .ok_or_else(|| BoardError::InvalidMove(format!("{active_id} is not on the board")))?;
        let origin = Placement::capture(&self.groups, day, position)
            .ok_or_else(|| BoardError::InvalidMove(format!("{active_id} vanished")))?;
        let origin_depth = self.groups[&day][position].depth;

        Ok(DragSession {
            origin_id: active_id.to_string(),
            active_id: active_id.to_string(),
            hover_id: Some(active_id.to_string()),
            offset_x: 0.0,
            origin,
            origin_depth,
            snapshot: self.schedules.clone(),
            relocated: false,
            placed_over: None,
        })
    }

    fn cross_day_preview(&mut self, session: &DragSession, hover: &str) -> BoardResult<Option<String>> {
        let target = self.target_for(session, hover)?;
        let target_day = match target {
            Target::InPlace => return Ok(None),
            Target::Day(day) | Target::Entry { day, .. } => day,
        };
        let (day, _) = self.locate_active(session)?;
        if day == target_day {
            return Ok(None);
        }
        debug!("Drag over {} crosses from {} to {}", hover, day, target_day);
        self.relocate(session, target).map(Some)
    }

    fn drop_on(&mut self, session: &DragSession, hover: &str) -> BoardResult<String> {
        let target = self.target_for(session, hover)?;
        self.relocate(session, target)
    }

    fn finish(&mut self, session: DragSession) -> DropOutcome {
        if self.schedules == session.snapshot {
            debug!("Drop left the board unchanged");
            return DropOutcome::Unchanged;
        }
        let to = self
            .locate_active(&session)
            .ok()
            .and_then(|(day, position)| Placement::capture(&self.groups, day, position));
        let Some(to) = to else {
            warn!("Dragged entry lost after drop; restoring");
            self.restore(session);
            return DropOutcome::Aborted;
        };

        let intents = intents::derive(&session.snapshot, &self.schedules, &session.origin, &to);
        info!("Committed drop of {} with {} intents", session.origin_id, intents.len());
        DropOutcome::Committed(Commit {
            from: session.origin,
            to,
            intents,
        })
    }

    fn restore(&mut self, session: DragSession) {
        if session.relocated || self.schedules != session.snapshot {
            self.schedules = session.snapshot;
            self.rebuild();
        }
    }

    /// Resolve a hover id for the running gesture
    ///
    /// The entry itself, and the target that already relocated it during a
    /// cross-day hover, both mean "stay in the current slot".
    fn target_for(&self, session: &DragSession, hover: &str) -> BoardResult<Target> {
        if hover == session.active_id || session.placed_over.as_deref() == Some(hover) {
            return Ok(Target::InPlace);
        }
        self.resolve(hover)
    }

    fn resolve(&self, hover: &str) -> BoardResult<Target> {
        if let Ok(day) = hover.parse::<DayKey>() {
            if self.groups.contains_key(&day) {
                return Ok(Target::Day(day));
            }
        }
        FlatId::decode(hover)?;
        index::locate(&self.groups, hover)
            .map(|(day, index)| Target::Entry { day, index })
            .ok_or_else(|| BoardError::InvalidMove(format!("{hover} is not on the board")))
    }

    fn locate_active(&self, session: &DragSession) -> BoardResult<(DayKey, usize)> {
        index::locate(&self.groups, &session.active_id)
            .ok_or_else(|| BoardError::InvalidMove(format!("{} is not on the board", session.active_id)))
    }

    /// Work out where the dragged unit lands for `target` without moving it
    ///
    /// Depth is the pointer offset applied to a base depth, clamped to the
    /// bounds of the landing slot. The base is the depth at drag start, or 0
    /// for a day column so a drop there lands top-level.
    fn land(&self, session: &DragSession, target: Target) -> BoardResult<Landing> {
        let (source_day, source_index) = self.locate_active(session)?;
        let source = &self.groups[&source_day];
        let len = index::unit_len(source, source_index);
        let is_container = source[source_index].is_container();

        let (day, hover_index) = match target {
            Target::InPlace => (source_day, None),
            Target::Day(day) => (day, None),
            Target::Entry { day, index } => (day, Some(index)),
        };
        let same_day = source_day == day;
        if let Some(i) = hover_index.filter(|&i| same_day && i != source_index) {
            if (source_index..source_index + len).contains(&i) {
                return Err(BoardError::InvalidMove(format!(
                    "{} cannot be dropped onto its own member",
                    source[source_index].flat_id
                )));
            }
        }

        let mut remaining: Vec<FlatEntry> = source.clone();
        let unit: Vec<FlatEntry> = remaining.drain(source_index..source_index + len).collect();
        let destination: Vec<FlatEntry> = if same_day {
            remaining.clone()
        } else {
            self.groups[&day].clone()
        };

        let moving_down = same_day && hover_index.is_some_and(|i| i > source_index);
        let mut at = match target {
            Target::InPlace => source_index,
            Target::Day(_) => destination.len(),
            Target::Entry { index, .. } if same_day && index == source_index => source_index,
            Target::Entry { index, .. } if moving_down => index + 1 - len,
            Target::Entry { index, .. } => index,
        };
        let keeps_slot = at == source_index && same_day;
        if is_container && !keeps_slot {
            // Never split another group from its members
            if moving_down || matches!(target, Target::Day(_)) {
                while destination.get(at).is_some_and(|e| e.depth > 0) {
                    at += 1;
                }
            } else {
                while at > 0 && destination.get(at).is_some_and(|e| e.depth > 0) {
                    at -= 1;
                }
            }
        }

        let base = match target {
            Target::Day(_) => 0,
            Target::InPlace if session.placed_on_column() => 0,
            _ => session.origin_depth,
        };
        let raw_depth = i64::from(base) + projection::drag_depth(session.offset_x, self.indentation_width);
        let (min_depth, max_depth) = projection::bounds(
            at.checked_sub(1).and_then(|i| destination.get(i)),
            destination.get(at),
            is_container,
        );
        let depth = projection::clamp_depth(raw_depth, if is_container { 0 } else { projection::MAX_DEPTH })
            .max(min_depth)
            .min(max_depth);

        Ok(Landing {
            source_day,
            source_index,
            day,
            unit,
            remaining,
            destination,
            at,
            depth,
            min_depth,
            max_depth,
        })
    }

    /// Move the dragged unit to `target`, returning its new flat id
    fn relocate(&mut self, session: &DragSession, target: Target) -> BoardResult<String> {
        let landing = self.land(session, target)?;
        if landing.is_noop() {
            return Ok(session.active_id.clone());
        }

        let Landing {
            source_day,
            day,
            mut unit,
            remaining,
            mut destination,
            at,
            depth,
            ..
        } = landing;
        unit[0].depth = depth;
        destination.splice(at..at, unit);

        let mut lists = vec![(day, destination)];
        if source_day != day {
            lists.push((source_day, remaining));
        }
        self.commit_lists(lists)?;

        let new_id = self.groups[&day]
            .get(at)
            .map(|e| e.flat_id.clone())
            .ok_or_else(|| BoardError::InvalidMove("dragged entry lost after move".into()))?;
        debug!("Moved {} to {}[{}] at depth {}", session.active_id, day, at, depth);
        Ok(new_id)
    }

    /// Fold reordered lists back into schedules and republish
    fn commit_lists(&mut self, lists: Vec<(DayKey, Vec<FlatEntry>)>) -> BoardResult<()> {
        let mut taken: HashSet<String> = self
            .schedules
            .iter()
            .flat_map(|d| d.items.iter().map(|i| i.id.clone()))
            .collect();

        let mut schedules = self.schedules.clone();
        for (day, entries) in lists {
            let day_id = schedules
                .iter()
                .find(|d| d.serving_date == day.date())
                .map_or_else(|| format!("day:{day}"), |d| d.id.clone());
            let rebuilt = index::unflatten(day, &day_id, &entries, &mut taken)?;

            match schedules.iter().position(|d| d.serving_date == day.date()) {
                Some(first) => {
                    schedules[first] = rebuilt;
                    let mut position = 0;
                    schedules.retain(|d| {
                        let keep = position <= first || d.serving_date != day.date();
                        position += 1;
                        keep
                    });
                }
                None => schedules.push(rebuilt),
            }
        }

        self.schedules = schedules;
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        let groups = index::regroup(&self.schedules, &self.window);
        if cfg!(debug_assertions) {
            for (day, entries) in &groups {
                if let Err(e) = index::validate(entries) {
                    warn!("Index for {} violates invariants: {}", day, e);
                }
            }
        }
        self.groups = Arc::new(groups);
        self.observers.send_replace(Arc::clone(&self.groups));
    }
}
