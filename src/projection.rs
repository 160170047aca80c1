// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Drag projection: where the dragged entry would land if dropped now
//!
//! The projection is advisory. It reads a flattened list and never mutates
//! it; callers recompute it on every pointer move.

use crate::types::FlatEntry;
use serde::Serialize;

/// Horizontal pointer travel, in pixels, that changes the depth by one level
pub const DEFAULT_INDENTATION_WIDTH: f64 = 50.0;

/// Containers nest exactly one level
pub const MAX_DEPTH: u8 = 1;

/// Projected landing depth and parent of the dragged entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// Depth the entry would take
    pub depth: u8,
    /// Shallowest depth allowed at the hover position
    pub min_depth: u8,
    /// Deepest depth allowed at the hover position
    pub max_depth: u8,
    /// Container the entry would join (depth 1 only)
    pub parent_id: Option<String>,
}

/// Depth levels travelled for a horizontal offset, rounded half up
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn drag_depth(offset_x: f64, indentation_width: f64) -> i64 {
    if !offset_x.is_finite() || indentation_width <= 0.0 {
        return 0;
    }
    (offset_x / indentation_width + 0.5).floor() as i64
}

/// Clamp a raw depth into `[0, cap]`
#[must_use]
pub fn clamp_depth(raw: i64, cap: u8) -> u8 {
    u8::try_from(raw.clamp(0, i64::from(cap))).unwrap_or(0)
}

/// Depth bounds imposed by the neighbours of a landing position
///
/// An entry may nest one level below a container or a group member that
/// precedes it, never below a standalone meal. It may not be shallower than
/// the entry that follows it. When the two bounds disagree the maximum wins.
#[must_use]
pub fn bounds(prev: Option<&FlatEntry>, next: Option<&FlatEntry>, is_container: bool) -> (u8, u8) {
    let cap = if is_container { 0 } else { MAX_DEPTH };
    let max_depth = prev
        .map_or(0, |p| if p.is_container() || p.depth > 0 { p.depth + 1 } else { 0 })
        .min(cap);
    let min_depth = next.map_or(0, |n| n.depth).min(cap);
    (min_depth, max_depth)
}

/// Nearest enclosing container for an entry landing after `prev` at `depth`
#[must_use]
pub fn parent_for(depth: u8, prev: Option<&FlatEntry>) -> Option<String> {
    if depth == 0 {
        return None;
    }
    let prev = prev?;
    if depth <= prev.depth {
        prev.parent_id.clone()
    } else {
        Some(prev.flat_id.clone())
    }
}

/// Compute the projection for an active drag
///
/// Returns `None` when there is no active drag, when either id is not in
/// `entries`, or when a container hovers over one of its own members.
#[must_use]
pub fn project(
    entries: &[FlatEntry],
    offset_x: f64,
    active_id: Option<&str>,
    hover_id: Option<&str>,
    indentation_width: f64,
) -> Option<Projection> {
    let (active_id, hover_id) = (active_id?, hover_id?);
    let active = entries.iter().find(|e| e.flat_id == active_id)?;
    let is_container = active.is_container();

    // A dragged container hides its own members
    let items: Vec<&FlatEntry> = entries
        .iter()
        .filter(|e| !(is_container && e.parent_id.as_deref() == Some(active_id)))
        .collect();
    let active_index = items.iter().position(|e| e.flat_id == active_id)?;
    let hover_index = items.iter().position(|e| e.flat_id == hover_id)?;

    let mut moved = items;
    let dragged = moved.remove(active_index);
    moved.insert(hover_index, dragged);

    let prev = hover_index.checked_sub(1).and_then(|i| moved.get(i)).copied();
    let next = moved.get(hover_index + 1).copied();

    let cap = if is_container { 0 } else { MAX_DEPTH };
    let projected = clamp_depth(
        i64::from(active.depth) + drag_depth(offset_x, indentation_width),
        cap,
    );
    let (min_depth, max_depth) = bounds(prev, next, is_container);
    let depth = projected.max(min_depth).min(max_depth);

    Some(Projection {
        depth,
        min_depth,
        max_depth,
        parent_id: parent_for(depth, prev),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::flatten;
    use crate::types::{DaySchedule, Group, Meal, ScheduleItem};
    use chrono::NaiveDate;

    fn entries() -> Vec<FlatEntry> {
        flatten(&DaySchedule {
            id: "day1".into(),
            serving_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            items: vec![
                ScheduleItem::meal("s1", Meal::new("m1", "pizza")),
                ScheduleItem::meal("s2", Meal::new("m2", "bread")),
                ScheduleItem::group(
                    "s3",
                    Group {
                        id: "g1".into(),
                        name: "breakfast".into(),
                        meals: vec![Meal::new("m3", "tea"), Meal::new("m4", "sandwich")],
                    },
                ),
            ],
        })
    }

    #[test]
    fn test_drag_depth_rounds_half_up() {
        assert_eq!(drag_depth(24.0, 50.0), 0);
        assert_eq!(drag_depth(25.0, 50.0), 1);
        assert_eq!(drag_depth(-25.0, 50.0), 0);
        assert_eq!(drag_depth(-26.0, 50.0), -1);
        assert_eq!(drag_depth(f64::NAN, 50.0), 0);
    }

    #[test]
    fn test_no_active_drag() {
        let entries = entries();
        assert!(project(&entries, 0.0, None, Some("s1#m1"), 50.0).is_none());
        assert!(project(&entries, 0.0, Some("s1#m1"), None, 50.0).is_none());
        assert!(project(&entries, 0.0, Some("nope"), Some("s1#m1"), 50.0).is_none());
    }

    #[test]
    fn test_standalone_meal_cannot_become_parent() {
        let entries = entries();
        // bread dragged right while hovering itself: preceded by pizza
        let p = project(&entries, 200.0, Some("s2#m2"), Some("s2#m2"), 50.0).unwrap();
        assert_eq!(p.depth, 0);
        assert_eq!(p.max_depth, 0);
        assert_eq!(p.parent_id, None);
    }

    #[test]
    fn test_nest_into_group() {
        let entries = entries();
        // pizza dragged onto the sandwich slot and to the right
        let p = project(&entries, 60.0, Some("s1#m1"), Some("s3#m4#1"), 50.0).unwrap();
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id.as_deref(), Some("s3#g1"));
    }

    #[test]
    fn test_member_forced_to_stay_nested() {
        let entries = entries();
        // sandwich dragged left onto tea: sandwich lands between container and tea
        let p = project(&entries, -100.0, Some("s3#m4#1"), Some("s3#m3#0"), 50.0).unwrap();
        assert_eq!(p.min_depth, 1);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id.as_deref(), Some("s3#g1"));
    }

    #[test]
    fn test_member_can_leave_group_at_end() {
        let entries = entries();
        let p = project(&entries, -60.0, Some("s3#m4#1"), Some("s3#m4#1"), 50.0).unwrap();
        assert_eq!(p.depth, 0);
        assert_eq!(p.parent_id, None);
    }

    #[test]
    fn test_container_stays_top_level() {
        let entries = entries();
        let p = project(&entries, 300.0, Some("s3#g1"), Some("s2#m2"), 50.0).unwrap();
        assert_eq!(p.depth, 0);
        assert_eq!(p.max_depth, 0);
    }

    #[test]
    fn test_container_over_own_member_rejected() {
        let entries = entries();
        assert!(project(&entries, 0.0, Some("s3#g1"), Some("s3#m3#0"), 50.0).is_none());
    }
}
