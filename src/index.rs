// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Schedule index: day schedules flattened into ordered, depth-annotated lists
//!
//! Flattened lists are pure projections of the day schedules. They are
//! regenerated after every change and never patched in place; a reordered
//! list is folded back into schedules with [`unflatten`] and flattened again.

use crate::codec::FlatId;
use crate::error::{BoardError, BoardResult};
use crate::types::{Assignment, DayKey, DaySchedule, EntrySource, FlatEntry, Group, ScheduleItem};
use crate::week::WeekWindow;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

/// Day key → flattened entries, one key per visible day
pub type DayGroups = BTreeMap<DayKey, Vec<FlatEntry>>;

/// Flatten one day into containers, members and plain meals
#[must_use]
pub fn flatten(day: &DaySchedule) -> Vec<FlatEntry> {
    let mut entries = Vec::with_capacity(day.items.iter().map(ScheduleItem::flat_len).sum());
    for item in &day.items {
        push_item(&mut entries, item);
    }
    entries
}

fn push_item(entries: &mut Vec<FlatEntry>, item: &ScheduleItem) {
    match &item.assignment {
        Assignment::Meal(meal) => entries.push(FlatEntry {
            flat_id: FlatId::child(&item.id, &meal.id).encode(),
            schedule_id: item.id.clone(),
            source: EntrySource::Meal { meal: meal.clone() },
            parent_id: None,
            depth: 0,
            index: entries.len(),
        }),
        Assignment::Group(group) => {
            let container_id = FlatId::child(&item.id, &group.id).encode();
            entries.push(FlatEntry {
                flat_id: container_id.clone(),
                schedule_id: item.id.clone(),
                source: EntrySource::Container {
                    group_id: group.id.clone(),
                    name: group.name.clone(),
                },
                parent_id: None,
                depth: 0,
                index: entries.len(),
            });
            for (position, meal) in group.meals.iter().enumerate() {
                entries.push(FlatEntry {
                    flat_id: FlatId::member(&item.id, &meal.id, position).encode(),
                    schedule_id: item.id.clone(),
                    source: EntrySource::Member {
                        group_id: group.id.clone(),
                        meal: meal.clone(),
                        position,
                    },
                    parent_id: Some(container_id.clone()),
                    depth: 1,
                    index: entries.len(),
                });
            }
        }
    }
}

/// Build the day-key mapping for the visible window
///
/// Every day of `window` gets a key, even when no schedule exists for it.
/// Schedules outside the window are dropped. Several schedules sharing a
/// serving date are concatenated in input order.
#[must_use]
pub fn regroup(schedules: &[DaySchedule], window: &WeekWindow) -> DayGroups {
    let mut groups: DayGroups = window.keys().map(|key| (key, Vec::new())).collect();
    for day in schedules {
        if let Some(entries) = groups.get_mut(&DayKey(day.serving_date)) {
            for item in &day.items {
                push_item(entries, item);
            }
        }
    }
    groups
}

/// Fold a (possibly reordered) flattened list back into a day schedule
///
/// Depth decides structure: a container opens a group, depth-1 entries join
/// the most recent group, and depth-0 meals are standalone items. A group
/// member promoted to depth 0 receives a derived schedule id that is not in
/// `taken`; every id used is added to `taken`.
pub fn unflatten(
    key: DayKey,
    day_id: &str,
    entries: &[FlatEntry],
    taken: &mut HashSet<String>,
) -> BoardResult<DaySchedule> {
    let mut items: Vec<ScheduleItem> = Vec::new();

    for entry in entries {
        match (&entry.source, entry.depth) {
            (EntrySource::Container { group_id, name }, 0) => {
                items.push(ScheduleItem::group(
                    entry.schedule_id.clone(),
                    Group {
                        id: group_id.clone(),
                        name: name.clone(),
                        meals: Vec::new(),
                    },
                ));
            }
            (EntrySource::Meal { meal } | EntrySource::Member { meal, .. }, 1) => {
                match items.last_mut().map(|item| &mut item.assignment) {
                    Some(Assignment::Group(group)) => group.meals.push(meal.clone()),
                    _ => {
                        return Err(BoardError::InvalidMove(format!(
                            "{} is nested but does not follow a group",
                            entry.flat_id
                        )))
                    }
                }
            }
            (EntrySource::Meal { meal }, 0) => {
                items.push(ScheduleItem::meal(entry.schedule_id.clone(), meal.clone()));
            }
            (EntrySource::Member { meal, position, .. }, 0) => {
                let id = derive_schedule_id(key, &entry.schedule_id, &meal.id, *position, taken);
                items.push(ScheduleItem::meal(id, meal.clone()));
            }
            (_, depth) => {
                return Err(BoardError::InvalidMove(format!(
                    "{} cannot sit at depth {depth}",
                    entry.flat_id
                )))
            }
        }
    }

    Ok(DaySchedule {
        id: day_id.to_string(),
        serving_date: key.date(),
        items,
    })
}

/// Deterministic id for a meal pulled out of a group
fn derive_schedule_id(
    key: DayKey,
    origin: &str,
    meal_id: &str,
    position: usize,
    taken: &mut HashSet<String>,
) -> String {
    let mut salt = 0u32;
    loop {
        let mut hasher = Sha256::new();
        hasher.update(key.to_string().as_bytes());
        hasher.update(origin.as_bytes());
        hasher.update(meal_id.as_bytes());
        hasher.update(position.to_le_bytes());
        hasher.update(salt.to_le_bytes());
        let hash = hex::encode(hasher.finalize());
        let id = format!("schedule:{}", &hash[..12]);
        if taken.insert(id.clone()) {
            return id;
        }
        salt += 1;
    }
}

/// Find the day and position of a flat id
#[must_use]
pub fn locate(groups: &DayGroups, flat_id: &str) -> Option<(DayKey, usize)> {
    groups.iter().find_map(|(key, entries)| {
        entries
            .iter()
            .position(|e| e.flat_id == flat_id)
            .map(|index| (*key, index))
    })
}

/// Number of entries that move together with the entry at `index`
///
/// A container drags its contiguous members along; anything else moves alone.
#[must_use]
pub fn unit_len(entries: &[FlatEntry], index: usize) -> usize {
    match entries.get(index) {
        Some(head) if head.is_container() => {
            1 + entries[index + 1..]
                .iter()
                .take_while(|e| e.parent_id.as_deref() == Some(head.flat_id.as_str()))
                .count()
        }
        Some(_) => 1,
        None => 0,
    }
}

/// Check the structural invariants of one flattened list
pub fn validate(entries: &[FlatEntry]) -> BoardResult<()> {
    let mut seen = HashSet::new();
    let mut open_container: Option<&str> = None;

    for (position, entry) in entries.iter().enumerate() {
        let broken = |reason: String| Err(BoardError::InvalidMove(format!("{}: {reason}", entry.flat_id)));

        if !seen.insert(entry.flat_id.as_str()) {
            return broken("duplicate flat id".into());
        }
        if entry.index != position {
            return broken(format!("index {} at position {position}", entry.index));
        }
        match entry.depth {
            0 => {
                if entry.parent_id.is_some() {
                    return broken("top-level entry has a parent".into());
                }
                open_container = entry.is_container().then_some(entry.flat_id.as_str());
            }
            1 => {
                if entry.is_container() {
                    return broken("container nested in a container".into());
                }
                if open_container.is_none() || entry.parent_id.as_deref() != open_container {
                    return broken("member is not contiguous with its container".into());
                }
            }
            depth => return broken(format!("depth {depth} exceeds 1")),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Meal;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn day_one() -> DaySchedule {
        DaySchedule {
            id: "day1".into(),
            serving_date: date(1),
            items: vec![
                ScheduleItem::meal("schedule1", Meal::new("meal1", "pizza")),
                ScheduleItem::meal("schedule2", Meal::new("meal2", "bread")),
                ScheduleItem::group(
                    "schedule3",
                    Group {
                        id: "group1".into(),
                        name: "breakfast".into(),
                        meals: vec![Meal::new("meal3", "tea"), Meal::new("meal4", "sandwich")],
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_flatten_shape() {
        let entries = flatten(&day_one());
        let ids: Vec<&str> = entries.iter().map(|e| e.flat_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["schedule1#meal1", "schedule2#meal2", "schedule3#group1", "schedule3#meal3#0", "schedule3#meal4#1"]
        );
        assert!(entries[2].is_container());
        assert_eq!(entries[3].parent_id.as_deref(), Some("schedule3#group1"));
        assert_eq!(entries[4].depth, 1);
        validate(&entries).unwrap();
    }

    #[test]
    fn test_regroup_keys_follow_window() {
        let mut outside = day_one();
        outside.serving_date = date(20);
        let window = WeekWindow::starting(date(1));
        let groups = regroup(&[day_one(), outside], &window);

        assert_eq!(groups.len(), 7);
        assert_eq!(groups[&DayKey(date(1))].len(), 5);
        assert!(groups[&DayKey(date(2))].is_empty());
        assert!(!groups.contains_key(&DayKey(date(20))));
    }

    #[test]
    fn test_unflatten_roundtrip() {
        let day = day_one();
        let mut taken = HashSet::new();
        let rebuilt = unflatten(DayKey(day.serving_date), &day.id, &flatten(&day), &mut taken).unwrap();
        assert_eq!(rebuilt, day);
    }

    #[test]
    fn test_unflatten_promotes_member() {
        let day = day_one();
        let mut entries = flatten(&day);
        entries[4].depth = 0;
        entries[4].parent_id = None;

        let mut taken: HashSet<String> = ["schedule1", "schedule2", "schedule3"].map(String::from).into();
        let rebuilt = unflatten(DayKey(day.serving_date), &day.id, &entries, &mut taken).unwrap();

        assert_eq!(rebuilt.items.len(), 4);
        let promoted = &rebuilt.items[3];
        assert!(promoted.id.starts_with("schedule:"));
        assert_eq!(promoted.assignment, Assignment::Meal(Meal::new("meal4", "sandwich")));
        assert!(taken.contains(&promoted.id));
    }

    #[test]
    fn test_unflatten_rejects_orphan_member() {
        let day = day_one();
        let mut entries = flatten(&day);
        entries[0].depth = 1;
        let err = unflatten(DayKey(day.serving_date), &day.id, &entries, &mut HashSet::new()).unwrap_err();
        assert!(matches!(err, BoardError::InvalidMove(_)));
    }

    #[test]
    fn test_unit_len() {
        let entries = flatten(&day_one());
        assert_eq!(unit_len(&entries, 0), 1);
        assert_eq!(unit_len(&entries, 2), 3);
        assert_eq!(unit_len(&entries, 3), 1);
        assert_eq!(unit_len(&entries, 9), 0);
    }

    #[test]
    fn test_locate() {
        let window = WeekWindow::starting(date(1));
        let groups = regroup(&[day_one()], &window);
        assert_eq!(locate(&groups, "schedule3#meal3#0"), Some((DayKey(date(1)), 3)));
        assert_eq!(locate(&groups, "missing"), None);
    }
}
