// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Persistence intents derived from a committed drop
//!
//! Intents are a pure function of the schedules before and after a gesture
//! plus where the dragged unit started and ended. Order of the returned
//! intents is deterministic: assignment switches first, then order updates
//! day by day in display order.

use crate::codec::FlatId;
use crate::index::DayGroups;
use crate::types::{Assignment, DayKey, DaySchedule, EntrySource};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Move a meal from one day/container to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchAssignment {
    /// Day the meal was on
    pub previous_day: DayKey,
    /// Group the meal was in (`None` for a standalone meal)
    pub previous_container_id: Option<String>,
    /// The moved meal
    pub meal_id: String,
    /// Day the meal is on now
    pub new_day: DayKey,
    /// Group the meal is in now
    pub new_container_id: Option<String>,
    /// Meal that occupied the destination and went back to the source
    pub replaced_meal_id: Option<String>,
}

/// Persist the display rank of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrder {
    /// Day the item is on; weekly table rows have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<DayKey>,
    /// Schedule item id, `scheduleId#mealId` for a group member, or a table row id
    pub container_id: String,
    /// New rank, 0-based
    pub order_index: usize,
}

/// One call the mutation bridge has to make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Intent {
    /// `switchAssignment(...)`
    SwitchAssignment(SwitchAssignment),
    /// `updateOrder(containerId, orderIndex)`
    UpdateOrder(UpdateOrder),
}

impl Intent {
    /// Deterministic id for journaling
    #[must_use]
    pub fn generate_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_string().as_bytes());
        let hash = hex::encode(hasher.finalize());
        format!("intent:{}", &hash[..8])
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwitchAssignment(s) => {
                write!(
                    f,
                    "switch {} {}/{} -> {}/{}",
                    s.meal_id,
                    s.previous_day,
                    s.previous_container_id.as_deref().unwrap_or("-"),
                    s.new_day,
                    s.new_container_id.as_deref().unwrap_or("-"),
                )?;
                if let Some(replaced) = &s.replaced_meal_id {
                    write!(f, " (swap {replaced})")?;
                }
                Ok(())
            }
            Self::UpdateOrder(o) => match o.day {
                Some(day) => write!(f, "order {} on {} = {}", o.container_id, day, o.order_index),
                None => write!(f, "order {} = {}", o.container_id, o.order_index),
            },
        }
    }
}

/// What was dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    /// A single meal, standalone or group member
    Meal {
        /// Meal id
        meal_id: String,
    },
    /// A group container with its members
    Group {
        /// Group id
        group_id: String,
        /// Member meal ids in order
        meal_ids: Vec<String>,
    },
}

/// Where the dragged unit sits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Day-group key
    pub day: DayKey,
    /// Enclosing group for a member meal
    pub container_id: Option<String>,
    /// The unit itself
    pub subject: Subject,
}

impl Placement {
    /// Describe the entry at `index` of day `day`
    #[must_use]
    pub fn capture(groups: &DayGroups, day: DayKey, index: usize) -> Option<Self> {
        let entries = groups.get(&day)?;
        let entry = entries.get(index)?;
        let (container_id, subject) = match &entry.source {
            EntrySource::Meal { meal } => (None, Subject::Meal { meal_id: meal.id.clone() }),
            EntrySource::Member { group_id, meal, .. } => (
                Some(group_id.clone()),
                Subject::Meal { meal_id: meal.id.clone() },
            ),
            EntrySource::Container { group_id, .. } => {
                let meal_ids = entries[index + 1..]
                    .iter()
                    .take_while(|e| e.parent_id.as_deref() == Some(entry.flat_id.as_str()))
                    .filter_map(|e| e.meal().map(|m| m.id.clone()))
                    .collect();
                (
                    Some(group_id.clone()),
                    Subject::Group {
                        group_id: group_id.clone(),
                        meal_ids,
                    },
                )
            }
        };
        Some(Self {
            day,
            container_id,
            subject,
        })
    }
}

/// Derive the intents for one committed gesture
///
/// Switches come first, one per moved meal, followed by rank updates for
/// every item whose rank changed on the affected days. A group with no meals
/// yields no switch; its schedule item is new on the destination day, so its
/// rank update there carries the day change.
#[must_use]
pub fn derive(before: &[DaySchedule], after: &[DaySchedule], from: &Placement, to: &Placement) -> Vec<Intent> {
    let mut intents = switches(from, to);

    let days: BTreeSet<DayKey> = [from.day, to.day].into_iter().collect();
    for day in days {
        let previous: HashMap<String, usize> = order_ranks(before, day).into_iter().collect();
        for (container_id, order_index) in order_ranks(after, day) {
            if previous.get(&container_id) != Some(&order_index) {
                intents.push(Intent::UpdateOrder(UpdateOrder {
                    day: Some(day),
                    container_id,
                    order_index,
                }));
            }
        }
    }

    intents
}

fn switches(from: &Placement, to: &Placement) -> Vec<Intent> {
    match (&from.subject, &to.subject) {
        (Subject::Meal { meal_id }, Subject::Meal { .. }) => {
            if from.day == to.day && from.container_id == to.container_id {
                return Vec::new();
            }
            vec![Intent::SwitchAssignment(SwitchAssignment {
                previous_day: from.day,
                previous_container_id: from.container_id.clone(),
                meal_id: meal_id.clone(),
                new_day: to.day,
                new_container_id: to.container_id.clone(),
                replaced_meal_id: None,
            })]
        }
        (Subject::Group { meal_ids, .. }, Subject::Group { .. }) if from.day != to.day => meal_ids
            .iter()
            .map(|meal_id| {
                Intent::SwitchAssignment(SwitchAssignment {
                    previous_day: from.day,
                    previous_container_id: from.container_id.clone(),
                    meal_id: meal_id.clone(),
                    new_day: to.day,
                    new_container_id: to.container_id.clone(),
                    replaced_meal_id: None,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Ranks of top-level items and of group members on one day
fn order_ranks(schedules: &[DaySchedule], day: DayKey) -> Vec<(String, usize)> {
    let mut ranks = Vec::new();
    let items = schedules
        .iter()
        .filter(|d| d.serving_date == day.date())
        .flat_map(|d| d.items.iter());
    for (rank, item) in items.enumerate() {
        ranks.push((item.id.clone(), rank));
        if let Assignment::Group(group) = &item.assignment {
            for (position, meal) in group.meals.iter().enumerate() {
                ranks.push((FlatId::child(&item.id, &meal.id).encode(), position));
            }
        }
    }
    ranks
}
