// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Mealboard library - weekly meal planning with drag-and-drop scheduling
//!
//! This crate provides the in-memory scheduling core of a meal-plan board:
//! the flat identifier codec, the per-day schedule index, the drag projection
//! and the drag reconciliation state machine, plus the bridge that turns a
//! committed drop into persistence intents.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod codec;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod intents;
pub mod projection;
pub mod store;
pub mod table;
pub mod week;

/// Core data types for the meal board
pub mod types {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::str::FromStr;

    // =========================================================================
    // Meals and Groups
    // =========================================================================

    /// A meal as shown on the board. Owned by the backend, read-only here.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Meal {
        /// Backend identifier
        pub id: String,
        /// Display name
        pub name: String,
    }

    impl Meal {
        /// Create a meal reference
        #[must_use]
        pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                name: name.into(),
            }
        }
    }

    /// A named cluster of meals served together (e.g. "breakfast")
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Group {
        /// Backend identifier
        pub id: String,
        /// Display name
        pub name: String,
        /// Member meals, in display order
        #[serde(default)]
        pub meals: Vec<Meal>,
    }

    /// What a schedule item holds: exactly one meal or exactly one group
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Assignment {
        /// A single meal
        Meal(Meal),
        /// A group of meals
        Group(Group),
    }

    // =========================================================================
    // Schedules
    // =========================================================================

    /// One cell's content for one day
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ScheduleItem {
        /// Unique identifier: stable across days
        pub id: String,
        /// The assigned meal or group
        #[serde(flatten)]
        pub assignment: Assignment,
    }

    impl ScheduleItem {
        /// Schedule a single meal
        #[must_use]
        pub fn meal(id: impl Into<String>, meal: Meal) -> Self {
            Self {
                id: id.into(),
                assignment: Assignment::Meal(meal),
            }
        }

        /// Schedule a group of meals
        #[must_use]
        pub fn group(id: impl Into<String>, group: Group) -> Self {
            Self {
                id: id.into(),
                assignment: Assignment::Group(group),
            }
        }

        /// Number of flattened entries this item produces
        #[must_use]
        pub fn flat_len(&self) -> usize {
            match &self.assignment {
                Assignment::Meal(_) => 1,
                Assignment::Group(group) => 1 + group.meals.len(),
            }
        }
    }

    /// All schedule items for one serving date
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DaySchedule {
        /// Backend identifier
        pub id: String,
        /// The day this schedule is served on
        #[serde(alias = "servingDate")]
        pub serving_date: NaiveDate,
        /// Items in display order
        #[serde(default, alias = "schedules")]
        pub items: Vec<ScheduleItem>,
    }

    // =========================================================================
    // Day keys
    // =========================================================================

    /// Canonical key of a day-group, rendered as `YYYY-MM-DD`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct DayKey(pub NaiveDate);

    impl DayKey {
        /// Canonical key format
        pub const FORMAT: &'static str = "%Y-%m-%d";

        /// The date behind this key
        #[must_use]
        pub fn date(&self) -> NaiveDate {
            self.0
        }
    }

    impl From<NaiveDate> for DayKey {
        fn from(date: NaiveDate) -> Self {
            Self(date)
        }
    }

    impl fmt::Display for DayKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0.format(Self::FORMAT))
        }
    }

    impl FromStr for DayKey {
        type Err = chrono::ParseError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            NaiveDate::parse_from_str(s, Self::FORMAT).map(Self)
        }
    }

    impl Serialize for DayKey {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for DayKey {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = String::deserialize(deserializer)?;
            raw.parse().map_err(serde::de::Error::custom)
        }
    }

    // =========================================================================
    // Flattened entries
    // =========================================================================

    /// Where a flattened entry came from
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum EntrySource {
        /// A schedule item holding a single meal
        Meal {
            /// The scheduled meal
            meal: Meal,
        },
        /// The synthetic container entry of a group
        Container {
            /// Group identifier
            group_id: String,
            /// Group display name
            name: String,
        },
        /// A meal nested inside a group
        Member {
            /// Identifier of the owning group
            group_id: String,
            /// The member meal
            meal: Meal,
            /// Position inside the group
            position: usize,
        },
    }

    /// Depth-annotated projection of one schedule item (or group member)
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FlatEntry {
        /// Encoded composite identifier, unique within its day-group
        pub flat_id: String,
        /// Originating schedule item
        pub schedule_id: String,
        /// What this entry represents
        pub source: EntrySource,
        /// Enclosing container's `flat_id` (depth 1 only)
        pub parent_id: Option<String>,
        /// 0 for top-level entries and containers, 1 for group members
        pub depth: u8,
        /// Position in the day's flattened list
        pub index: usize,
    }

    impl FlatEntry {
        /// True only for the synthetic group entry
        #[must_use]
        pub fn is_container(&self) -> bool {
            matches!(self.source, EntrySource::Container { .. })
        }

        /// The meal this entry shows, if it is not a container
        #[must_use]
        pub fn meal(&self) -> Option<&Meal> {
            match &self.source {
                EntrySource::Meal { meal } | EntrySource::Member { meal, .. } => Some(meal),
                EntrySource::Container { .. } => None,
            }
        }

        /// Group this entry belongs to (itself for containers)
        #[must_use]
        pub fn group_id(&self) -> Option<&str> {
            match &self.source {
                EntrySource::Container { group_id, .. } | EntrySource::Member { group_id, .. } => {
                    Some(group_id)
                }
                EntrySource::Meal { .. } => None,
            }
        }

        /// Display label
        #[must_use]
        pub fn label(&self) -> &str {
            match &self.source {
                EntrySource::Meal { meal } | EntrySource::Member { meal, .. } => &meal.name,
                EntrySource::Container { name, .. } => name,
            }
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{BoardError, BoardResult};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
