// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! The visible week window

use crate::types::DayKey;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// First day of a displayed week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// ISO weeks
    #[default]
    Monday,
    /// US-style weeks
    Sunday,
}

impl WeekStart {
    fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
        }
    }
}

/// Seven consecutive days currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    days: [NaiveDate; 7],
}

impl WeekWindow {
    /// Window starting at `first`
    #[must_use]
    pub fn starting(first: NaiveDate) -> Self {
        let mut days = [first; 7];
        for (offset, day) in (0i64..).zip(days.iter_mut()) {
            *day = first + Duration::days(offset);
        }
        Self { days }
    }

    /// Window of the week that contains `date`
    #[must_use]
    pub fn containing(date: NaiveDate, start: WeekStart) -> Self {
        let back = (7 + date.weekday().num_days_from_monday()
            - start.weekday().num_days_from_monday())
            % 7;
        Self::starting(date - Duration::days(i64::from(back)))
    }

    /// The following week
    #[must_use]
    pub fn next(&self) -> Self {
        Self::starting(self.days[0] + Duration::days(7))
    }

    /// The preceding week
    #[must_use]
    pub fn previous(&self) -> Self {
        Self::starting(self.days[0] - Duration::days(7))
    }

    /// Days in display order
    #[must_use]
    pub fn days(&self) -> &[NaiveDate; 7] {
        &self.days
    }

    /// Canonical keys in display order
    pub fn keys(&self) -> impl Iterator<Item = DayKey> + '_ {
        self.days.iter().copied().map(DayKey)
    }

    /// Whether `date` is on screen
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    /// Column of `date` in this window
    #[must_use]
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|d| *d == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_containing_monday_start() {
        // 2024-01-03 is a Wednesday
        let week = WeekWindow::containing(date(2024, 1, 3), WeekStart::Monday);
        assert_eq!(week.days()[0], date(2024, 1, 1));
        assert_eq!(week.days()[6], date(2024, 1, 7));
    }

    #[test]
    fn test_containing_sunday_start() {
        let week = WeekWindow::containing(date(2024, 1, 3), WeekStart::Sunday);
        assert_eq!(week.days()[0], date(2023, 12, 31));
        assert!(week.contains(date(2024, 1, 6)));
        assert!(!week.contains(date(2024, 1, 7)));
    }

    #[test]
    fn test_navigation() {
        let week = WeekWindow::starting(date(2024, 1, 1));
        assert_eq!(week.next().days()[0], date(2024, 1, 8));
        assert_eq!(week.next().previous(), week);
        assert_eq!(week.position(date(2024, 1, 2)), Some(1));
    }

    #[test]
    fn test_keys_are_canonical() {
        let week = WeekWindow::starting(date(2024, 1, 1));
        let keys: Vec<String> = week.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys[0], "2024-01-01");
        assert_eq!(keys.len(), 7);
    }
}
