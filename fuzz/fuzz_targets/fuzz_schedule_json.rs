// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use mealboard::index;
use mealboard::types::DaySchedule;

fuzz_target!(|data: &[u8]| {
    if let Ok(day) = serde_json::from_slice::<DaySchedule>(data) {
        // Flattening arbitrary input must never panic
        let entries = index::flatten(&day);
        let _ = index::validate(&entries);
    }
});
