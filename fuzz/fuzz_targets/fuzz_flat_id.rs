// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use mealboard::codec::FlatId;

fuzz_target!(|data: &str| {
    // Anything that decodes must re-encode to an id that decodes the same
    if let Ok(id) = FlatId::decode(data) {
        let again = FlatId::decode(&id.encode()).expect("re-encoded id must decode");
        assert_eq!(again, id);
    }
});
