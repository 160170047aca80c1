// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mealboard::engine::Board;
use mealboard::store::BoardFile;
use mealboard::week::WeekWindow;

#[derive(Debug, Arbitrary)]
enum Event {
    Start(u8),
    Move(i16),
    Over(u8, Option<u8>),
    End(u8, Option<u8>),
    Cancel,
}

fuzz_target!(|events: Vec<Event>| {
    let file = BoardFile::demo();
    let Some(first) = file.days.first().map(|d| d.serving_date) else {
        return;
    };
    let mut board = Board::new(WeekWindow::starting(first), file.days);

    let ids = |board: &Board| -> Vec<String> {
        board
            .groups()
            .iter()
            .flat_map(|(key, entries)| {
                std::iter::once(key.to_string()).chain(entries.iter().map(|e| e.flat_id.clone()))
            })
            .collect()
    };
    let pick = |ids: &[String], i: u8| ids[usize::from(i) % ids.len()].clone();

    for event in events {
        let known = ids(&board);
        match event {
            Event::Start(a) => board.on_drag_start(&pick(&known, a)),
            Event::Move(dx) => board.on_drag_move(f64::from(dx)),
            Event::Over(a, h) => board.on_drag_over(&pick(&known, a), h.map(|h| pick(&known, h)).as_deref()),
            Event::End(a, h) => {
                board.on_drag_end(&pick(&known, a), h.map(|h| pick(&known, h)).as_deref());
            }
            Event::Cancel => board.on_drag_cancel(),
        }
        for entries in board.groups().values() {
            assert!(mealboard::index::validate(entries).is_ok());
        }
    }
});
