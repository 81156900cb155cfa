//! Plain-text rendering of the cube for the terminal.

use itertools::Itertools;
use wormcube_core::{CubeState, Direction, Sticker, WinConditions};

/// Order in which faces are printed.
const FACE_ORDER: [Direction; 6] = [
    Direction::PZ,
    Direction::NZ,
    Direction::PY,
    Direction::NY,
    Direction::PX,
    Direction::NX,
];

/// Returns the character for a sticker: the letter of its current color,
/// lowercase if it has been flipped through its wormhole.
pub(crate) fn sticker_char(sticker: Option<Sticker>) -> char {
    match sticker {
        None => '.',
        Some(s) if s.is_flipped() => s.curr.letter().to_ascii_lowercase(),
        Some(s) => s.curr.letter(),
    }
}

/// Returns one face as an `N×N` grid of letters, one row per line.
pub(crate) fn face_string(state: &CubeState, dir: Direction) -> String {
    state
        .face_grid(dir)
        .into_iter()
        .map(|row| row.into_iter().map(sticker_char).join(" "))
        .join("\n")
}

/// Returns every face of the cube, each headed by its direction and solved
/// color.
pub(crate) fn cube_string(state: &CubeState) -> String {
    FACE_ORDER
        .iter()
        .map(|&dir| {
            let (rows, cols) = dir.face_axes();
            let color = wormcube_core::Color::of_direction(dir);
            format!(
                "{dir} ({}, rows {rows}, cols {cols})\n{}",
                color.name(),
                face_string(state, dir),
            )
        })
        .join("\n\n")
}

/// Returns the sudokube numbers of one face as an `N×N` grid.
pub(crate) fn values_string(state: &CubeState, dir: Direction) -> String {
    state
        .face_grid(dir)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|s| s.map_or_else(|| ".".to_owned(), |s| s.value.to_string()))
                .join(" ")
        })
        .join("\n")
}

/// Returns a one-line summary of the victory conditions.
pub(crate) fn win_string(conditions: WinConditions) -> String {
    let mark = |b: bool| if b { "yes" } else { "no" };
    format!(
        "rubiks: {}  sudokube: {}  ultimate: {}  worm: {}",
        mark(conditions.rubiks),
        mark(conditions.sudokube),
        mark(conditions.ultimate),
        mark(conditions.worm),
    )
}
