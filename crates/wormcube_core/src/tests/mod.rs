mod properties;

use itertools::Itertools;

use crate::{CubeState, Sticker};

/// Returns the sorted multiset of `(orig, curr, flips)` across the whole cube.
fn sticker_triples(state: &CubeState) -> Vec<(u8, u8, u32)> {
    state
        .stickers()
        .map(|(_, s)| (s.orig.0, s.curr.0, s.flips))
        .sorted()
        .collect()
}

/// Returns the stickers of every cubie, keyed by grid position.
fn stickers_by_cubie(state: &CubeState) -> Vec<Vec<Sticker>> {
    state
        .cubies()
        .map(|(_, cubie)| {
            cubie
                .stickers()
                .map(|(_, s)| *s)
                .sorted_by_key(|s| (s.orig, s.curr, s.flips, s.value))
                .collect()
        })
        .collect()
}
