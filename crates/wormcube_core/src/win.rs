use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Color, CubeState, Direction};

/// Victory condition.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Victory {
    /// Every face shows its own solved color.
    Rubiks,
    /// Every face is a Latin square of sudokube numbers.
    Sudokube,
    /// Both [`Victory::Rubiks`] and [`Victory::Sudokube`].
    Ultimate,
    /// [`Victory::Rubiks`], and every sticker has been through its wormhole at
    /// least once.
    Worm,
}

/// Which victory conditions hold for a cube state.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WinConditions {
    /// See [`Victory::Rubiks`].
    pub rubiks: bool,
    /// See [`Victory::Sudokube`].
    pub sudokube: bool,
    /// See [`Victory::Ultimate`].
    pub ultimate: bool,
    /// See [`Victory::Worm`].
    pub worm: bool,
}
impl WinConditions {
    /// Returns whether a victory condition holds.
    pub fn get(&self, victory: Victory) -> bool {
        match victory {
            Victory::Rubiks => self.rubiks,
            Victory::Sudokube => self.sudokube,
            Victory::Ultimate => self.ultimate,
            Victory::Worm => self.worm,
        }
    }
    /// Iterates over the victory conditions that hold.
    pub fn achieved(self) -> impl Iterator<Item = Victory> {
        <Victory as strum::IntoEnumIterator>::iter().filter(move |&v| self.get(v))
    }
}

/// Evaluates every victory condition on a cube state.
pub fn detect_win_conditions(state: &CubeState) -> WinConditions {
    let rubiks = state.is_rubiks_solved();
    let sudokube = state.is_sudokube_solved();
    WinConditions {
        rubiks,
        sudokube,
        ultimate: rubiks && sudokube,
        worm: rubiks && state.all_stickers_flipped(),
    }
}

impl CubeState {
    /// Returns whether every sticker shows the solved color of the face it is
    /// on.
    ///
    /// This compares against the canonical color of each face, not against
    /// each sticker's original color.
    pub fn is_rubiks_solved(&self) -> bool {
        self.stickers()
            .all(|(pos, sticker)| sticker.curr == Color::of_direction(pos.dir))
    }

    /// Returns whether no row or column of any face repeats a sudokube
    /// number, and every number is in the range 1 to N.
    pub fn is_sudokube_solved(&self) -> bool {
        let size = self.size();
        Direction::ALL.into_iter().all(|dir| {
            let grid = self.face_grid(dir);
            let value = |row: usize, col: usize| grid[row][col].map(|s| s.value);
            let is_latin_line = |line: Vec<Option<u8>>| {
                line.iter()
                    .all(|v| v.is_some_and(|v| (1..=size).contains(&v)))
                    && line.iter().all_unique()
            };
            let n = size as usize;
            (0..n).all(|row| is_latin_line((0..n).map(|col| value(row, col)).collect()))
                && (0..n).all(|col| is_latin_line((0..n).map(|row| value(row, col)).collect()))
        })
    }

    /// Returns whether every sticker has been flipped at least once.
    pub fn all_stickers_flipped(&self) -> bool {
        self.stickers().all(|(_, sticker)| sticker.flips > 0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Axis, ManifoldMap, Sign, StickerPos};

    #[test]
    fn test_solved_cube_wins() {
        for size in 1..=5 {
            let cube = CubeState::new(size);
            assert_eq!(
                detect_win_conditions(&cube),
                WinConditions {
                    rubiks: true,
                    sudokube: true,
                    ultimate: true,
                    worm: false,
                },
            );
        }
    }

    #[test]
    fn test_single_twist_breaks_rubiks() {
        for axis in Axis::ALL {
            for slice in 0..3 {
                for dir in [Sign::Pos, Sign::Neg] {
                    let cube = CubeState::new(3).rotate_slice(axis, slice, dir);
                    assert!(!detect_win_conditions(&cube).rubiks, "{axis}{slice}{dir}");
                }
            }
        }
    }

    #[test]
    fn test_face_turn_keeps_own_face_latin() {
        // A face turn only rotates the stickers within that face.
        let cube = CubeState::new(4).rotate_slice(Axis::Z, 3, Sign::Pos);
        let grid = cube.face_grid(Direction::PZ);
        for i in 0..4 {
            assert!(grid[i].iter().map(|s| s.map(|s| s.value)).all_unique());
            assert!(grid.iter().map(|row| row[i].map(|s| s.value)).all_unique());
        }
    }

    #[test]
    fn test_sudokube_breaks_on_inner_slice() {
        let cube = CubeState::new(3).rotate_slice(Axis::Y, 1, Sign::Pos);
        assert!(!cube.is_sudokube_solved());
    }

    #[test]
    fn test_worm_victory() {
        let mut cube = CubeState::new(3);
        let manifold = ManifoldMap::build(&cube);
        // Flip every pair twice, visiting each pair from one side.
        let positions: Vec<StickerPos> = cube
            .stickers()
            .map(|(pos, _)| pos)
            .filter(|pos| pos.dir.sign() == Sign::Pos)
            .collect();
        for &pos in &positions {
            cube = cube.flip_sticker_pair(pos, &manifold);
        }
        let wins = detect_win_conditions(&cube);
        assert!(!wins.rubiks && !wins.worm);
        assert!(wins.sudokube);

        for &pos in &positions {
            cube = cube.flip_sticker_pair(pos, &manifold);
        }
        assert_eq!(
            detect_win_conditions(&cube).achieved().collect::<Vec<_>>(),
            vec![
                Victory::Rubiks,
                Victory::Sudokube,
                Victory::Ultimate,
                Victory::Worm
            ],
        );
    }

    #[test]
    fn test_victory_names() {
        assert_eq!(Victory::Sudokube.to_string(), "sudokube");
        assert_eq!("worm".parse::<Victory>(), Ok(Victory::Worm));
    }
}
