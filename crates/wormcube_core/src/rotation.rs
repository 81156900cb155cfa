use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::rotate_vector;
use crate::{Axis, CubeState, Cubie, GridPos, Sign, iter_grid_positions};

/// Quarter turn of one slice of the cube.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Twist {
    /// Axis perpendicular to the slice.
    pub axis: Axis,
    /// Index of the slice along `axis`, from 0 to N-1.
    pub slice: u8,
    /// [`Sign::Pos`] for clockwise when viewed from the positive end of
    /// `axis`, [`Sign::Neg`] for counterclockwise.
    pub dir: Sign,
}
impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.axis, self.slice)?;
        if self.dir == Sign::Neg {
            write!(f, "'")?;
        }
        Ok(())
    }
}
impl Twist {
    /// Constructs a twist.
    pub const fn new(axis: Axis, slice: u8, dir: Sign) -> Self {
        Self { axis, slice, dir }
    }

    /// Returns the twist that undoes this one.
    #[must_use]
    pub fn rev(self) -> Self {
        Self {
            dir: -self.dir,
            ..self
        }
    }

    /// Returns whether the twist grips at least one layer of a cube of the
    /// given size.
    pub fn is_valid_for(self, size: u8) -> bool {
        self.slice < size
    }
}

impl CubeState {
    /// Returns the cube after a quarter turn of one slice.
    ///
    /// Cubies in the slice move to their rotated positions and their stickers
    /// are re-filed under the directions they now face. Sticker data is never
    /// modified. If `slice` is out of range, the state is returned unchanged.
    #[must_use]
    pub fn rotate_slice(&self, axis: Axis, slice: u8, dir: Sign) -> Self {
        let size = self.size();
        if slice >= size {
            return self.clone();
        }

        let mut cubies: Vec<Cubie> = self.cubies().map(|(_, cubie)| *cubie).collect();
        for pos in iter_grid_positions(size).filter(|pos| pos.get(axis) == slice) {
            let Some(new_pos) = rotate_position(pos, axis, dir, size) else {
                continue;
            };
            let (Some(old), Some(new_index)) = (self.cubie(pos), index(new_pos, size)) else {
                continue;
            };
            cubies[new_index] = old.rotated(axis, dir);
        }
        Self::from_cubies(size, cubies)
    }

    /// Returns the cube after a twist. See [`CubeState::rotate_slice()`].
    #[must_use]
    pub fn twist(&self, twist: Twist) -> Self {
        self.rotate_slice(twist.axis, twist.slice, twist.dir)
    }

    /// Returns the cube after a sequence of twists.
    #[must_use]
    pub fn twists(&self, twists: impl IntoIterator<Item = Twist>) -> Self {
        twists
            .into_iter()
            .fold(self.clone(), |state, twist| state.twist(twist))
    }
}

/// Returns the cube after a quarter turn of one slice. See
/// [`CubeState::rotate_slice()`].
pub fn rotate_slice_cubies(state: &CubeState, axis: Axis, slice: u8, dir: Sign) -> CubeState {
    state.rotate_slice(axis, slice, dir)
}

/// Returns where a cubie at `pos` ends up after a quarter turn about `axis`
/// through the center of a cube of the given size.
pub fn rotate_position(pos: GridPos, axis: Axis, dir: Sign, size: u8) -> Option<GridPos> {
    let v = rotate_vector(pos.to_doubled_centered(size), axis, dir);
    GridPos::from_doubled_centered(v, size)
}

fn index(pos: GridPos, size: u8) -> Option<usize> {
    let n = size as usize;
    pos.is_in_bounds(size)
        .then(|| pos.x as usize + n * (pos.y as usize + n * pos.z as usize))
}
