//! Grid positions and the mapping from grid space to world space.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Axis, Direction, Sign};

/// Distance from a cubie's center to the plane of its stickers.
///
/// This is slightly more than half a unit so that stickers sit just outside
/// cubies, which are drawn 0.95 to 0.98 units wide.
pub const STICKER_OFFSET: f32 = 0.51;

/// Extra spacing between cubies per unit of explosion factor.
pub const EXPLOSION_SPACING: f32 = 1.8;

/// Position of a cubie in the N×N×N lattice.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    /// X coordinate (`col`).
    pub x: u8,
    /// Y coordinate (`row`).
    pub y: u8,
    /// Z coordinate (`depth`).
    pub z: u8,
}
impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}
impl From<[u8; 3]> for GridPos {
    fn from([x, y, z]: [u8; 3]) -> Self {
        Self { x, y, z }
    }
}
impl GridPos {
    /// Constructs a grid position.
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate along `axis`.
    pub const fn get(self, axis: Axis) -> u8 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
    /// Returns the position with the coordinate along `axis` replaced.
    #[must_use]
    pub const fn with(mut self, axis: Axis, value: u8) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }
    /// Returns the coordinates as an array.
    pub const fn to_array(self) -> [u8; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns whether the position is inside a cube of the given size.
    pub const fn is_in_bounds(self, size: u8) -> bool {
        self.x < size && self.y < size && self.z < size
    }

    /// Returns the position reflected through the center of the cube.
    #[must_use]
    pub const fn reflected(self, size: u8) -> Self {
        let max = size.saturating_sub(1);
        Self {
            x: max.saturating_sub(self.x),
            y: max.saturating_sub(self.y),
            z: max.saturating_sub(self.z),
        }
    }

    /// Returns the position one step along `dir`, or `None` if that would
    /// leave a cube of the given size.
    pub fn step(self, dir: Direction, size: u8) -> Option<Self> {
        let coord = self.get(dir.axis());
        let new_coord = match dir.sign() {
            Sign::Pos => coord.checked_add(1).filter(|&c| c < size)?,
            Sign::Neg => coord.checked_sub(1)?,
        };
        Some(self.with(dir.axis(), new_coord))
    }

    /// Returns the doubled coordinates relative to the center of a cube of
    /// the given size. These are integers even when the size is even.
    pub(crate) fn to_doubled_centered(self, size: u8) -> [i32; 3] {
        let max = i32::from(size) - 1;
        self.to_array().map(|c| 2 * i32::from(c) - max)
    }
    /// Inverse of [`GridPos::to_doubled_centered()`].
    pub(crate) fn from_doubled_centered(v: [i32; 3], size: u8) -> Option<Self> {
        let max = i32::from(size) - 1;
        let [x, y, z] = v.map(|c| u8::try_from((c + max).div_euclid(2)).ok());
        Some(Self::new(x?, y?, z?)).filter(|p| p.is_in_bounds(size))
    }
}

/// Iterates over all positions in a cube of the given size, with X varying
/// fastest.
pub fn iter_grid_positions(size: u8) -> impl Iterator<Item = GridPos> {
    (0..size).flat_map(move |z| {
        (0..size).flat_map(move |y| (0..size).map(move |x| GridPos::new(x, y, z)))
    })
}

/// Location of a sticker: a cubie position plus the direction the sticker
/// faces.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StickerPos {
    /// Position of the cubie.
    pub pos: GridPos,
    /// Outward normal of the sticker.
    pub dir: Direction,
}
impl fmt::Display for StickerPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.pos, self.dir)
    }
}
impl StickerPos {
    /// Constructs a sticker position.
    pub const fn new(x: u8, y: u8, z: u8, dir: Direction) -> Self {
        Self {
            pos: GridPos::new(x, y, z),
            dir,
        }
    }

    /// Returns whether a sticker at this position would be on the outer
    /// surface of a cube of the given size.
    ///
    /// For example, `PX` stickers only exist where `x = N-1`.
    pub const fn is_on_surface(self, size: u8) -> bool {
        if !self.pos.is_in_bounds(size) {
            return false;
        }
        let coord = self.pos.get(self.dir.axis());
        match self.dir.sign() {
            Sign::Pos => coord == size - 1,
            Sign::Neg => coord == 0,
        }
    }

    /// Returns the geometric antipode: the position reflected through the
    /// center of the cube, facing the opposite way.
    #[must_use]
    pub const fn antipode(self, size: u8) -> Self {
        Self {
            pos: self.pos.reflected(size),
            dir: self.dir.opposite(),
        }
    }

    /// Returns the `(row, col)` coordinates of the sticker within its face's
    /// grid.
    pub const fn face_coords(self) -> (u8, u8) {
        let (row_axis, col_axis) = self.dir.face_axes();
        (self.pos.get(row_axis), self.pos.get(col_axis))
    }
}

/// Converts a grid position to world space.
///
/// If `dir` is `Some`, the returned point is on the plane of the sticker facing
/// that way. If it is `None`, the returned point is the center of the cubie.
/// `explosion` spreads the cubies apart; `0.0` gives a flush cube.
pub fn grid_to_world(pos: GridPos, dir: Option<Direction>, size: u8, explosion: f32) -> [f32; 3] {
    let k = (f32::from(size) - 1.0) / 2.0;
    let spacing = 1.0 + EXPLOSION_SPACING * explosion;
    let mut ret = pos.to_array().map(|c| (f32::from(c) - k) * spacing);
    if let Some(dir) = dir {
        ret[dir.axis().index()] += dir.sign().to_int() as f32 * STICKER_OFFSET;
    }
    ret
}
