use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Axis, Color, Direction, GridPos, Sign, StickerPos, iter_grid_positions};

/// Colored tile on one face of a cubie.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sticker {
    /// Color assigned when the cube was created. This never changes.
    pub orig: Color,
    /// Color currently displayed.
    ///
    /// Flips only ever toggle this between `orig` and `orig.antipodal()`.
    pub curr: Color,
    /// Number of times this sticker has been flipped.
    pub flips: u32,
    /// Sudokube number from 1 to N, assigned when the cube was created.
    pub value: u8,
}
impl Sticker {
    /// Constructs an unflipped sticker.
    pub const fn new(color: Color, value: u8) -> Self {
        Self {
            orig: color,
            curr: color,
            flips: 0,
            value,
        }
    }

    /// Returns whether the sticker currently shows its antipodal color.
    pub fn is_flipped(&self) -> bool {
        self.curr != self.orig
    }

    /// Sends the sticker through its wormhole.
    pub(crate) fn flip(&mut self) {
        self.curr = self.curr.antipodal();
        self.flips += 1;
    }
}

/// Returns the sudokube number for the sticker at `(row, col)` on a face of a
/// solved cube.
///
/// Every face of a solved cube is a Latin square under this numbering.
pub fn face_value(row: u8, col: u8, size: u8) -> u8 {
    let size = u16::from(size.max(1));
    ((u16::from(row) + u16::from(col)) % size + 1) as u8
}

/// Unit cell of the cube lattice, with a sticker for each direction in which
/// it touches the exterior.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cubie {
    stickers: [Option<Sticker>; 6],
}
impl Cubie {
    /// Returns the sticker facing `dir`, if there is one.
    pub fn sticker(&self, dir: Direction) -> Option<&Sticker> {
        self.stickers[dir.index()].as_ref()
    }
    pub(crate) fn sticker_mut(&mut self, dir: Direction) -> Option<&mut Sticker> {
        self.stickers[dir.index()].as_mut()
    }
    /// Iterates over the stickers of the cubie and the directions they face.
    pub fn stickers(&self) -> impl Iterator<Item = (Direction, &Sticker)> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| Some((dir, self.sticker(dir)?)))
    }
    /// Returns the number of stickers: 0 for interior cubies, up to 3 for
    /// corners.
    pub fn sticker_count(&self) -> usize {
        self.stickers.iter().flatten().count()
    }
    /// Returns whether the cubie has no stickers.
    pub fn is_interior(&self) -> bool {
        self.sticker_count() == 0
    }

    /// Returns the cubie with every sticker re-filed under the direction it
    /// faces after a quarter turn about `axis`.
    #[must_use]
    pub(crate) fn rotated(&self, axis: Axis, sign: Sign) -> Self {
        let mut ret = Self::default();
        for dir in Direction::ALL {
            ret.stickers[dir.rotated(axis, sign).index()] = self.stickers[dir.index()];
        }
        ret
    }
}

/// State of an N×N×N cube.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct CubeState {
    /// Number of layers along each axis.
    size: u8,
    /// Cubies indexed by position, with X varying fastest.
    cubies: Vec<Cubie>,
}
impl fmt::Debug for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubeState")
            .field("size", &self.size)
            .field("flipped", &self.flipped_count())
            .finish_non_exhaustive()
    }
}
impl CubeState {
    /// Constructs a solved cube.
    ///
    /// Every sticker on a face has the color of that face (see
    /// [`Color::of_direction()`]) and a sudokube number from [`face_value()`].
    pub fn new(size: u8) -> Self {
        let cubies = iter_grid_positions(size)
            .map(|pos| {
                let mut cubie = Cubie::default();
                for dir in Direction::ALL {
                    let sticker_pos = StickerPos { pos, dir };
                    if sticker_pos.is_on_surface(size) {
                        let (row, col) = sticker_pos.face_coords();
                        let sticker = Sticker::new(Color::of_direction(dir), face_value(row, col, size));
                        cubie.stickers[dir.index()] = Some(sticker);
                    }
                }
                cubie
            })
            .collect();
        Self { size, cubies }
    }

    /// Returns the number of layers along each axis.
    pub fn size(&self) -> u8 {
        self.size
    }

    fn index_of(&self, pos: GridPos) -> Option<usize> {
        let n = self.size as usize;
        pos.is_in_bounds(self.size)
            .then(|| pos.x as usize + n * (pos.y as usize + n * pos.z as usize))
    }

    /// Returns the cubie at `pos`, or `None` if it is out of bounds.
    pub fn cubie(&self, pos: GridPos) -> Option<&Cubie> {
        self.cubies.get(self.index_of(pos)?)
    }
    pub(crate) fn cubie_mut(&mut self, pos: GridPos) -> Option<&mut Cubie> {
        let i = self.index_of(pos)?;
        self.cubies.get_mut(i)
    }
    /// Iterates over all cubies and their positions.
    pub fn cubies(&self) -> impl Iterator<Item = (GridPos, &Cubie)> {
        iter_grid_positions(self.size).zip(&self.cubies)
    }

    /// Returns the sticker at `pos`, or `None` if there is none.
    pub fn sticker(&self, pos: StickerPos) -> Option<&Sticker> {
        self.cubie(pos.pos)?.sticker(pos.dir)
    }
    pub(crate) fn sticker_mut(&mut self, pos: StickerPos) -> Option<&mut Sticker> {
        self.cubie_mut(pos.pos)?.sticker_mut(pos.dir)
    }
    /// Iterates over every sticker and its position.
    pub fn stickers(&self) -> impl Iterator<Item = (StickerPos, &Sticker)> {
        self.cubies().flat_map(|(pos, cubie)| {
            cubie
                .stickers()
                .map(move |(dir, sticker)| (StickerPos { pos, dir }, sticker))
        })
    }
    /// Iterates over every sticker on the face with outward normal `dir`.
    pub fn face_stickers(&self, dir: Direction) -> impl Iterator<Item = (StickerPos, &Sticker)> {
        self.stickers().filter(move |(pos, _)| pos.dir == dir)
    }

    /// Returns the number of stickers currently showing their antipodal
    /// color.
    pub fn flipped_count(&self) -> usize {
        self.stickers().filter(|(_, s)| s.is_flipped()).count()
    }

    /// Returns the `N×N` grid of stickers on a face, indexed by `[row][col]`
    /// (see [`StickerPos::face_coords()`]).
    pub fn face_grid(&self, dir: Direction) -> Vec<Vec<Option<Sticker>>> {
        let n = self.size as usize;
        let mut grid = vec![vec![None; n]; n];
        for (pos, sticker) in self.face_stickers(dir) {
            let (row, col) = pos.face_coords();
            grid[row as usize][col as usize] = Some(*sticker);
        }
        grid
    }

    pub(crate) fn from_cubies(size: u8, cubies: Vec<Cubie>) -> Self {
        debug_assert_eq!(cubies.len(), (size as usize).pow(3));
        Self { size, cubies }
    }
}

/// Returns a solved cube of the given size.
pub fn make_cubies(size: u8) -> CubeState {
    CubeState::new(size)
}
