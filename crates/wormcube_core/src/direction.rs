use std::fmt;
use std::ops::{Mul, Neg};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Axis of the cube lattice.
///
/// Slice rotations name these `col` (X), `row` (Y), and `depth` (Z).
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// X axis (`col`).
    X = 0,
    /// Y axis (`row`).
    Y = 1,
    /// Z axis (`depth`).
    Z = 2,
}
impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
impl FromStr for Axis {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" | "col" => Ok(Axis::X),
            "y" | "row" => Ok(Axis::Y),
            "z" | "depth" => Ok(Axis::Z),
            _ => Err(UnknownName(s.to_owned())),
        }
    }
}
impl Axis {
    /// All three axes, in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the index of the axis: 0, 1, or 2.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the uppercase letter for the axis.
    pub const fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
    /// Returns the axis for a letter, ignoring case.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    /// Returns the name of the slice family along this axis.
    pub const fn slice_name(self) -> &'static str {
        match self {
            Axis::X => "col",
            Axis::Y => "row",
            Axis::Z => "depth",
        }
    }

    /// Returns the other two axes `(u, v)` such that a clockwise quarter turn
    /// about `self` maps `(u, v)` to `(-v, u)`.
    pub(crate) const fn rotation_plane(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Z, Axis::Y),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::Y, Axis::X),
        }
    }
}

/// Positive or negative.
///
/// For a quarter turn, [`Sign::Pos`] is clockwise when viewed from the
/// positive end of the axis (`dir = +1`) and [`Sign::Neg`] is
/// counterclockwise (`dir = -1`).
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Positive (`+1`).
    #[default]
    Pos = 0,
    /// Negative (`-1`).
    Neg = 1,
}
impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Pos => write!(f, "+"),
            Sign::Neg => write!(f, "-"),
        }
    }
}
impl Neg for Sign {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        }
    }
}
impl Mul for Sign {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        if self == rhs { Sign::Pos } else { Sign::Neg }
    }
}
impl Sign {
    /// Returns the sign of an integer, or `None` if it is zero.
    pub fn from_int(n: i32) -> Option<Self> {
        match n.signum() {
            1 => Some(Sign::Pos),
            -1 => Some(Sign::Neg),
            _ => None,
        }
    }
    /// Returns `1` or `-1`.
    pub const fn to_int(self) -> i32 {
        match self {
            Sign::Pos => 1,
            Sign::Neg => -1,
        }
    }
}

/// Outward normal of one face of the cube.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Direction {
    /// Positive X (right).
    PX = 0,
    /// Negative X (left).
    NX = 1,
    /// Positive Y (up).
    PY = 2,
    /// Negative Y (down).
    NY = 3,
    /// Positive Z (front).
    PZ = 4,
    /// Negative Z (back).
    NZ = 5,
}
impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
impl FromStr for Direction {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownName(s.to_owned()))
    }
}
impl Mul<Sign> for Direction {
    type Output = Direction;

    fn mul(self, rhs: Sign) -> Self::Output {
        match rhs {
            Sign::Pos => self,
            Sign::Neg => self.opposite(),
        }
    }
}

use Direction::{NX, NY, NZ, PX, PY, PZ};

/// Where each direction goes under a clockwise quarter turn, indexed by axis
/// and then by direction.
const CLOCKWISE: [[Direction; 6]; 3] = [
    // X: PY -> NZ -> NY -> PZ -> PY
    [PX, NX, NZ, PZ, PY, NY],
    // Y: PX -> PZ -> NX -> NZ -> PX
    [PZ, NZ, PY, NY, NX, PX],
    // Z: PX -> NY -> NX -> PY -> PX
    [NY, PY, PX, NX, PZ, NZ],
];
/// Inverse of [`CLOCKWISE`].
const COUNTERCLOCKWISE: [[Direction; 6]; 3] = [
    [PX, NX, PZ, NZ, NY, PY],
    [NZ, PZ, PY, NY, PX, NX],
    [PY, NY, NX, PX, PZ, NZ],
];

impl Direction {
    /// All six directions, in order.
    pub const ALL: [Direction; 6] = [PX, NX, PY, NY, PZ, NZ];

    /// Returns the direction along `axis` with `sign`.
    pub const fn new(axis: Axis, sign: Sign) -> Self {
        Self::ALL[(axis as usize) << 1 | sign as usize]
    }
    /// Returns the index of the direction: 0 to 5.
    pub const fn index(self) -> usize {
        self as usize
    }
    /// Returns the axis that the direction is parallel to.
    pub const fn axis(self) -> Axis {
        Axis::ALL[self as usize >> 1]
    }
    /// Returns whether the direction points along the positive or negative end
    /// of its axis.
    pub const fn sign(self) -> Sign {
        if self as u8 & 1 == 0 { Sign::Pos } else { Sign::Neg }
    }

    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[self as usize ^ 1]
    }

    /// Returns the unit normal vector.
    pub const fn normal(self) -> [i32; 3] {
        let mut ret = [0; 3];
        ret[self.axis() as usize] = self.sign().to_int();
        ret
    }
    /// Returns the direction with the given unit normal vector, or `None` if
    /// the vector is not an axis-aligned unit vector.
    pub fn from_normal(v: [i32; 3]) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.normal() == v)
    }

    /// Returns the direction this one faces after a quarter turn about `axis`.
    #[must_use]
    pub const fn rotated(self, axis: Axis, sign: Sign) -> Self {
        match sign {
            Sign::Pos => CLOCKWISE[axis as usize][self as usize],
            Sign::Neg => COUNTERCLOCKWISE[axis as usize][self as usize],
        }
    }

    /// Returns the axes that index the rows and columns of this face's sticker
    /// grid.
    pub const fn face_axes(self) -> (Axis, Axis) {
        match self.axis() {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::Y, Axis::X),
        }
    }
}

/// Error returned when parsing an unknown axis or direction name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown name {0:?}")]
pub struct UnknownName(pub String);

/// Rotates an integer vector by a quarter turn about `axis`, using the same
/// convention as [`Direction::rotated()`].
pub(crate) fn rotate_vector(v: [i32; 3], axis: Axis, sign: Sign) -> [i32; 3] {
    let (u_axis, v_axis) = axis.rotation_plane();
    let (u, w) = (v[u_axis.index()], v[v_axis.index()]);
    let dir = sign.to_int();
    let mut ret = v;
    ret[u_axis.index()] = -dir * w;
    ret[v_axis.index()] = dir * u;
    ret
}
