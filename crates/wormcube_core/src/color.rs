use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Antipodal color of each color ID, indexed by color ID.
///
/// Index 0 is unused. Colors on opposite faces of a solved cube are antipodal
/// partners: red/orange, green/blue, white/yellow.
pub const ANTIPODAL_COLOR: [u8; 7] = [0, 4, 5, 6, 1, 2, 3];

/// Sticker color ID from 1 to 6.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Color(pub u8);
impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
impl Color {
    /// Front face color.
    pub const RED: Self = Self(1);
    /// Left face color.
    pub const GREEN: Self = Self(2);
    /// Top face color.
    pub const WHITE: Self = Self(3);
    /// Back face color.
    pub const ORANGE: Self = Self(4);
    /// Right face color.
    pub const BLUE: Self = Self(5);
    /// Bottom face color.
    pub const YELLOW: Self = Self(6);

    /// All six colors, in order of ID.
    pub const ALL: [Self; 6] = [
        Self::RED,
        Self::GREEN,
        Self::WHITE,
        Self::ORANGE,
        Self::BLUE,
        Self::YELLOW,
    ];

    /// Returns whether the color ID is in the range 1 to 6.
    pub const fn is_valid(self) -> bool {
        matches!(self.0, 1..=6)
    }

    /// Returns the antipodal color. Invalid colors map to themselves.
    #[must_use]
    pub const fn antipodal(self) -> Self {
        if self.is_valid() {
            Self(ANTIPODAL_COLOR[self.0 as usize])
        } else {
            self
        }
    }

    /// Returns the color of the face with outward normal `dir` on a solved
    /// cube.
    pub const fn of_direction(dir: Direction) -> Self {
        match dir {
            Direction::PZ => Self(1),
            Direction::NX => Self(2),
            Direction::PY => Self(3),
            Direction::NZ => Self(4),
            Direction::PX => Self(5),
            Direction::NY => Self(6),
        }
    }

    /// Returns the human-friendly name of the color.
    pub const fn name(self) -> &'static str {
        match self.0 {
            1 => "red",
            2 => "green",
            3 => "white",
            4 => "orange",
            5 => "blue",
            6 => "yellow",
            _ => "unknown",
        }
    }
    /// Returns an uppercase letter for the color, or `?` if the color is
    /// invalid.
    pub const fn letter(self) -> char {
        match self.0 {
            1 => 'R',
            2 => 'G',
            3 => 'W',
            4 => 'O',
            5 => 'B',
            6 => 'Y',
            _ => '?',
        }
    }
}
