//! Puzzle state engine for WORM³.
//!
//! WORM³ is an N×N×N twisty cube where any sticker can be flipped through a
//! "wormhole" to its antipodal color, together with the sticker diametrically
//! opposite it through the center of the cube. This crate contains the
//! discrete part of the game: the cube state, slice rotations, antipodal
//! ("manifold") logic, win detection, and the chaos process that spreads
//! flips over time. Rendering and input are left to the caller.
//!
//! Every operation is synchronous and returns a new [`CubeState`]. Callers
//! must always use the returned state.
//!
//! # Example
//!
//! ```rust
//! use wormcube_core::prelude::*;
//!
//! let cube = CubeState::new(3);
//! let manifold = ManifoldMap::build(&cube);
//! let front = StickerPos::new(1, 1, 2, Direction::PZ);
//! let cube = cube.flip_sticker_pair(front, &manifold);
//!
//! assert_eq!(cube.sticker(front).unwrap().curr, Color::RED.antipodal());
//! assert!(!detect_win_conditions(&cube).rubiks);
//! ```

mod chaos;
mod color;
mod coords;
mod direction;
mod manifold;
pub mod notation;
mod rotation;
mod scramble;
mod session;
mod state;
mod timestamp;
mod win;

pub use prelude::*;

/// Prelude of common imports.
pub mod prelude {
    pub use crate::chaos::*;
    pub use crate::color::{ANTIPODAL_COLOR, Color};
    pub use crate::coords::*;
    pub use crate::direction::{Axis, Direction, Sign};
    pub use crate::manifold::*;
    pub use crate::notation::{Move, NotationError};
    pub use crate::rotation::*;
    pub use crate::scramble::*;
    pub use crate::session::Session;
    pub use crate::state::*;
    pub use crate::timestamp::Timestamp;
    pub use crate::win::*;
}

/// Version string such as `wormcube_core v1.2.3`.
pub const ENGINE_VERSION_STRING: &str =
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Cube sizes offered to players.
///
/// The engine itself works for any size of at least 1, but only these sizes
/// are supported by the game and accepted in log files.
pub const SUPPORTED_SIZES: std::ops::RangeInclusive<u8> = 3..=5;

/// Returns whether `size` is one of [`SUPPORTED_SIZES`].
pub fn is_supported_size(size: u8) -> bool {
    SUPPORTED_SIZES.contains(&size)
}

#[cfg(test)]
mod tests;
