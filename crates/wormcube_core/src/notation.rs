//! Text notation for twists and flips.
//!
//! - A twist is an axis letter, a slice index, and an optional `'` for a
//!   counterclockwise turn: `X2`, `Y0'`.
//! - A flip is `@` followed by a sticker position: `@1,1,2,PZ`.
//!
//! Move sequences are separated by whitespace.

use std::fmt;

use itertools::Itertools;
use nom::Parser;
use nom::branch::alt;
use nom::character::complete::{alpha1, char, one_of, u8 as decimal_u8};
use nom::combinator::{all_consuming, map_opt, map_res, opt};
use nom::error::Error;
use nom::sequence::preceded;
use serde::{Deserialize, Serialize};

use crate::{Axis, Direction, GridPos, Sign, StickerPos, Twist};

/// Error produced when parsing move notation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// A token is not a valid twist or flip.
    #[error("invalid move {token:?} at position {index}")]
    InvalidMove {
        /// Text of the token.
        token: String,
        /// Index of the token in the sequence.
        index: usize,
    },
}

/// Player action that changes the cube.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    /// Quarter turn of a slice.
    Twist(Twist),
    /// Flip of a sticker and its antipodal partner.
    Flip(StickerPos),
}
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Twist(twist) => write!(f, "{twist}"),
            Move::Flip(pos) => write!(f, "@{pos}"),
        }
    }
}
impl From<Twist> for Move {
    fn from(value: Twist) -> Self {
        Move::Twist(value)
    }
}
impl std::str::FromStr for Move {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_move(s)
    }
}

/// Parses a single move.
pub fn parse_move(s: &str) -> Result<Move, NotationError> {
    parse_token(s.trim(), 0)
}

/// Parses a whitespace-separated sequence of moves.
pub fn parse_moves(s: &str) -> Result<Vec<Move>, NotationError> {
    s.split_whitespace()
        .enumerate()
        .map(|(index, token)| parse_token(token, index))
        .collect()
}

/// Parses a whitespace-separated sequence of twists, rejecting flips.
pub fn parse_twists(s: &str) -> Result<Vec<Twist>, NotationError> {
    s.split_whitespace()
        .enumerate()
        .map(|(index, token)| match parse_token(token, index)? {
            Move::Twist(twist) => Ok(twist),
            Move::Flip(_) => Err(NotationError::InvalidMove {
                token: token.to_owned(),
                index,
            }),
        })
        .collect()
}

/// Formats a sequence of moves, separated by spaces.
pub fn format_moves<M: fmt::Display>(moves: impl IntoIterator<Item = M>) -> String {
    moves.into_iter().join(" ")
}

fn parse_token(token: &str, index: usize) -> Result<Move, NotationError> {
    let (_remaining_input, mv) = all_consuming(move_parser())
        .parse_complete(token)
        .map_err(|_| NotationError::InvalidMove {
            token: token.to_owned(),
            index,
        })?;
    Ok(mv)
}

/// Parser for a twist or a flip.
fn move_parser<'a>() -> impl Parser<&'a str, Output = Move, Error = Error<&'a str>> {
    alt((twist_parser().map(Move::Twist), flip_parser().map(Move::Flip)))
}

/// Parser for a twist. Example: `Y0'`
fn twist_parser<'a>() -> impl Parser<&'a str, Output = Twist, Error = Error<&'a str>> {
    (
        map_opt(one_of("XYZxyz"), Axis::from_letter),
        decimal_u8,
        opt(char('\'')),
    )
        .map(|(axis, slice, prime)| {
            let dir = if prime.is_some() { Sign::Neg } else { Sign::Pos };
            Twist::new(axis, slice, dir)
        })
}

/// Parser for a flip. Example: `@1,1,2,PZ`
fn flip_parser<'a>() -> impl Parser<&'a str, Output = StickerPos, Error = Error<&'a str>> {
    preceded(
        char('@'),
        (
            decimal_u8,
            char(','),
            decimal_u8,
            char(','),
            decimal_u8,
            char(','),
            map_res(alpha1, str::parse::<Direction>),
        ),
    )
    .map(|(x, _, y, _, z, _, dir)| StickerPos {
        pos: GridPos::new(x, y, z),
        dir,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_twists() {
        assert_eq!(
            parse_move("X2"),
            Ok(Move::Twist(Twist::new(Axis::X, 2, Sign::Pos))),
        );
        assert_eq!(
            parse_move("y0'"),
            Ok(Move::Twist(Twist::new(Axis::Y, 0, Sign::Neg))),
        );
        assert_eq!(
            parse_move("Z12"),
            Ok(Move::Twist(Twist::new(Axis::Z, 12, Sign::Pos))),
        );
    }

    #[test]
    fn test_parse_flip() {
        assert_eq!(
            parse_move("@1,1,2,PZ"),
            Ok(Move::Flip(StickerPos::new(1, 1, 2, Direction::PZ))),
        );
        assert_eq!(
            parse_move("@0,4,3,nx"),
            Ok(Move::Flip(StickerPos::new(0, 4, 3, Direction::NX))),
        );
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "W1", "X", "X1''", "X-1", "@1,1,PZ", "@1,1,2,QZ", "@1,1,2,PZ,"] {
            assert!(parse_move(bad).is_err(), "{bad:?} should not parse");
        }
        assert_eq!(
            parse_moves("X0 Y1 oops Z2"),
            Err(NotationError::InvalidMove {
                token: "oops".to_owned(),
                index: 2,
            }),
        );
        assert!(parse_twists("X0 @0,0,0,NX").is_err());
    }

    #[test]
    fn test_format_roundtrip() {
        let s = "X2 Y0' @1,1,2,PZ Z1";
        let moves = parse_moves(s).unwrap();
        assert_eq!(moves.len(), 4);
        assert_eq!(format_moves(&moves), s);
        assert_eq!(parse_moves("  X0\n\tX1  ").unwrap().len(), 2);
        assert_eq!(parse_moves("").unwrap(), vec![]);
    }
}
