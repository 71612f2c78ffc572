//! The discrete action-code space used by the learning seat.
//!
//! Codes `0..36` are move offsets (the six one-step directions, then the
//! twelve two-step and eighteen three-step offsets); code `36` fires at the
//! best target. The mapping is a bijection and stable across versions, since
//! trained policies and recorded replays depend on it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::hex::HexCoord;

/// Number of distinct action codes.
pub const ACTION_COUNT: usize = 37;

/// Code of the fire action.
pub const FIRE_CODE: u8 = 36;

const fn hex(q: i32, r: i32) -> HexCoord {
    HexCoord::new(q, r)
}

/// Move offsets in code order.
#[rustfmt::skip]
pub const MOVE_OFFSETS: [HexCoord; 36] = [
    // one step
    hex(1, 0), hex(1, -1), hex(0, -1), hex(-1, 0), hex(-1, 1), hex(0, 1),
    // two steps
    hex(2, -1), hex(1, -2), hex(-1, -1), hex(-2, 0), hex(-1, 2), hex(1, 1),
    hex(2, 0), hex(2, -2), hex(0, -2), hex(-2, 1), hex(-2, 2), hex(0, 2),
    // three steps
    hex(0, -3), hex(1, -3), hex(2, -3), hex(3, -3), hex(3, -2), hex(3, -1),
    hex(3, 0), hex(2, 1), hex(1, 2), hex(0, 3), hex(-1, 3), hex(-2, 3),
    hex(-3, 3), hex(-3, 2), hex(-3, 1), hex(-3, 0), hex(-2, -1), hex(-1, -2),
];

/// A decoded action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCode {
    /// Move by the given offset from the current cell.
    Move(HexCoord),
    /// Fire at the best available target.
    Fire,
}

impl ActionCode {
    /// Decode a raw code.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidActionCode`] for codes outside
    /// `0..ACTION_COUNT`.
    pub fn from_index(code: u8) -> Result<Self> {
        if code == FIRE_CODE {
            return Ok(Self::Fire);
        }
        MOVE_OFFSETS
            .get(usize::from(code))
            .map(|&offset| Self::Move(offset))
            .ok_or(GameError::InvalidActionCode(code))
    }

    /// Encode back to the raw code.
    ///
    /// Returns `None` for move offsets outside the action space.
    #[must_use]
    pub fn to_index(self) -> Option<u8> {
        match self {
            Self::Fire => Some(FIRE_CODE),
            Self::Move(offset) => MOVE_OFFSETS
                .iter()
                .position(|&o| o == offset)
                .and_then(|i| u8::try_from(i).ok()),
        }
    }

    /// Edges the move spans, zero for fire.
    #[must_use]
    pub fn move_length(self) -> i32 {
        match self {
            Self::Move(offset) => offset.length(),
            Self::Fire => 0,
        }
    }

    /// Every action in code order.
    pub fn all() -> impl Iterator<Item = Self> {
        MOVE_OFFSETS
            .into_iter()
            .map(Self::Move)
            .chain(std::iter::once(Self::Fire))
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(offset) => write!(f, "move {offset}"),
            Self::Fire => f.write_str("fire"),
        }
    }
}
