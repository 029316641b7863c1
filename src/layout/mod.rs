//! # Layout Module
//!
//! Coordinates, directions and the room-slot grid that the generation
//! pipeline fills in.
//!
//! The layout uses a y-up convention throughout: `Direction::Up` increases
//! `y`, and row `0` is the bottom of the level.

pub mod slots;

pub use slots::*;

use crate::{RoomweaveError, RoomweaveResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An integer coordinate, used both for room slots and for tiles.
///
/// # Examples
///
/// ```
/// use roomweave::{Direction, Position};
///
/// let pos = Position::new(3, 4);
/// assert_eq!(pos.step(Direction::Up), Position::new(3, 5));
/// assert_eq!(pos.step(Direction::Left), Position::new(2, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Returns the neighbouring position one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        self + direction.offset()
    }

    /// Calculates the Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four cardinal directions, in signature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in signature order (Up, Right, Down, Left).
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit offset for this direction (y grows upwards).
    pub fn offset(self) -> Position {
        match self {
            Direction::Up => Position::new(0, 1),
            Direction::Right => Position::new(1, 0),
            Direction::Down => Position::new(0, -1),
            Direction::Left => Position::new(-1, 0),
        }
    }

    /// The direction pointing back the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Single-letter label used in signature names.
    pub fn letter(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Right => 'R',
            Direction::Down => 'D',
            Direction::Left => 'L',
        }
    }
}

/// Whether a room edge leads into its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeState {
    Open,
    Closed,
}

impl EdgeState {
    pub fn is_open(self) -> bool {
        self == EdgeState::Open
    }

    fn letter(self) -> char {
        match self {
            EdgeState::Open => 'O',
            EdgeState::Closed => 'C',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'O' => Some(EdgeState::Open),
            'C' => Some(EdgeState::Closed),
            _ => None,
        }
    }
}

/// The combination of a room's four edge states, used as a template key.
///
/// Signatures are written as `UO_RC_DO_LC`: one letter per direction
/// followed by `O` (open) or `C` (closed).
///
/// # Examples
///
/// ```
/// use roomweave::{ConnectivitySignature, EdgeState};
///
/// let sig: ConnectivitySignature = "UO_RC_DO_LC".parse().unwrap();
/// assert_eq!(sig.up, EdgeState::Open);
/// assert_eq!(sig.right, EdgeState::Closed);
/// assert_eq!(sig.to_string(), "UO_RC_DO_LC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectivitySignature {
    pub up: EdgeState,
    pub right: EdgeState,
    pub down: EdgeState,
    pub left: EdgeState,
}

impl ConnectivitySignature {
    pub fn new(up: EdgeState, right: EdgeState, down: EdgeState, left: EdgeState) -> Self {
        Self {
            up,
            right,
            down,
            left,
        }
    }

    /// The signature with every edge closed.
    pub fn all_closed() -> Self {
        Self::new(
            EdgeState::Closed,
            EdgeState::Closed,
            EdgeState::Closed,
            EdgeState::Closed,
        )
    }

    /// Edge state in a given direction.
    pub fn edge(&self, direction: Direction) -> EdgeState {
        match direction {
            Direction::Up => self.up,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::Left => self.left,
        }
    }

    /// Packs the signature into 4 bits, one per direction (set = open).
    pub fn bits(&self) -> u8 {
        Direction::ALL
            .iter()
            .enumerate()
            .filter(|&(_, &dir)| self.edge(dir).is_open())
            .fold(0u8, |acc, (i, _)| acc | (1 << i))
    }

    /// Inverse of [`ConnectivitySignature::bits`]; only the low 4 bits are read.
    pub fn from_bits(bits: u8) -> Self {
        let state = |i: u8| {
            if bits & (1 << i) != 0 {
                EdgeState::Open
            } else {
                EdgeState::Closed
            }
        };
        Self::new(state(0), state(1), state(2), state(3))
    }

    /// All 16 signatures.
    pub fn all() -> impl Iterator<Item = ConnectivitySignature> {
        (0u8..16).map(Self::from_bits)
    }
}

impl fmt::Display for ConnectivitySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Direction::ALL
            .iter()
            .map(|&dir| format!("{}{}", dir.letter(), self.edge(dir).letter()))
            .collect();
        write!(f, "{}", parts.join("_"))
    }
}

impl FromStr for ConnectivitySignature {
    type Err = RoomweaveError;

    fn from_str(s: &str) -> RoomweaveResult<Self> {
        let invalid = || RoomweaveError::InvalidConfig(format!("invalid signature '{}'", s));

        let parts: Vec<&str> = s.split('_').collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut states = [EdgeState::Closed; 4];
        for (i, (part, dir)) in parts.iter().zip(Direction::ALL).enumerate() {
            let mut chars = part.chars();
            let (Some(letter), Some(state), None) = (chars.next(), chars.next(), chars.next())
            else {
                return Err(invalid());
            };
            if letter != dir.letter() {
                return Err(invalid());
            }
            states[i] = EdgeState::from_letter(state).ok_or_else(invalid)?;
        }

        Ok(Self::new(states[0], states[1], states[2], states[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_direction_offsets_are_y_up() {
        let origin = Position::origin();
        assert_eq!(origin.step(Direction::Up), Position::new(0, 1));
        assert_eq!(origin.step(Direction::Down), Position::new(0, -1));
        assert_eq!(origin.step(Direction::Right), Position::new(1, 0));
        assert_eq!(origin.step(Direction::Left), Position::new(-1, 0));

        for dir in Direction::ALL {
            assert_eq!(origin.step(dir).step(dir.opposite()), origin);
        }
    }

    #[test]
    fn test_signature_bits_cover_all_sixteen() {
        let all: HashSet<_> = ConnectivitySignature::all().collect();
        assert_eq!(all.len(), 16);

        for sig in ConnectivitySignature::all() {
            assert_eq!(ConnectivitySignature::from_bits(sig.bits()), sig);
        }
        assert_eq!(ConnectivitySignature::all_closed().bits(), 0);
    }

    #[test]
    fn test_signature_labels() {
        assert_eq!(ConnectivitySignature::all_closed().to_string(), "UC_RC_DC_LC");

        let sig: ConnectivitySignature = "UO_RO_DC_LO".parse().unwrap();
        assert_eq!(sig.down, EdgeState::Closed);
        assert_eq!(sig.left, EdgeState::Open);

        for sig in ConnectivitySignature::all() {
            assert_eq!(sig.to_string().parse::<ConnectivitySignature>().unwrap(), sig);
        }
    }

    #[test]
    fn test_signature_rejects_malformed_labels() {
        assert!("UO_RO_DO".parse::<ConnectivitySignature>().is_err());
        assert!("RO_UO_DO_LO".parse::<ConnectivitySignature>().is_err());
        assert!("UX_RO_DO_LO".parse::<ConnectivitySignature>().is_err());
        assert!("UOO_RO_DO_LO".parse::<ConnectivitySignature>().is_err());
    }
}
