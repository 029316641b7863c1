//! # Room Slots
//!
//! The grid of room slots produced by path generation and connection
//! resolution.

use super::{ConnectivitySignature, Direction, EdgeState, Position};
use serde::{Deserialize, Serialize};

/// One cell of the room grid.
///
/// Each slot becomes one room template in the final level. Edge states
/// describe which neighbours the room opens into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSlot {
    /// Grid coordinate of this slot
    pub position: Position,
    pub up: EdgeState,
    pub right: EdgeState,
    pub down: EdgeState,
    pub left: EdgeState,
    /// Whether the main path passes through this slot
    pub on_path: bool,
}

impl RoomSlot {
    /// Creates a slot with every edge closed.
    pub fn closed(position: Position) -> Self {
        Self {
            position,
            up: EdgeState::Closed,
            right: EdgeState::Closed,
            down: EdgeState::Closed,
            left: EdgeState::Closed,
            on_path: false,
        }
    }

    pub fn edge(&self, direction: Direction) -> EdgeState {
        match direction {
            Direction::Up => self.up,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::Left => self.left,
        }
    }

    pub fn set_edge(&mut self, direction: Direction, state: EdgeState) {
        match direction {
            Direction::Up => self.up = state,
            Direction::Right => self.right = state,
            Direction::Down => self.down = state,
            Direction::Left => self.left = state,
        }
    }

    /// The template lookup key for this slot.
    pub fn signature(&self) -> ConnectivitySignature {
        ConnectivitySignature::new(self.up, self.right, self.down, self.left)
    }
}

/// A width × height grid of [`RoomSlot`]s, stored column-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub width: u32,
    pub height: u32,
    slots: Vec<RoomSlot>,
    /// Path cells in walk order, entry first
    pub path: Vec<Position>,
}

impl RoomLayout {
    /// Creates a layout of closed, off-path slots.
    pub fn new(width: u32, height: u32) -> Self {
        let mut slots = Vec::with_capacity((width * height) as usize);
        for x in 0..width as i32 {
            for y in 0..height as i32 {
                slots.push(RoomSlot::closed(Position::new(x, y)));
            }
        }

        Self {
            width,
            height,
            slots,
            path: Vec::new(),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.x as usize * self.height as usize + pos.y as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&RoomSlot> {
        self.index(pos).map(|i| &self.slots[i])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut RoomSlot> {
        self.index(pos).map(move |i| &mut self.slots[i])
    }

    /// Slots in increasing (x, y) order.
    pub fn slots(&self) -> &[RoomSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [RoomSlot] {
        &mut self.slots
    }

    /// The neighbouring slot in `direction`, if inside the grid.
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Option<&RoomSlot> {
        self.get(pos.step(direction))
    }

    /// Whether `pos` touches the grid boundary on the side of `direction`.
    pub fn is_boundary_edge(&self, pos: Position, direction: Direction) -> bool {
        !self.contains(pos.step(direction))
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }
}
