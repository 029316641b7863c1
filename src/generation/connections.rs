//! # Connection Resolution
//!
//! Turns a walked [`PathGrid`] into a [`RoomLayout`] with an open/closed
//! state on every room edge.
//!
//! Resolution runs in four passes over the grid, in increasing (x, y) order:
//!
//! 1. every edge of every slot is randomised
//! 2. edges on the grid boundary are closed
//! 3. edges between two path slots are opened
//! 4. each slot copies its Up edge from the Down edge of the slot above and
//!    its Left edge from the Right edge of the slot to the left
//!
//! The last pass makes Down and Right authoritative, so neighbouring slots
//! always agree about the edge they share.

use crate::{Direction, EdgeState, PathGrid, Position, RoomLayout, RoomweaveError, RoomweaveResult};
use rand::rngs::StdRng;
use rand::Rng;

/// Assigns edge states to every room slot.
#[derive(Debug, Clone, Default)]
pub struct ConnectionResolver;

impl ConnectionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Builds the room layout for a walked path grid.
    pub fn resolve(&self, grid: &PathGrid, rng: &mut StdRng) -> RoomLayout {
        let mut layout = RoomLayout::new(grid.width, grid.height);
        layout.path = grid.path.clone();

        self.randomize_edges(&mut layout, rng);
        self.close_boundary_edges(&mut layout);
        self.open_path_edges(&mut layout, grid);
        self.match_neighbor_edges(&mut layout);

        log::debug!(
            "Resolved connections for {}x{} layout ({} path slots)",
            layout.width,
            layout.height,
            layout.path_len()
        );
        layout
    }

    fn randomize_edges(&self, layout: &mut RoomLayout, rng: &mut StdRng) {
        for slot in layout.slots_mut() {
            for direction in Direction::ALL {
                slot.set_edge(direction, random_edge(rng));
            }
        }
    }

    fn close_boundary_edges(&self, layout: &mut RoomLayout) {
        let width = layout.width as i32;
        let height = layout.height as i32;
        for slot in layout.slots_mut() {
            let pos = slot.position;
            if pos.x == 0 {
                slot.left = EdgeState::Closed;
            }
            if pos.y == 0 {
                slot.down = EdgeState::Closed;
            }
            if pos.x == width - 1 {
                slot.right = EdgeState::Closed;
            }
            if pos.y == height - 1 {
                slot.up = EdgeState::Closed;
            }
        }
    }

    fn open_path_edges(&self, layout: &mut RoomLayout, grid: &PathGrid) {
        for slot in layout.slots_mut() {
            if !grid.is_on_path(slot.position) {
                continue;
            }
            slot.on_path = true;
            for direction in Direction::ALL {
                // Out-of-bounds neighbours report index 0.
                if grid.is_on_path(slot.position.step(direction)) {
                    slot.set_edge(direction, EdgeState::Open);
                }
            }
        }
    }

    fn match_neighbor_edges(&self, layout: &mut RoomLayout) {
        let positions: Vec<Position> = layout.slots().iter().map(|s| s.position).collect();
        for pos in positions {
            let above = layout.neighbor(pos, Direction::Up).map(|s| s.down);
            let left = layout.neighbor(pos, Direction::Left).map(|s| s.right);

            if let Some(slot) = layout.get_mut(pos) {
                if let Some(state) = above {
                    slot.up = state;
                }
                if let Some(state) = left {
                    slot.left = state;
                }
            }
        }
    }

    /// Checks the boundary and shared-edge invariants of a resolved layout.
    pub fn verify(&self, layout: &RoomLayout) -> RoomweaveResult<()> {
        for slot in layout.slots() {
            for direction in Direction::ALL {
                let edge = slot.edge(direction);
                match layout.neighbor(slot.position, direction) {
                    None if edge.is_open() => {
                        return Err(RoomweaveError::InvalidState(format!(
                            "slot {} is open to the {:?} grid boundary",
                            slot.position, direction
                        )));
                    }
                    Some(other) if other.edge(direction.opposite()) != edge => {
                        return Err(RoomweaveError::InvalidState(format!(
                            "slots {} and {} disagree on their shared edge",
                            slot.position, other.position
                        )));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

fn random_edge(rng: &mut StdRng) -> EdgeState {
    if rng.gen_bool(0.5) {
        EdgeState::Open
    } else {
        EdgeState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathWalker;
    use rand::SeedableRng;

    fn resolve(width: u32, height: u32, seed: u64) -> RoomLayout {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = PathWalker::new().walk(width, height, &mut rng).unwrap();
        ConnectionResolver::new().resolve(&grid, &mut rng)
    }

    #[test]
    fn test_boundary_edges_are_closed() {
        for seed in 0..30 {
            let layout = resolve(5, 4, seed);
            for slot in layout.slots() {
                for direction in Direction::ALL {
                    if layout.is_boundary_edge(slot.position, direction) {
                        assert_eq!(slot.edge(direction), EdgeState::Closed);
                    }
                }
            }
        }
    }

    #[test]
    fn test_shared_edges_agree() {
        let resolver = ConnectionResolver::new();
        for seed in 0..30 {
            let layout = resolve(6, 5, seed);
            assert!(resolver.verify(&layout).is_ok());

            for slot in layout.slots() {
                if let Some(above) = layout.neighbor(slot.position, Direction::Up) {
                    assert_eq!(slot.up, above.down);
                }
                if let Some(left) = layout.neighbor(slot.position, Direction::Left) {
                    assert_eq!(slot.left, left.right);
                }
            }
        }
    }

    #[test]
    fn test_consecutive_path_slots_are_connected() {
        for seed in 0..30 {
            let layout = resolve(5, 5, seed);
            for pair in layout.path.windows(2) {
                let a = layout.get(pair[0]).unwrap();
                let direction = Direction::ALL
                    .into_iter()
                    .find(|&d| pair[0].step(d) == pair[1])
                    .unwrap();
                assert!(a.on_path);
                assert_eq!(a.edge(direction), EdgeState::Open);
            }
        }
    }

    #[test]
    fn test_on_path_flags_match_path() {
        let layout = resolve(4, 4, 11);
        let on_path = layout.slots().iter().filter(|s| s.on_path).count();
        assert_eq!(on_path, layout.path_len());
    }

    #[test]
    fn test_verify_detects_mismatch() {
        let mut layout = resolve(3, 3, 5);
        let pos = Position::new(1, 1);
        let flipped = match layout.get(pos).unwrap().up {
            EdgeState::Open => EdgeState::Closed,
            EdgeState::Closed => EdgeState::Open,
        };
        layout.get_mut(pos).unwrap().up = flipped;
        assert!(ConnectionResolver::new().verify(&layout).is_err());
    }

    #[test]
    fn test_single_slot_is_fully_closed() {
        let layout = resolve(1, 1, 0);
        let slot = layout.get(Position::origin()).unwrap();
        assert!(slot.on_path);
        assert_eq!(slot.signature(), crate::ConnectivitySignature::all_closed());
    }
}
