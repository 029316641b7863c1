//! # Tilemap Module
//!
//! The tile surface that room templates are composited into.
//!
//! [`TileSurface`] is the seam to whatever displays the level; the generator
//! only needs to set, read and clear tiles. [`CompositeGrid`] is the
//! in-memory surface used by default and in tests.

pub mod compositor;

pub use compositor::*;

use crate::config::{EMPTY_TILE, TEMPLATE_HEIGHT, TEMPLATE_WIDTH};
use crate::{Position, RoomweaveError, RoomweaveResult};
use serde::{Deserialize, Serialize};

/// A writable grid of tile ids.
///
/// Coordinates are integer tile cells with y growing upwards. Writes
/// overwrite whatever was there. [`EMPTY_TILE`] is never written by the
/// generator; cells never written read back as empty.
pub trait TileSurface {
    /// Sets the tile at `pos`, painted with `brush_id`.
    fn set_tile(&mut self, pos: Position, tile_id: u32, brush_id: u32) -> RoomweaveResult<()>;

    /// The tile at `pos`; cells outside the surface read as empty.
    fn tile_at(&self, pos: Position) -> u32;

    /// Empties the cell at `pos`, returning the tile that was there.
    fn remove_tile(&mut self, pos: Position) -> RoomweaveResult<u32>;

    /// Removes every tile and resizes the surface to `width` × `height` cells.
    fn clear(&mut self, width: u32, height: u32);

    /// Surface size in tiles.
    fn dimensions(&self) -> (u32, u32);

    /// Called after each batch of writes so a renderer can rebuild its mesh.
    fn update_mesh(&mut self) {}

    /// Whether the tile at `pos` is empty.
    fn is_empty_at(&self, pos: Position) -> bool {
        self.tile_at(pos) == EMPTY_TILE
    }
}

/// The in-memory composite of all placed room templates.
///
/// # Examples
///
/// ```
/// use roomweave::{CompositeGrid, Position, TileSurface};
///
/// let mut grid = CompositeGrid::for_rooms(2, 1);
/// assert_eq!(grid.dimensions(), (64, 16));
///
/// grid.set_tile(Position::new(40, 3), 7, 0).unwrap();
/// assert_eq!(grid.tile_at(Position::new(40, 3)), 7);
/// assert!(grid.is_empty_at(Position::new(0, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeGrid {
    width: u32,
    height: u32,
    /// Row-major tile ids
    tiles: Vec<u32>,
    /// Number of times the mesh was rebuilt
    mesh_updates: usize,
}

impl CompositeGrid {
    /// Creates an empty surface of `width` × `height` tiles.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![EMPTY_TILE; (width * height) as usize],
            mesh_updates: 0,
        }
    }

    /// Creates an empty surface large enough for a grid of room slots.
    pub fn for_rooms(room_width: u32, room_height: u32) -> Self {
        Self::new(
            room_width * TEMPLATE_WIDTH as u32,
            room_height * TEMPLATE_HEIGHT as u32,
        )
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Number of non-empty tiles.
    pub fn placed_count(&self) -> usize {
        self.tiles.iter().filter(|&&t| t != EMPTY_TILE).count()
    }

    pub fn mesh_updates(&self) -> usize {
        self.mesh_updates
    }

    /// Every position in row-major order (y outer, x inner).
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}

impl TileSurface for CompositeGrid {
    fn set_tile(&mut self, pos: Position, tile_id: u32, _brush_id: u32) -> RoomweaveResult<()> {
        let index = self
            .index(pos)
            .ok_or(RoomweaveError::InvalidPosition { x: pos.x, y: pos.y })?;
        self.tiles[index] = tile_id;
        Ok(())
    }

    fn tile_at(&self, pos: Position) -> u32 {
        self.index(pos).map(|i| self.tiles[i]).unwrap_or(EMPTY_TILE)
    }

    fn remove_tile(&mut self, pos: Position) -> RoomweaveResult<u32> {
        let index = self
            .index(pos)
            .ok_or(RoomweaveError::InvalidPosition { x: pos.x, y: pos.y })?;
        Ok(std::mem::replace(&mut self.tiles[index], EMPTY_TILE))
    }

    fn clear(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.tiles = vec![EMPTY_TILE; (width * height) as usize];
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn update_mesh(&mut self) {
        self.mesh_updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = CompositeGrid::new(4, 3);
        assert_eq!(grid.placed_count(), 0);
        assert!(grid.positions().all(|p| grid.is_empty_at(p)));
        assert_eq!(grid.positions().count(), 12);
    }

    #[test]
    fn test_set_tile_overwrites() {
        let mut grid = CompositeGrid::new(4, 4);
        let pos = Position::new(2, 1);
        grid.set_tile(pos, 3, 0).unwrap();
        grid.set_tile(pos, 9, 0).unwrap();
        assert_eq!(grid.tile_at(pos), 9);
        assert_eq!(grid.placed_count(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = CompositeGrid::new(4, 4);
        assert!(grid.set_tile(Position::new(4, 0), 1, 0).is_err());
        assert!(grid.set_tile(Position::new(0, -1), 1, 0).is_err());
        assert_eq!(grid.tile_at(Position::new(-1, 2)), EMPTY_TILE);
        assert!(grid.remove_tile(Position::new(10, 10)).is_err());
    }

    #[test]
    fn test_positions_are_row_major() {
        let grid = CompositeGrid::new(2, 2);
        let order: Vec<Position> = grid.positions().collect();
        assert_eq!(
            order,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_clear_resizes() {
        let mut grid = CompositeGrid::new(2, 2);
        grid.set_tile(Position::new(1, 1), 5, 0).unwrap();
        grid.clear(3, 1);
        assert_eq!(grid.dimensions(), (3, 1));
        assert_eq!(grid.placed_count(), 0);
    }
}
