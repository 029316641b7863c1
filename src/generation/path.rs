//! # Path Generation
//!
//! A random walk across the room grid from the left column to the right
//! column. Every cell the walk visits gets an increasing index; unvisited
//! cells keep index `0`.
//!
//! The walk never moves left. At each step it draws one of Down, Right or Up
//! and then tries directions in the cyclic order Down → Right → Up starting
//! from the drawn one, taking the first that stays in bounds and reaches an
//! unvisited cell. Trying Right from the last column ends the walk.

use crate::config::MAX_GRID_SIDE;
use crate::{
    Direction, GenerationConfig, Generator, Position, RoomweaveError, RoomweaveResult,
};
use rand::rngs::StdRng;
use rand::Rng;

/// Directions the walker may take, in cyclic priority order.
const WALK_ORDER: [Direction; 3] = [Direction::Down, Direction::Right, Direction::Up];

/// The result of a path walk: per-cell visit indices and the ordered path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGrid {
    pub width: u32,
    pub height: u32,
    /// Visit index per cell, column-major; 0 = not on the path
    indices: Vec<u32>,
    /// Visited cells in walk order
    pub path: Vec<Position>,
}

impl PathGrid {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            indices: vec![0; (width * height) as usize],
            path: Vec::new(),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Visit index of a cell; out-of-bounds cells report 0.
    pub fn index_at(&self, pos: Position) -> u32 {
        if self.contains(pos) {
            self.indices[pos.x as usize * self.height as usize + pos.y as usize]
        } else {
            0
        }
    }

    pub fn is_on_path(&self, pos: Position) -> bool {
        self.index_at(pos) > 0
    }

    fn mark(&mut self, pos: Position) {
        let index = self.path.len() as u32 + 1;
        self.indices[pos.x as usize * self.height as usize + pos.y as usize] = index;
        self.path.push(pos);
    }

    /// First cell of the walk (always in column 0).
    pub fn entry(&self) -> Option<Position> {
        self.path.first().copied()
    }

    /// Last cell of the walk (always in the last column).
    pub fn exit(&self) -> Option<Position> {
        self.path.last().copied()
    }
}

/// Outcome of scanning the candidate directions from one cell.
enum WalkStep {
    Move(Position),
    Exit,
}

/// Random-walk path generator.
#[derive(Debug, Clone, Default)]
pub struct PathWalker;

impl PathWalker {
    pub fn new() -> Self {
        Self
    }

    /// Walks a grid of the given size.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use roomweave::PathWalker;
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let grid = PathWalker::new().walk(4, 3, &mut rng).unwrap();
    /// assert_eq!(grid.entry().unwrap().x, 0);
    /// assert_eq!(grid.exit().unwrap().x, 3);
    /// ```
    pub fn walk(&self, width: u32, height: u32, rng: &mut StdRng) -> RoomweaveResult<PathGrid> {
        if width == 0 || height == 0 || width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
            return Err(RoomweaveError::InvalidConfig(format!(
                "path grid must be between 1x1 and {max}x{max}, got {}x{}",
                width,
                height,
                max = MAX_GRID_SIDE
            )));
        }

        let mut grid = PathGrid::new(width, height);
        let start = Position::new(0, rng.gen_range(0..height as i32));
        grid.mark(start);
        self.continue_walk(grid, start, rng)
    }

    /// Walks on from `current` until the exit is reached or no move is left.
    fn continue_walk(
        &self,
        mut grid: PathGrid,
        mut current: Position,
        rng: &mut StdRng,
    ) -> RoomweaveResult<PathGrid> {
        // Each move visits a fresh cell, so the walk cannot outlast the grid.
        let max_steps = grid.indices.len();
        for _ in 0..max_steps {
            let start = rng.gen_range(0..WALK_ORDER.len());
            match self.choose_step(&grid, current, start) {
                Some(WalkStep::Exit) => {
                    log::debug!(
                        "Path walk exited at {} after {} cells",
                        current,
                        grid.path.len()
                    );
                    return Ok(grid);
                }
                Some(WalkStep::Move(next)) => {
                    grid.mark(next);
                    current = next;
                }
                None => break,
            }
        }

        Err(RoomweaveError::PathGenerationStalled {
            x: current.x,
            y: current.y,
            steps: grid.path.len(),
        })
    }

    /// Scans the cyclic direction order beginning at `start`.
    fn choose_step(&self, grid: &PathGrid, current: Position, start: usize) -> Option<WalkStep> {
        for offset in 0..WALK_ORDER.len() {
            let direction = WALK_ORDER[(start + offset) % WALK_ORDER.len()];
            if direction == Direction::Right && current.x == grid.width as i32 - 1 {
                return Some(WalkStep::Exit);
            }

            let next = current.step(direction);
            if grid.contains(next) && !grid.is_on_path(next) {
                return Some(WalkStep::Move(next));
            }
        }
        None
    }
}

impl Generator<PathGrid> for PathWalker {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> RoomweaveResult<PathGrid> {
        config.validate()?;
        let width = config.width_range.sample(rng);
        let height = config.height_range.sample(rng);
        self.walk(width, height, rng)
    }

    fn validate(&self, grid: &PathGrid, _config: &GenerationConfig) -> RoomweaveResult<()> {
        let (Some(entry), Some(exit)) = (grid.entry(), grid.exit()) else {
            return Err(RoomweaveError::InvalidState("path is empty".to_string()));
        };
        if entry.x != 0 {
            return Err(RoomweaveError::InvalidState(format!(
                "path starts at {} instead of column 0",
                entry
            )));
        }
        if exit.x != grid.width as i32 - 1 {
            return Err(RoomweaveError::InvalidState(format!(
                "path ends at {} instead of the last column",
                exit
            )));
        }
        for pair in grid.path.windows(2) {
            if pair[0].manhattan_distance(pair[1]) != 1 {
                return Err(RoomweaveError::InvalidState(format!(
                    "path jumps from {} to {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "PathWalker"
    }
}
