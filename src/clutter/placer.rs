//! # Clutter Placement
//!
//! Scans a finished tile surface for empty tiles bordering solid ones and
//! spawns props there.
//!
//! Each empty tile gets at most one prop. The first category whose
//! neighbour pattern matches is the only one considered for that tile,
//! checked in the order ground, ceiling, left wall, right wall. Its spawn
//! chance is then rolled; a failed roll leaves the tile bare.

use super::{ClutterCategory, ClutterLink, ClutterRegistry, ClutterTheme, PropSpawner, WorldPosition};
use crate::utils::roll_chance;
use crate::{Direction, Position, TileSurface};
use rand::rngs::StdRng;

/// State of a tile next to a candidate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    /// Empty and free of clutter (also used outside the surface)
    Free,
    /// Holds a tile
    Solid,
    /// Empty but already holding a prop
    Cluttered,
}

impl Occupancy {
    /// Numeric code: 0 free, 1 solid, -1 cluttered.
    pub fn code(self) -> i8 {
        match self {
            Occupancy::Free => 0,
            Occupancy::Solid => 1,
            Occupancy::Cluttered => -1,
        }
    }
}

/// Occupancy of the four neighbours of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    pub up: Occupancy,
    pub right: Occupancy,
    pub down: Occupancy,
    pub left: Occupancy,
}

/// Per-category spawn chances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClutterChances {
    pub ground: f32,
    pub ceiling: f32,
    /// Shared by both wall categories
    pub wall: f32,
}

impl ClutterChances {
    pub fn for_category(&self, category: ClutterCategory) -> f32 {
        match category {
            ClutterCategory::Ground => self.ground,
            ClutterCategory::Ceiling => self.ceiling,
            ClutterCategory::LeftWall | ClutterCategory::RightWall => self.wall,
        }
    }
}

/// Places clutter from one theme onto a surface.
#[derive(Debug, Clone)]
pub struct ClutterPlacer<'a> {
    theme: &'a ClutterTheme,
    chances: ClutterChances,
    tile_size: f32,
}

impl<'a> ClutterPlacer<'a> {
    pub fn new(theme: &'a ClutterTheme, chances: ClutterChances, tile_size: f32) -> Self {
        Self {
            theme,
            chances,
            tile_size,
        }
    }

    /// Visits every tile row by row and spawns props; returns how many spawned.
    pub fn scan<S, P>(
        &self,
        surface: &S,
        registry: &mut ClutterRegistry,
        spawner: &mut P,
        rng: &mut StdRng,
    ) -> usize
    where
        S: TileSurface + ?Sized,
        P: PropSpawner + ?Sized,
    {
        let (width, height) = surface.dimensions();
        let mut spawned = 0;

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let pos = Position::new(x, y);
                if !surface.is_empty_at(pos) || registry.is_cluttered(pos) {
                    continue;
                }
                if self.try_place(surface, registry, spawner, rng, pos) {
                    spawned += 1;
                }
            }
        }

        log::debug!("Clutter pass spawned {} props", spawned);
        spawned
    }

    fn try_place<S, P>(
        &self,
        surface: &S,
        registry: &mut ClutterRegistry,
        spawner: &mut P,
        rng: &mut StdRng,
        pos: Position,
    ) -> bool
    where
        S: TileSurface + ?Sized,
        P: PropSpawner + ?Sized,
    {
        let neighborhood = neighborhood(surface, registry, pos);
        let Some((category, anchor)) = match_category(&neighborhood, registry, pos) else {
            return false;
        };

        if !roll_chance(self.chances.for_category(category), rng) {
            return false;
        }

        let Some(asset) = self.theme.collection(category).pick(rng) else {
            log::warn!("No {:?} clutter could be picked for {}", category, pos);
            return false;
        };

        let handle = spawner.spawn(asset, self.world_position(pos));
        let linked = registry.link(ClutterLink {
            anchor,
            prop_position: pos,
            category,
            handle,
        });
        if !linked {
            spawner.despawn(handle);
        }
        linked
    }

    fn world_position(&self, pos: Position) -> WorldPosition {
        WorldPosition {
            x: pos.x as f32 * self.tile_size,
            y: pos.y as f32 * self.tile_size,
        }
    }
}

/// Classifies the four neighbours of `pos`.
pub fn neighborhood<S: TileSurface + ?Sized>(
    surface: &S,
    registry: &ClutterRegistry,
    pos: Position,
) -> Neighborhood {
    let occupancy = |direction: Direction| {
        let target = pos.step(direction);
        if registry.is_cluttered(target) {
            Occupancy::Cluttered
        } else if surface.is_empty_at(target) {
            Occupancy::Free
        } else {
            Occupancy::Solid
        }
    };

    Neighborhood {
        up: occupancy(Direction::Up),
        right: occupancy(Direction::Right),
        down: occupancy(Direction::Down),
        left: occupancy(Direction::Left),
    }
}

/// First matching category for an empty tile, with the anchor it would use.
///
/// The wall categories are named after the side the solid tile is on: a
/// left-wall prop has solid ground to its left and free space to its right.
pub fn match_category(
    n: &Neighborhood,
    registry: &ClutterRegistry,
    pos: Position,
) -> Option<(ClutterCategory, Position)> {
    use Occupancy::{Free, Solid};

    let candidates = [
        (ClutterCategory::Ground, n.up == Free && n.down == Solid, Direction::Down),
        (ClutterCategory::Ceiling, n.up == Solid && n.down == Free, Direction::Up),
        (ClutterCategory::LeftWall, n.right == Free && n.left == Solid, Direction::Left),
        (ClutterCategory::RightWall, n.left == Free && n.right == Solid, Direction::Right),
    ];

    candidates
        .into_iter()
        .find(|&(_, matches, anchor_dir)| matches && !registry.is_anchor(pos.step(anchor_dir)))
        .map(|(category, _, anchor_dir)| (category, pos.step(anchor_dir)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClutterCollection, CompositeGrid, RecordingSpawner};
    use rand::SeedableRng;

    fn theme() -> ClutterTheme {
        ClutterTheme {
            ground: ClutterCollection::new(&[("grass", 1.0)]),
            ceiling: ClutterCollection::new(&[("stalactite", 1.0)]),
            left_wall: ClutterCollection::new(&[("vine_left", 1.0)]),
            right_wall: ClutterCollection::new(&[("vine_right", 1.0)]),
        }
    }

    fn always() -> ClutterChances {
        ClutterChances {
            ground: 1.0,
            ceiling: 1.0,
            wall: 1.0,
        }
    }

    /// Fills a row of solid tiles at `y` from `x0` to `x1` exclusive.
    fn floor(grid: &mut CompositeGrid, y: i32, x0: i32, x1: i32) {
        for x in x0..x1 {
            grid.set_tile(Position::new(x, y), 1, 0).unwrap();
        }
    }

    #[test]
    fn test_ground_clutter_links_anchor_below() {
        let mut grid = CompositeGrid::new(3, 3);
        floor(&mut grid, 0, 0, 3);
        let theme = theme();
        let placer = ClutterPlacer::new(&theme, always(), 2.0);
        let mut registry = ClutterRegistry::new();
        let mut spawner = RecordingSpawner::new();
        let mut rng = StdRng::seed_from_u64(1);

        let spawned = placer.scan(&grid, &mut registry, &mut spawner, &mut rng);
        assert_eq!(spawned, 3);

        for x in 0..3 {
            let link = registry.get(Position::new(x, 0)).unwrap();
            assert_eq!(link.category, ClutterCategory::Ground);
            assert_eq!(link.prop_position, Position::new(x, 1));
            let prop = spawner.get(link.handle).unwrap();
            assert_eq!(prop.position.x, x as f32 * 2.0);
            assert_eq!(prop.position.y, 2.0);
        }
    }

    #[test]
    fn test_row_order_decides_shared_anchor() {
        // (1, 0) is scanned before (0, 1), so the solid corner goes to the
        // wall prop and the ground candidate above it finds its anchor taken.
        let mut grid = CompositeGrid::new(2, 2);
        grid.set_tile(Position::new(0, 0), 1, 0).unwrap();
        let theme = theme();
        let mut registry = ClutterRegistry::new();
        let mut spawner = RecordingSpawner::new();
        let mut rng = StdRng::seed_from_u64(6);

        let spawned = ClutterPlacer::new(&theme, always(), 1.0).scan(
            &grid,
            &mut registry,
            &mut spawner,
            &mut rng,
        );
        assert_eq!(spawned, 1);
        let link = registry.get(Position::new(0, 0)).unwrap();
        assert_eq!(link.category, ClutterCategory::LeftWall);
        assert_eq!(link.prop_position, Position::new(1, 0));
        assert!(!registry.is_cluttered(Position::new(0, 1)));
    }

    #[test]
    fn test_ceiling_clutter() {
        let mut grid = CompositeGrid::new(1, 3);
        grid.set_tile(Position::new(0, 2), 1, 0).unwrap();
        let theme = theme();
        let mut registry = ClutterRegistry::new();
        let mut spawner = RecordingSpawner::new();
        let mut rng = StdRng::seed_from_u64(1);

        ClutterPlacer::new(&theme, always(), 1.0).scan(&grid, &mut registry, &mut spawner, &mut rng);

        let link = registry.get(Position::new(0, 2)).unwrap();
        assert_eq!(link.category, ClutterCategory::Ceiling);
        assert_eq!(link.prop_position, Position::new(0, 1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_wall_categories_follow_solid_side() {
        let grid_with = |solid: Position| {
            let mut grid = CompositeGrid::new(3, 1);
            grid.set_tile(solid, 1, 0).unwrap();
            grid
        };
        let registry = ClutterRegistry::new();

        // Solid on the left of (1,0): left-wall clutter anchored at (0,0).
        let grid = grid_with(Position::new(0, 0));
        let n = neighborhood(&grid, &registry, Position::new(1, 0));
        assert_eq!(n.left, Occupancy::Solid);
        assert_eq!(
            match_category(&n, &registry, Position::new(1, 0)),
            Some((ClutterCategory::LeftWall, Position::new(0, 0)))
        );

        let grid = grid_with(Position::new(2, 0));
        let n = neighborhood(&grid, &registry, Position::new(1, 0));
        assert_eq!(
            match_category(&n, &registry, Position::new(1, 0)),
            Some((ClutterCategory::RightWall, Position::new(2, 0)))
        );
    }

    #[test]
    fn test_ground_wins_over_walls() {
        let mut grid = CompositeGrid::new(3, 3);
        grid.set_tile(Position::new(1, 0), 1, 0).unwrap();
        grid.set_tile(Position::new(0, 1), 1, 0).unwrap();
        let registry = ClutterRegistry::new();
        let n = neighborhood(&grid, &registry, Position::new(1, 1));
        assert_eq!(
            match_category(&n, &registry, Position::new(1, 1)).map(|(c, _)| c),
            Some(ClutterCategory::Ground)
        );
    }

    #[test]
    fn test_taken_anchor_blocks_category() {
        let mut grid = CompositeGrid::new(3, 3);
        grid.set_tile(Position::new(1, 0), 1, 0).unwrap();
        let mut registry = ClutterRegistry::new();
        registry.link(ClutterLink {
            anchor: Position::new(1, 0),
            prop_position: Position::new(2, 0),
            category: ClutterCategory::RightWall,
            handle: crate::PropHandle(0),
        });

        let n = neighborhood(&grid, &registry, Position::new(1, 1));
        assert!(match_category(&n, &registry, Position::new(1, 1)).is_none());
    }

    #[test]
    fn test_cluttered_neighbours_are_not_free() {
        let mut grid = CompositeGrid::new(1, 3);
        grid.set_tile(Position::new(0, 0), 1, 0).unwrap();
        let mut registry = ClutterRegistry::new();
        registry.link(ClutterLink {
            anchor: Position::new(0, 0),
            prop_position: Position::new(0, 1),
            category: ClutterCategory::Ground,
            handle: crate::PropHandle(0),
        });

        let n = neighborhood(&grid, &registry, Position::new(0, 2));
        assert_eq!(n.down, Occupancy::Cluttered);
        assert_eq!(n.down.code(), -1);
        assert_eq!(n.up, Occupancy::Free);
    }

    #[test]
    fn test_zero_chance_spawns_nothing() {
        let mut grid = CompositeGrid::new(4, 4);
        floor(&mut grid, 0, 0, 4);
        let theme = theme();
        let chances = ClutterChances {
            ground: 0.0,
            ceiling: 0.0,
            wall: 0.0,
        };
        let mut registry = ClutterRegistry::new();
        let mut spawner = RecordingSpawner::new();
        let mut rng = StdRng::seed_from_u64(9);

        let spawned =
            ClutterPlacer::new(&theme, chances, 1.0).scan(&grid, &mut registry, &mut spawner, &mut rng);
        assert_eq!(spawned, 0);
        assert_eq!(spawner.live_count(), 0);
    }

    #[test]
    fn test_empty_collection_is_skipped() {
        let mut grid = CompositeGrid::new(2, 2);
        floor(&mut grid, 0, 0, 2);
        let theme = ClutterTheme::default();
        let mut registry = ClutterRegistry::new();
        let mut spawner = RecordingSpawner::new();
        let mut rng = StdRng::seed_from_u64(9);

        let spawned =
            ClutterPlacer::new(&theme, always(), 1.0).scan(&grid, &mut registry, &mut spawner, &mut rng);
        assert_eq!(spawned, 0);
        assert!(registry.is_empty());
    }
}
