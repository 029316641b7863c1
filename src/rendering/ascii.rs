//! # ASCII Rendering
//!
//! Draws a tile surface or a room layout as plain text. The top row of the
//! level is printed first, so the output reads the way the level looks with
//! +y pointing up.

use crate::clutter::{ClutterCategory, ClutterLink};
use crate::layout::{Direction, RoomLayout};
use crate::tilemap::TileSurface;
use crate::Position;
use std::collections::HashMap;

/// Glyph for a solid tile
pub const SOLID_GLYPH: char = '#';
/// Glyph for an empty tile
pub const EMPTY_GLYPH: char = '.';
/// Glyph for the spawn point
pub const SPAWN_GLYPH: char = '@';

/// Glyph drawn on a tile holding a prop of the given category.
pub fn clutter_glyph(category: ClutterCategory) -> char {
    match category {
        ClutterCategory::Ground => '"',
        ClutterCategory::Ceiling => 'v',
        ClutterCategory::LeftWall => '>',
        ClutterCategory::RightWall => '<',
    }
}

/// Renders levels as text.
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    /// Draw props over empty tiles
    pub show_clutter: bool,
    /// Draw the spawn point
    pub show_spawn: bool,
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self {
            show_clutter: true,
            show_spawn: true,
        }
    }
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every tile of `surface`, one line per row, top row first.
    ///
    /// # Examples
    ///
    /// ```
    /// use roomweave::{AsciiRenderer, CompositeGrid, Position, TileSurface};
    ///
    /// let mut grid = CompositeGrid::new(3, 2);
    /// grid.set_tile(Position::new(0, 0), 1, 0).unwrap();
    /// let text = AsciiRenderer::new().render_surface(&grid, &[], None);
    /// assert_eq!(text, "...\n#..\n");
    /// ```
    pub fn render_surface<S: TileSurface + ?Sized>(
        &self,
        surface: &S,
        clutter: &[ClutterLink],
        spawn_point: Option<Position>,
    ) -> String {
        let (width, height) = surface.dimensions();
        let props: HashMap<Position, ClutterCategory> = if self.show_clutter {
            clutter
                .iter()
                .map(|link| (link.prop_position, link.category))
                .collect()
        } else {
            HashMap::new()
        };

        let mut out = String::with_capacity(((width + 1) * height) as usize);
        for y in (0..height as i32).rev() {
            for x in 0..width as i32 {
                let pos = Position::new(x, y);
                let glyph = if self.show_spawn && spawn_point == Some(pos) {
                    SPAWN_GLYPH
                } else if let Some(category) = props.get(&pos) {
                    clutter_glyph(*category)
                } else if surface.is_empty_at(pos) {
                    EMPTY_GLYPH
                } else {
                    SOLID_GLYPH
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    /// Renders the slot grid as 3x3 cells: closed edges are drawn as walls,
    /// open edges as gaps, and path slots get a `*` in the middle.
    pub fn render_layout(&self, layout: &RoomLayout) -> String {
        let mut out = String::new();
        for sy in (0..layout.height as i32).rev() {
            let mut rows = [String::new(), String::new(), String::new()];
            for sx in 0..layout.width as i32 {
                let Some(slot) = layout.get(Position::new(sx, sy)) else {
                    continue;
                };
                let wall = |dir: Direction, closed: char| {
                    if slot.edge(dir).is_open() {
                        ' '
                    } else {
                        closed
                    }
                };
                rows[0].extend(['+', wall(Direction::Up, '-'), '+']);
                rows[1].extend([
                    wall(Direction::Left, '|'),
                    if slot.on_path { '*' } else { ' ' },
                    wall(Direction::Right, '|'),
                ]);
                rows[2].extend(['+', wall(Direction::Down, '-'), '+']);
            }
            for row in rows {
                out.push_str(&row);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompositeGrid, EdgeState, PropHandle};

    #[test]
    fn test_surface_top_row_first() {
        let mut grid = CompositeGrid::new(2, 3);
        grid.set_tile(Position::new(1, 2), 4, 0).unwrap();
        let text = AsciiRenderer::new().render_surface(&grid, &[], None);
        assert_eq!(text, ".#\n..\n..\n");
    }

    #[test]
    fn test_clutter_and_spawn_glyphs() {
        let mut grid = CompositeGrid::new(3, 2);
        for x in 0..3 {
            grid.set_tile(Position::new(x, 0), 1, 0).unwrap();
        }
        let link = ClutterLink {
            anchor: Position::new(0, 0),
            prop_position: Position::new(0, 1),
            category: ClutterCategory::Ground,
            handle: PropHandle(0),
        };

        let renderer = AsciiRenderer::new();
        let text = renderer.render_surface(&grid, &[link], Some(Position::new(2, 1)));
        assert_eq!(text, "\".@\n###\n");

        let plain = AsciiRenderer {
            show_clutter: false,
            show_spawn: false,
        };
        assert_eq!(
            plain.render_surface(&grid, &[link], Some(Position::new(2, 1))),
            "...\n###\n"
        );
    }

    #[test]
    fn test_layout_overview() {
        let mut layout = RoomLayout::new(2, 1);
        layout.get_mut(Position::new(0, 0)).unwrap().on_path = true;
        layout
            .get_mut(Position::new(0, 0))
            .unwrap()
            .set_edge(Direction::Right, EdgeState::Open);
        layout
            .get_mut(Position::new(1, 0))
            .unwrap()
            .set_edge(Direction::Left, EdgeState::Open);

        let text = AsciiRenderer::new().render_layout(&layout);
        assert_eq!(text, "+-++-+\n|*   |\n+-++-+\n");
    }
}
