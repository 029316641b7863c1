//! # Built-in Templates
//!
//! A small procedural template set so levels can be generated without any
//! template files on disk. Every theme gets two rooms per signature: a plain
//! hall and a hall with mutable ledges.

use super::{RoomTemplate, TemplateStore, Theme, TileRecord};
use crate::config::{EMPTY_TILE, TEMPLATE_HEIGHT, TEMPLATE_WIDTH};
use crate::{ConnectivitySignature, Direction};

/// Themes covered by [`TemplateStore::builtin`].
pub const BUILTIN_THEMES: [&str; 3] = ["Theme1", "Theme2", "Theme3"];

/// Doorways span these columns on the top and bottom walls.
const DOOR_COLUMNS: std::ops::Range<i32> = 13..19;
/// Doorways span these rows on the left and right walls.
const DOOR_ROWS: std::ops::Range<i32> = 1..6;

const WALL_TILE: u32 = 1;
const LEDGE_TILE: u32 = 2;

impl TemplateStore {
    /// A store holding the built-in template set for [`BUILTIN_THEMES`].
    pub fn builtin() -> Self {
        let mut store = Self::new();
        for (i, name) in BUILTIN_THEMES.iter().enumerate() {
            let theme = Theme::from(*name);
            let tile_base = i as u32 * 10;
            for signature in ConnectivitySignature::all() {
                for ledges in [false, true] {
                    store.groups
                        .entry((theme.clone(), signature))
                        .or_default()
                        .push(builtin_room(&theme, signature, tile_base, ledges));
                }
            }
        }
        store
    }
}

/// Builds one walled room with doorways on its open edges.
pub fn builtin_room(
    theme: &Theme,
    signature: ConnectivitySignature,
    tile_base: u32,
    ledges: bool,
) -> RoomTemplate {
    let mut records = Vec::with_capacity((TEMPLATE_WIDTH * TEMPLATE_HEIGHT) as usize);

    for x in 0..TEMPLATE_WIDTH {
        for y in 0..TEMPLATE_HEIGHT {
            let record = if is_wall(signature, x, y) {
                TileRecord::new(tile_base + WALL_TILE, x, y)
            } else if ledges && is_ledge(x, y) {
                TileRecord::new(tile_base + LEDGE_TILE, x, y).mutable()
            } else {
                TileRecord::new(EMPTY_TILE, x, y)
            };
            records.push(record);
        }
    }

    let identifier = if ledges { "ledges" } else { "hall" };
    RoomTemplate::new(theme.clone(), signature, identifier, records)
}

fn is_wall(signature: ConnectivitySignature, x: i32, y: i32) -> bool {
    let open = |d: Direction| signature.edge(d).is_open();

    let top = y == TEMPLATE_HEIGHT - 1;
    let bottom = y == 0;
    let left = x == 0;
    let right = x == TEMPLATE_WIDTH - 1;

    if top && open(Direction::Up) && DOOR_COLUMNS.contains(&x) {
        return false;
    }
    if bottom && open(Direction::Down) && DOOR_COLUMNS.contains(&x) {
        return false;
    }
    if left && open(Direction::Left) && DOOR_ROWS.contains(&y) {
        return false;
    }
    if right && open(Direction::Right) && DOOR_ROWS.contains(&y) {
        return false;
    }
    top || bottom || left || right
}

fn is_ledge(x: i32, y: i32) -> bool {
    (y == 5 && (4..11).contains(&x)) || (y == 9 && (20..28).contains(&x))
}
