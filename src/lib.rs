//! # Roomweave
//!
//! Procedural 2D level generation built from hand-authored room templates.
//!
//! ## Architecture Overview
//!
//! A level is produced by a staged pipeline:
//!
//! - **Path generation**: a random walk over a small grid of room slots marks
//!   a guaranteed route from the left column to the right column
//! - **Connection resolution**: every slot gets an open/closed state per edge,
//!   with shared edges made to agree
//! - **Template selection**: each slot's connectivity signature picks a room
//!   template from the [`TemplateStore`]
//! - **Compositing**: templates are stamped into one tile surface, with
//!   mutable tiles subject to a per-tile roll
//! - **Clutter**: decorative props are scattered along floors, ceilings and
//!   walls, each linked to the solid tile that supports it
//!
//! Everything is driven by a single seeded random source, so a seed fully
//! determines the level.

pub mod clutter;
pub mod generation;
pub mod layout;
pub mod rendering;
pub mod templates;
pub mod tilemap;
pub mod utils;

pub use clutter::*;
pub use generation::*;
pub use layout::*;
pub use rendering::*;
pub use templates::*;
pub use tilemap::*;
pub use utils::*;

/// Core error type for the Roomweave generator.
#[derive(thiserror::Error, Debug)]
pub enum RoomweaveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Template record file could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// No template exists for a theme and connectivity signature
    #[error("No template matches theme '{theme}' with signature {signature}")]
    NoMatchingTemplate { theme: String, signature: String },

    /// The path walker ran out of directions to take
    #[error("Path generation stalled at ({x}, {y}) after {steps} steps")]
    PathGenerationStalled { x: i32, y: i32, steps: usize },

    /// A template file could not be parsed
    #[error("Template parse error in {source_name} line {line}: {message}")]
    TemplateParse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A coordinate lies outside the tile surface
    #[error("Position ({x}, {y}) is outside the tile surface")]
    InvalidPosition { x: i32, y: i32 },

    /// Generation state is invalid
    #[error("Invalid generation state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Roomweave codebase.
pub type RoomweaveResult<T> = Result<T, RoomweaveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation constants.
pub mod config {
    /// Width of every room template in tiles
    pub const TEMPLATE_WIDTH: i32 = 32;

    /// Height of every room template in tiles
    pub const TEMPLATE_HEIGHT: i32 = 16;

    /// Tile id reserved for "no tile"; never placed on a surface
    pub const EMPTY_TILE: u32 = 65535;

    /// Default size of one tile in world units
    pub const DEFAULT_TILE_SIZE: f32 = 2.5;

    /// Largest room grid side accepted by configuration validation
    pub const MAX_GRID_SIDE: u32 = 256;

    /// Random probes made when searching for a spawn tile before scanning
    pub const SPAWN_SEARCH_ATTEMPTS: usize = 256;
}
