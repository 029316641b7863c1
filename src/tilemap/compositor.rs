//! # Level Compositor
//!
//! Stamps room templates onto a [`TileSurface`].
//!
//! A template for the slot at `(sx, sy)` lands at tile offset
//! `(sx * 32, sy * 16)`. Fixed tiles are placed in stored order; mutable
//! tiles are collected and placed afterwards, each surviving an independent
//! roll against the mutation chance.

use super::TileSurface;
use crate::config::{TEMPLATE_HEIGHT, TEMPLATE_WIDTH};
use crate::utils::roll_tenths;
use crate::{Position, RoomTemplate, RoomweaveResult, TileRecord};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Counts of what happened while placing one template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStats {
    /// Fixed tiles written
    pub fixed: usize,
    /// Mutable tiles that won their roll
    pub mutated_in: usize,
    /// Mutable tiles that lost their roll
    pub mutated_out: usize,
    /// Records carrying the empty sentinel
    pub empty: usize,
}

impl PlacementStats {
    pub fn placed(&self) -> usize {
        self.fixed + self.mutated_in
    }
}

/// Writes templates into a tile surface.
#[derive(Debug, Clone)]
pub struct LevelCompositor {
    /// Probability that a mutable tile is placed, used in tenths
    pub mutation_chance: f32,
    /// Brush passed through to the surface
    pub brush_id: u32,
}

impl LevelCompositor {
    pub fn new(mutation_chance: f32, brush_id: u32) -> Self {
        Self {
            mutation_chance,
            brush_id,
        }
    }

    /// Tile coordinate of the bottom-left corner of a slot.
    pub fn slot_origin(slot: Position) -> Position {
        Position::new(slot.x * TEMPLATE_WIDTH, slot.y * TEMPLATE_HEIGHT)
    }

    /// Places `template` into the slot at `slot`.
    ///
    /// Re-placing a slot overwrites the previous contents at every position
    /// the new template writes to.
    pub fn place<S: TileSurface + ?Sized>(
        &self,
        surface: &mut S,
        template: &RoomTemplate,
        slot: Position,
        rng: &mut StdRng,
    ) -> RoomweaveResult<PlacementStats> {
        let origin = Self::slot_origin(slot);
        let mut stats = PlacementStats::default();
        let mut deferred: Vec<&TileRecord> = Vec::new();

        for record in &template.records {
            if record.is_empty() {
                stats.empty += 1;
            } else if record.mutable {
                deferred.push(record);
            } else {
                surface.set_tile(origin + record.local, record.tile_id, self.brush_id)?;
                stats.fixed += 1;
            }
        }

        for record in deferred {
            if roll_tenths(self.mutation_chance, rng) {
                surface.set_tile(origin + record.local, record.tile_id, self.brush_id)?;
                stats.mutated_in += 1;
            } else {
                stats.mutated_out += 1;
            }
        }

        log::debug!(
            "Placed template {} at slot {}: {} fixed, {}/{} mutable",
            template.name(),
            slot,
            stats.fixed,
            stats.mutated_in,
            stats.mutated_in + stats.mutated_out
        );
        Ok(stats)
    }
}
