//! # Clutter Registry
//!
//! Tracks which solid tiles support a prop and which empty tiles already
//! hold one. The registry belongs to a single generator and is reset at the
//! start of every generation pass.

use super::{ClutterCategory, PropHandle, PropSpawner};
use crate::Position;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A prop and the tiles it is tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClutterLink {
    /// Solid tile supporting the prop
    pub anchor: Position,
    /// Empty tile the prop occupies
    pub prop_position: Position,
    pub category: ClutterCategory,
    pub handle: PropHandle,
}

#[derive(Debug, Clone, Default)]
pub struct ClutterRegistry {
    anchors: HashMap<Position, ClutterLink>,
    cluttered: HashSet<Position>,
}

impl ClutterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `pos` already supports a prop.
    pub fn is_anchor(&self, pos: Position) -> bool {
        self.anchors.contains_key(&pos)
    }

    /// Whether a prop already occupies `pos`.
    pub fn is_cluttered(&self, pos: Position) -> bool {
        self.cluttered.contains(&pos)
    }

    /// Records a newly spawned prop.
    ///
    /// Returns `false` without changing anything if either tile is already
    /// taken.
    pub fn link(&mut self, link: ClutterLink) -> bool {
        if self.is_anchor(link.anchor) || self.is_cluttered(link.prop_position) {
            return false;
        }
        self.cluttered.insert(link.prop_position);
        self.anchors.insert(link.anchor, link);
        true
    }

    /// Removes the prop supported by `anchor`, if any.
    pub fn unlink_anchor(&mut self, anchor: Position) -> Option<ClutterLink> {
        let link = self.anchors.remove(&anchor)?;
        self.cluttered.remove(&link.prop_position);
        Some(link)
    }

    pub fn get(&self, anchor: Position) -> Option<&ClutterLink> {
        self.anchors.get(&anchor)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// All links ordered by anchor position (row-major).
    pub fn links(&self) -> Vec<ClutterLink> {
        let mut links: Vec<ClutterLink> = self.anchors.values().copied().collect();
        links.sort_by_key(|l| (l.anchor.y, l.anchor.x));
        links
    }

    /// Despawns every linked prop and forgets all positions.
    pub fn reset<P: PropSpawner + ?Sized>(&mut self, spawner: &mut P) {
        for link in self.anchors.values() {
            spawner.despawn(link.handle);
        }
        self.anchors.clear();
        self.cluttered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PropAsset, RecordingSpawner, WorldPosition};

    fn spawn_link(spawner: &mut RecordingSpawner, anchor: Position, prop: Position) -> ClutterLink {
        let handle = spawner.spawn(&PropAsset::from("grass"), WorldPosition { x: 0.0, y: 0.0 });
        ClutterLink {
            anchor,
            prop_position: prop,
            category: ClutterCategory::Ground,
            handle,
        }
    }

    #[test]
    fn test_link_rejects_reused_positions() {
        let mut spawner = RecordingSpawner::new();
        let mut registry = ClutterRegistry::new();

        let first = spawn_link(&mut spawner, Position::new(1, 0), Position::new(1, 1));
        assert!(registry.link(first));
        assert!(registry.is_anchor(Position::new(1, 0)));
        assert!(registry.is_cluttered(Position::new(1, 1)));

        let same_anchor = spawn_link(&mut spawner, Position::new(1, 0), Position::new(2, 0));
        assert!(!registry.link(same_anchor));
        let same_prop = spawn_link(&mut spawner, Position::new(0, 1), Position::new(1, 1));
        assert!(!registry.link(same_prop));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unlink_anchor() {
        let mut spawner = RecordingSpawner::new();
        let mut registry = ClutterRegistry::new();
        let link = spawn_link(&mut spawner, Position::new(3, 3), Position::new(3, 4));
        registry.link(link);

        assert_eq!(registry.unlink_anchor(Position::new(3, 3)), Some(link));
        assert!(!registry.is_cluttered(Position::new(3, 4)));
        assert!(registry.unlink_anchor(Position::new(3, 3)).is_none());
    }

    #[test]
    fn test_reset_despawns_everything() {
        let mut spawner = RecordingSpawner::new();
        let mut registry = ClutterRegistry::new();
        for x in 0..5 {
            let link = spawn_link(&mut spawner, Position::new(x, 0), Position::new(x, 1));
            registry.link(link);
        }
        assert_eq!(spawner.live_count(), 5);

        registry.reset(&mut spawner);
        assert!(registry.is_empty());
        assert!(!registry.is_cluttered(Position::new(0, 1)));
        assert_eq!(spawner.live_count(), 0);
    }
}
