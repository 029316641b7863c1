//! # Clutter Module
//!
//! Decorative props scattered over a finished level.
//!
//! Props are grouped into four placement categories (ground, ceiling and the
//! two wall sides), each with a weighted collection of assets per theme.
//! Every spawned prop is linked to the solid tile supporting it so that
//! destroying that tile can take the prop with it.

pub mod placer;
pub mod registry;

pub use placer::*;
pub use registry::*;

use crate::templates::{Theme, BUILTIN_THEMES};
use crate::{weighted_index, RoomweaveResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

/// Where a prop attaches relative to its supporting tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClutterCategory {
    /// Sits on a solid tile below
    Ground,
    /// Hangs from a solid tile above
    Ceiling,
    /// Solid tile on the left, free space on the right
    LeftWall,
    /// Solid tile on the right, free space on the left
    RightWall,
}

/// Identifier of a prop asset, handed to the [`PropSpawner`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropAsset(pub String);

impl fmt::Display for PropAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropAsset {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Opaque reference to a spawned prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropHandle(pub u64);

/// A position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
}

/// Creates and destroys prop instances in whatever world hosts the level.
pub trait PropSpawner {
    /// Instantiates `asset` at `at` and returns a handle to it.
    fn spawn(&mut self, asset: &PropAsset, at: WorldPosition) -> PropHandle;

    /// Removes a previously spawned prop. Unknown handles are ignored.
    fn despawn(&mut self, handle: PropHandle);
}

/// A prop held by [`RecordingSpawner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnedProp {
    pub asset: PropAsset,
    pub position: WorldPosition,
}

/// In-memory spawner that records live props; handles are sequential.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpawner {
    next_handle: u64,
    live: BTreeMap<PropHandle, SpawnedProp>,
}

impl RecordingSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, handle: PropHandle) -> Option<&SpawnedProp> {
        self.live.get(&handle)
    }

    pub fn props(&self) -> impl Iterator<Item = (&PropHandle, &SpawnedProp)> {
        self.live.iter()
    }
}

impl PropSpawner for RecordingSpawner {
    fn spawn(&mut self, asset: &PropAsset, at: WorldPosition) -> PropHandle {
        let handle = PropHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(
            handle,
            SpawnedProp {
                asset: asset.clone(),
                position: at,
            },
        );
        handle
    }

    fn despawn(&mut self, handle: PropHandle) {
        self.live.remove(&handle);
    }
}

/// Weighted assets for one placement category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClutterCollection {
    pub props: Vec<PropAsset>,
    /// Relative weight per prop, same order as `props`
    pub chances: Vec<f32>,
}

impl ClutterCollection {
    pub fn new(entries: &[(&str, f32)]) -> Self {
        Self {
            props: entries.iter().map(|(name, _)| PropAsset::from(*name)).collect(),
            chances: entries.iter().map(|(_, weight)| *weight).collect(),
        }
    }

    /// Picks a prop by weight; `None` when nothing can be picked.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&PropAsset> {
        weighted_index(&self.chances, rng).and_then(|i| self.props.get(i))
    }
}

/// The four clutter collections of one theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClutterTheme {
    pub ground: ClutterCollection,
    pub ceiling: ClutterCollection,
    pub left_wall: ClutterCollection,
    pub right_wall: ClutterCollection,
}

impl ClutterTheme {
    pub fn collection(&self, category: ClutterCategory) -> &ClutterCollection {
        match category {
            ClutterCategory::Ground => &self.ground,
            ClutterCategory::Ceiling => &self.ceiling,
            ClutterCategory::LeftWall => &self.left_wall,
            ClutterCategory::RightWall => &self.right_wall,
        }
    }
}

/// Clutter themes keyed by theme name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClutterLibrary {
    themes: HashMap<Theme, ClutterTheme>,
}

impl ClutterLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, theme: Theme, clutter: ClutterTheme) {
        self.themes.insert(theme, clutter);
    }

    pub fn get(&self, theme: &Theme) -> Option<&ClutterTheme> {
        self.themes.get(theme)
    }

    /// Loads a library from a JSON object mapping theme names to collections.
    pub fn from_json_file(path: impl AsRef<Path>) -> RoomweaveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Placeholder props for the built-in template themes.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for name in BUILTIN_THEMES {
            library.insert(
                Theme::from(name),
                ClutterTheme {
                    ground: ClutterCollection::new(&[("grass", 0.6), ("rock", 0.3), ("bones", 0.1)]),
                    ceiling: ClutterCollection::new(&[("stalactite", 0.7), ("roots", 0.3)]),
                    left_wall: ClutterCollection::new(&[("moss_left", 0.8), ("torch_left", 0.2)]),
                    right_wall: ClutterCollection::new(&[("moss_right", 0.8), ("torch_right", 0.2)]),
                },
            );
        }
        library
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_recording_spawner() {
        let mut spawner = RecordingSpawner::new();
        let at = WorldPosition { x: 1.0, y: 2.0 };
        let a = spawner.spawn(&PropAsset::from("grass"), at);
        let b = spawner.spawn(&PropAsset::from("rock"), at);
        assert_ne!(a, b);
        assert_eq!(spawner.live_count(), 2);

        spawner.despawn(a);
        spawner.despawn(a);
        assert_eq!(spawner.live_count(), 1);
        assert_eq!(spawner.get(b).unwrap().asset, PropAsset::from("rock"));
    }

    #[test]
    fn test_collection_pick() {
        let mut rng = StdRng::seed_from_u64(4);
        let only = ClutterCollection::new(&[("a", 0.0), ("b", 1.0)]);
        for _ in 0..50 {
            assert_eq!(only.pick(&mut rng), Some(&PropAsset::from("b")));
        }

        assert!(ClutterCollection::default().pick(&mut rng).is_none());

        // More weights than props: an out-of-range pick is no selection.
        let short = ClutterCollection {
            props: vec![],
            chances: vec![1.0],
        };
        assert!(short.pick(&mut rng).is_none());
    }

    #[test]
    fn test_library_json() {
        let library = ClutterLibrary::builtin();
        let json = serde_json::to_string(&library).unwrap();
        let back: ClutterLibrary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, library);
        assert!(back.get(&Theme::from("Theme2")).is_some());
        assert!(back.get(&Theme::from("Missing")).is_none());
    }
}
