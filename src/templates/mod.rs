//! # Templates Module
//!
//! Room templates and the store that resolves a slot's connectivity
//! signature to one of them.
//!
//! A template is a list of tile records covering a fixed 32×16 extent.
//! Templates are grouped by theme and signature; resolving a request picks
//! uniformly among the group.

pub mod builtin;
pub mod csv;

pub use builtin::*;
pub use csv::*;

use crate::config::{EMPTY_TILE, TEMPLATE_HEIGHT, TEMPLATE_WIDTH};
use crate::{ConnectivitySignature, Position, RoomweaveError, RoomweaveResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifies a family of templates and clutter that belong together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub String);

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new("Theme1")
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Theme {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One tile of a room template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Tile id; [`EMPTY_TILE`] means nothing is placed
    pub tile_id: u32,
    /// Position inside the template extent
    pub local: Position,
    /// Whether placement is decided by a mutation roll
    pub mutable: bool,
    /// Marks tiles belonging to a chunk template
    pub chunk: bool,
}

impl TileRecord {
    pub fn new(tile_id: u32, x: i32, y: i32) -> Self {
        Self {
            tile_id,
            local: Position::new(x, y),
            mutable: false,
            chunk: false,
        }
    }

    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tile_id == EMPTY_TILE
    }

    /// Whether the record lies inside the 32×16 template extent.
    pub fn in_extent(&self) -> bool {
        (0..TEMPLATE_WIDTH).contains(&self.local.x) && (0..TEMPLATE_HEIGHT).contains(&self.local.y)
    }
}

/// A hand-authored room, keyed by theme and connectivity signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub theme: Theme,
    pub signature: ConnectivitySignature,
    /// Free-text label, e.g. `boss` or `loot`
    pub identifier: String,
    /// Records in stored order
    pub records: Vec<TileRecord>,
}

impl RoomTemplate {
    pub fn new(
        theme: Theme,
        signature: ConnectivitySignature,
        identifier: impl Into<String>,
        records: Vec<TileRecord>,
    ) -> Self {
        Self {
            theme,
            signature,
            identifier: identifier.into(),
            records,
        }
    }

    /// Display name in the same shape as template file names.
    pub fn name(&self) -> String {
        format!("{}_{}_{}", self.theme, self.signature, self.identifier)
    }

    pub fn mutable_count(&self) -> usize {
        self.records.iter().filter(|r| r.mutable && !r.is_empty()).count()
    }
}

/// Holds every known template, grouped by theme and signature.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    groups: HashMap<(Theme, ConnectivitySignature), Vec<RoomTemplate>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template after checking its records fit the template extent.
    pub fn insert(&mut self, template: RoomTemplate) -> RoomweaveResult<()> {
        if let Some(record) = template.records.iter().find(|r| !r.in_extent()) {
            return Err(RoomweaveError::InvalidConfig(format!(
                "template {} has a tile at {} outside the {}x{} extent",
                template.name(),
                record.local,
                TEMPLATE_WIDTH,
                TEMPLATE_HEIGHT
            )));
        }

        self.groups
            .entry((template.theme.clone(), template.signature))
            .or_default()
            .push(template);
        Ok(())
    }

    /// All templates for a theme and signature.
    pub fn candidates(&self, theme: &Theme, signature: ConnectivitySignature) -> &[RoomTemplate] {
        self.groups
            .get(&(theme.clone(), signature))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Picks one template uniformly from the matching group.
    ///
    /// An empty group is a content error and fails with
    /// [`RoomweaveError::NoMatchingTemplate`].
    pub fn resolve(
        &self,
        theme: &Theme,
        signature: ConnectivitySignature,
        rng: &mut StdRng,
    ) -> RoomweaveResult<&RoomTemplate> {
        let candidates = self.candidates(theme, signature);
        if candidates.is_empty() {
            return Err(RoomweaveError::NoMatchingTemplate {
                theme: theme.to_string(),
                signature: signature.to_string(),
            });
        }
        Ok(&candidates[rng.gen_range(0..candidates.len())])
    }

    /// Total number of templates.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct themes with at least one template, sorted.
    pub fn themes(&self) -> Vec<Theme> {
        let mut themes: Vec<Theme> = self.groups.keys().map(|(t, _)| t.clone()).collect();
        themes.sort();
        themes.dedup();
        themes
    }

    /// Signatures of `theme` with no template; generation would fail on these.
    pub fn missing_signatures(&self, theme: &Theme) -> Vec<ConnectivitySignature> {
        ConnectivitySignature::all()
            .filter(|&sig| self.candidates(theme, sig).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn template(theme: &str, sig: ConnectivitySignature, id: &str) -> RoomTemplate {
        RoomTemplate::new(Theme::from(theme), sig, id, vec![TileRecord::new(1, 0, 0)])
    }

    #[test]
    fn test_resolve_only_returns_matching_group() {
        let closed = ConnectivitySignature::all_closed();
        let open_right: ConnectivitySignature = "UC_RO_DC_LC".parse().unwrap();

        let mut store = TemplateStore::new();
        store.insert(template("ThemeA", closed, "first")).unwrap();
        store.insert(template("ThemeA", closed, "second")).unwrap();
        store.insert(template("ThemeA", open_right, "other")).unwrap();
        store.insert(template("ThemeB", closed, "foreign")).unwrap();

        let theme = Theme::from("ThemeA");
        let mut rng = StdRng::seed_from_u64(8);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let chosen = store.resolve(&theme, closed, &mut rng).unwrap();
            assert_eq!(chosen.signature, closed);
            assert_eq!(chosen.theme, theme);
            seen.insert(chosen.identifier.clone());
        }
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("first") && seen.contains("second"));
    }

    #[test]
    fn test_resolve_fails_on_empty_group() {
        let store = TemplateStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        let err = store
            .resolve(&Theme::default(), ConnectivitySignature::all_closed(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, RoomweaveError::NoMatchingTemplate { .. }));
    }

    #[test]
    fn test_insert_rejects_out_of_extent_records() {
        let mut store = TemplateStore::new();
        let bad = RoomTemplate::new(
            Theme::default(),
            ConnectivitySignature::all_closed(),
            "bad",
            vec![TileRecord::new(1, TEMPLATE_WIDTH, 0)],
        );
        assert!(store.insert(bad).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_signatures() {
        let mut store = TemplateStore::new();
        store
            .insert(template("Theme1", ConnectivitySignature::all_closed(), "a"))
            .unwrap();
        let missing = store.missing_signatures(&Theme::from("Theme1"));
        assert_eq!(missing.len(), 15);
        assert!(!missing.contains(&ConnectivitySignature::all_closed()));
        assert_eq!(store.themes(), vec![Theme::from("Theme1")]);
    }
}
