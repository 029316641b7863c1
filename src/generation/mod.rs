//! # Generation Module
//!
//! The staged level generation pipeline.
//!
//! Generation runs as a sequence of phases: a random walk marks the main
//! path through a grid of room slots, connection resolution decides which
//! edges of every slot are open, and then each slot is filled with a room
//! template before a final clutter pass decorates the result.

pub mod connections;
pub mod level;
pub mod path;

pub use connections::*;
pub use level::*;
pub use path::*;

use crate::templates::Theme;
use crate::{config, RoomweaveError, RoomweaveResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An inclusive `[min, max]` range of grid sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: u32,
    pub max: u32,
}

impl SizeRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range containing only `size`.
    pub fn exactly(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Draws a size from the range.
    pub fn sample(&self, rng: &mut StdRng) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Configuration for level generation.
///
/// Controls the size of the room grid, how often mutable tiles and clutter
/// appear, and which theme templates are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Room grid width, in slots
    pub width_range: SizeRange,
    /// Room grid height, in slots
    pub height_range: SizeRange,
    /// Probability (0.0 to 1.0) that a mutable tile is placed
    pub mutation_chance: f32,
    /// Probability (0.0 to 1.0) of chunk templates; not used by compositing
    pub chunk_template_chance: f32,
    /// Requested difficulty; not used by template selection
    pub desired_difficulty: f32,
    /// Probability of clutter on a floor tile
    pub ground_clutter_chance: f32,
    /// Probability of clutter under a ceiling tile
    pub ceiling_clutter_chance: f32,
    /// Probability of clutter beside a wall, shared by both wall categories
    pub wall_clutter_chance: f32,
    /// Whether the clutter pass runs at all
    pub spawn_clutter: bool,
    /// Theme that templates and clutter are drawn from
    pub theme: Theme,
    /// Opaque brush identifier handed to the tile surface
    pub brush_id: u32,
    /// Size of one tile in world units
    pub tile_size: f32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use roomweave::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, 42);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width_range: SizeRange::new(4, 6),
            height_range: SizeRange::new(3, 5),
            mutation_chance: 0.5,
            chunk_template_chance: 0.33,
            desired_difficulty: 0.0,
            ground_clutter_chance: 0.33,
            ceiling_clutter_chance: 0.33,
            wall_clutter_chance: 0.33,
            spawn_clutter: true,
            theme: Theme::default(),
            brush_id: 0,
            tile_size: config::DEFAULT_TILE_SIZE,
        }
    }

    /// Creates a configuration for testing with small, fixed-size levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width_range: SizeRange::exactly(3),
            height_range: SizeRange::exactly(2),
            ..Self::new(seed)
        }
    }

    /// Checks that ranges and probabilities are usable.
    pub fn validate(&self) -> RoomweaveResult<()> {
        for (name, range) in [("width", self.width_range), ("height", self.height_range)] {
            if range.min == 0 {
                return Err(RoomweaveError::InvalidConfig(format!(
                    "{} range must start at 1 or more",
                    name
                )));
            }
            if range.min > range.max {
                return Err(RoomweaveError::InvalidConfig(format!(
                    "{} range is inverted: {} > {}",
                    name, range.min, range.max
                )));
            }
            if range.max > config::MAX_GRID_SIDE {
                return Err(RoomweaveError::InvalidConfig(format!(
                    "{} range exceeds the maximum of {} rooms",
                    name,
                    config::MAX_GRID_SIDE
                )));
            }
        }

        let chances = [
            ("mutation_chance", self.mutation_chance),
            ("chunk_template_chance", self.chunk_template_chance),
            ("ground_clutter_chance", self.ground_clutter_chance),
            ("ceiling_clutter_chance", self.ceiling_clutter_chance),
            ("wall_clutter_chance", self.wall_clutter_chance),
        ];
        for (name, chance) in chances {
            if !(0.0..=1.0).contains(&chance) {
                return Err(RoomweaveError::InvalidConfig(format!(
                    "{} must be between 0 and 1, got {}",
                    name, chance
                )));
            }
        }

        if self.tile_size.is_nan() || self.tile_size <= 0.0 {
            return Err(RoomweaveError::InvalidConfig(
                "tile_size must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Loads a configuration from a JSON file; missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> RoomweaveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> RoomweaveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// Generators produce content from a configuration and a random source and
/// can check their own output.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> RoomweaveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> RoomweaveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert!(config.width_range.min <= config.width_range.max);
        assert!(config.height_range.min <= config.height_range.max);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = GenerationConfig::for_testing(1);
        config.width_range = SizeRange::new(0, 3);
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::for_testing(1);
        config.height_range = SizeRange::new(5, 2);
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::for_testing(1);
        config.width_range = SizeRange::new(2, u32::MAX);
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::for_testing(1);
        config.height_range = SizeRange::exactly(crate::config::MAX_GRID_SIDE + 1);
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::for_testing(1);
        config.width_range = SizeRange::exactly(crate::config::MAX_GRID_SIDE);
        config.height_range = SizeRange::exactly(crate::config::MAX_GRID_SIDE);
        assert!(config.validate().is_ok());

        let mut config = GenerationConfig::for_testing(1);
        config.mutation_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::for_testing(1);
        config.wall_clutter_chance = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_size_range_sampling_is_inclusive() {
        let mut rng = utils::create_rng(&GenerationConfig::new(3));
        let range = SizeRange::new(2, 4);
        let mut seen = [false; 5];
        for _ in 0..200 {
            let v = range.sample(&mut rng);
            assert!((2..=4).contains(&v));
            seen[v as usize] = true;
        }
        assert!(seen[2] && seen[3] && seen[4]);
    }

    #[test]
    fn test_config_json_defaults_missing_fields() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{ "seed": 9, "mutation_chance": 0.2 }"#).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.mutation_chance, 0.2);
        assert_eq!(config.width_range, GenerationConfig::default().width_range);

        let json = config.to_json().unwrap();
        let back: GenerationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
