//! # Level Generation Pipeline
//!
//! Ties the stages together. A [`LevelGenerator`] owns the template store,
//! the clutter library and the clutter registry; every call to
//! [`LevelGenerator::start`] wipes the registry and the surface before
//! walking a new path.
//!
//! A [`GenerationRun`] is advanced one step at a time so a caller can
//! present progress between room placements. Each step places one room;
//! the step after the last room runs the clutter pass and finishes the run.
//! Stepping through a run produces exactly the same level as
//! [`LevelGenerator::generate`].

use crate::clutter::{
    ClutterChances, ClutterLibrary, ClutterLink, ClutterPlacer, ClutterRegistry, PropSpawner,
};
use crate::config::{EMPTY_TILE, SPAWN_SEARCH_ATTEMPTS, TEMPLATE_HEIGHT, TEMPLATE_WIDTH};
use crate::tilemap::{LevelCompositor, PlacementStats, TileSurface};
use crate::{
    ConnectionResolver, ConnectivitySignature, GenerationConfig, Generator, PathWalker, Position,
    RoomLayout, RoomweaveError, RoomweaveResult, TemplateStore,
};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The template chosen for one room slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPlacement {
    pub slot: Position,
    pub signature: ConnectivitySignature,
    /// Name of the chosen template
    pub template: String,
    pub stats: PlacementStats,
}

/// Summary of a finished generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLevel {
    pub layout: RoomLayout,
    /// One entry per slot, in placement order
    pub placements: Vec<SlotPlacement>,
    /// Props spawned by the clutter pass, ordered by anchor
    pub clutter: Vec<ClutterLink>,
    /// An empty tile suitable for placing the player
    pub spawn_point: Option<Position>,
}

/// What a single [`GenerationRun::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationProgress {
    /// A room was placed; `remaining` rooms are left before the clutter pass
    Placed { slot: Position, remaining: usize },
    /// The clutter pass ran and the level is finished
    Complete(GeneratedLevel),
}

/// Owns generation content and the per-level clutter state.
#[derive(Debug)]
pub struct LevelGenerator {
    config: GenerationConfig,
    templates: TemplateStore,
    clutter: ClutterLibrary,
    registry: ClutterRegistry,
    walker: PathWalker,
    resolver: ConnectionResolver,
}

impl LevelGenerator {
    /// Creates a generator; the configuration is validated up front.
    pub fn new(
        config: GenerationConfig,
        templates: TemplateStore,
        clutter: ClutterLibrary,
    ) -> RoomweaveResult<Self> {
        config.validate()?;

        let missing = templates.missing_signatures(&config.theme);
        if !missing.is_empty() {
            log::warn!(
                "Theme '{}' has no template for {} of 16 signatures",
                config.theme,
                missing.len()
            );
        }

        Ok(Self {
            config,
            templates,
            clutter,
            registry: ClutterRegistry::new(),
            walker: PathWalker::new(),
            resolver: ConnectionResolver::new(),
        })
    }

    /// Creates a generator using the built-in templates and clutter.
    pub fn with_builtin_content(config: GenerationConfig) -> RoomweaveResult<Self> {
        Self::new(config, TemplateStore::builtin(), ClutterLibrary::builtin())
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn registry(&self) -> &ClutterRegistry {
        &self.registry
    }

    /// Removes all clutter from the previous level and empties the surface.
    pub fn reset<S, P>(&mut self, surface: &mut S, spawner: &mut P)
    where
        S: TileSurface + ?Sized,
        P: PropSpawner + ?Sized,
    {
        self.registry.reset(spawner);
        surface.clear(0, 0);
    }

    /// Resets state, runs the path and connection phases, and returns a run
    /// ready to place rooms.
    pub fn start<'a, S, P>(
        &'a mut self,
        surface: &'a mut S,
        spawner: &'a mut P,
        rng: &'a mut StdRng,
    ) -> RoomweaveResult<GenerationRun<'a, S, P>>
    where
        S: TileSurface + ?Sized,
        P: PropSpawner + ?Sized,
    {
        self.reset(surface, spawner);

        let path = self.walker.generate(&self.config, rng)?;
        self.walker.validate(&path, &self.config)?;
        let layout = self.resolver.resolve(&path, rng);

        surface.clear(
            layout.width * TEMPLATE_WIDTH as u32,
            layout.height * TEMPLATE_HEIGHT as u32,
        );

        log::debug!(
            "Starting {}x{} level with theme '{}'",
            layout.width,
            layout.height,
            self.config.theme
        );

        let order = layout.slots().iter().map(|s| s.position).collect();
        let compositor = LevelCompositor::new(self.config.mutation_chance, self.config.brush_id);
        Ok(GenerationRun {
            generator: self,
            surface,
            spawner,
            rng,
            compositor,
            layout,
            order,
            next: 0,
            placements: Vec::new(),
            finished: false,
        })
    }

    /// Runs a whole generation pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use roomweave::{CompositeGrid, GenerationConfig, LevelGenerator, RecordingSpawner};
    ///
    /// let config = GenerationConfig::for_testing(7);
    /// let mut generator = LevelGenerator::with_builtin_content(config).unwrap();
    /// let mut surface = CompositeGrid::new(0, 0);
    /// let mut spawner = RecordingSpawner::new();
    /// let mut rng = StdRng::seed_from_u64(7);
    ///
    /// let level = generator.generate(&mut surface, &mut spawner, &mut rng).unwrap();
    /// assert_eq!(level.placements.len(), 6);
    /// ```
    pub fn generate<S, P>(
        &mut self,
        surface: &mut S,
        spawner: &mut P,
        rng: &mut StdRng,
    ) -> RoomweaveResult<GeneratedLevel>
    where
        S: TileSurface + ?Sized,
        P: PropSpawner + ?Sized,
    {
        let mut run = self.start(surface, spawner, rng)?;
        loop {
            if let GenerationProgress::Complete(level) = run.step()? {
                log::info!(
                    "Generated {}x{} level: {} rooms, {} path rooms, {} props",
                    level.layout.width,
                    level.layout.height,
                    level.placements.len(),
                    level.layout.path_len(),
                    level.clutter.len()
                );
                return Ok(level);
            }
        }
    }

    /// Destroys the solid tile at `pos` and removes any prop it supported.
    ///
    /// Returns the link of the removed prop. Destroying an empty cell does
    /// nothing.
    pub fn destroy_tile<S, P>(
        &mut self,
        surface: &mut S,
        spawner: &mut P,
        pos: Position,
    ) -> RoomweaveResult<Option<ClutterLink>>
    where
        S: TileSurface + ?Sized,
        P: PropSpawner + ?Sized,
    {
        if surface.remove_tile(pos)? == EMPTY_TILE {
            return Ok(None);
        }

        let link = self.registry.unlink_anchor(pos);
        if let Some(link) = &link {
            spawner.despawn(link.handle);
            log::debug!("Destroyed tile {} and its {:?} prop", pos, link.category);
        }
        surface.update_mesh();
        Ok(link)
    }
}

/// An in-progress generation pass.
pub struct GenerationRun<'a, S: ?Sized, P: ?Sized> {
    generator: &'a mut LevelGenerator,
    surface: &'a mut S,
    spawner: &'a mut P,
    rng: &'a mut StdRng,
    compositor: LevelCompositor,
    layout: RoomLayout,
    /// Slots in placement order
    order: Vec<Position>,
    next: usize,
    placements: Vec<SlotPlacement>,
    finished: bool,
}

impl<'a, S, P> GenerationRun<'a, S, P>
where
    S: TileSurface + ?Sized,
    P: PropSpawner + ?Sized,
{
    /// The layout being built.
    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    /// Rooms not yet placed.
    pub fn remaining(&self) -> usize {
        self.order.len() - self.next
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances the run by one room, or finishes it once all rooms are placed.
    ///
    /// A missing template aborts the run; stepping a finished or aborted run
    /// is an error.
    pub fn step(&mut self) -> RoomweaveResult<GenerationProgress> {
        if self.finished {
            return Err(RoomweaveError::InvalidState(
                "generation run has already finished".to_string(),
            ));
        }

        if self.next < self.order.len() {
            match self.place_next() {
                Ok(slot) => Ok(GenerationProgress::Placed {
                    slot,
                    remaining: self.remaining(),
                }),
                Err(e) => {
                    self.finished = true;
                    log::error!("Level generation aborted: {}", e);
                    Err(e)
                }
            }
        } else {
            self.finished = true;
            Ok(GenerationProgress::Complete(self.finish()))
        }
    }

    fn place_next(&mut self) -> RoomweaveResult<Position> {
        let slot_pos = self.order[self.next];
        let signature = self
            .layout
            .get(slot_pos)
            .map(|s| s.signature())
            .ok_or(RoomweaveError::InvalidPosition {
                x: slot_pos.x,
                y: slot_pos.y,
            })?;

        let generator = &*self.generator;
        let template = generator
            .templates
            .resolve(&generator.config.theme, signature, self.rng)?;
        let stats = self
            .compositor
            .place(&mut *self.surface, template, slot_pos, self.rng)?;
        self.surface.update_mesh();

        self.placements.push(SlotPlacement {
            slot: slot_pos,
            signature,
            template: template.name(),
            stats,
        });
        self.next += 1;
        Ok(slot_pos)
    }

    fn finish(&mut self) -> GeneratedLevel {
        let LevelGenerator {
            config,
            clutter,
            registry,
            ..
        } = &mut *self.generator;

        if config.spawn_clutter {
            match clutter.get(&config.theme) {
                Some(theme) => {
                    let chances = ClutterChances {
                        ground: config.ground_clutter_chance,
                        ceiling: config.ceiling_clutter_chance,
                        wall: config.wall_clutter_chance,
                    };
                    ClutterPlacer::new(theme, chances, config.tile_size).scan(
                        &*self.surface,
                        registry,
                        &mut *self.spawner,
                        &mut *self.rng,
                    );
                }
                None => log::warn!("No clutter defined for theme '{}'", config.theme),
            }
        }
        self.surface.update_mesh();

        GeneratedLevel {
            layout: self.layout.clone(),
            placements: std::mem::take(&mut self.placements),
            clutter: registry.links(),
            spawn_point: find_spawn_point(&*self.surface, self.rng),
        }
    }
}

/// Finds an empty tile to spawn the player on.
///
/// Probes random tiles first, then falls back to the first empty tile in
/// row-major order. Returns `None` only if the surface has no empty tile.
pub fn find_spawn_point<S: TileSurface + ?Sized>(surface: &S, rng: &mut StdRng) -> Option<Position> {
    let (width, height) = surface.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    for _ in 0..SPAWN_SEARCH_ATTEMPTS {
        let pos = Position::new(
            rng.gen_range(0..width as i32),
            rng.gen_range(0..height as i32),
        );
        if surface.is_empty_at(pos) {
            return Some(pos);
        }
    }

    (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
        .find(|&pos| surface.is_empty_at(pos))
}
