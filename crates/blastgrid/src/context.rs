//! Context — process-wide services handed to the simulation.
//!
//! [`GameContext`] bundles what would otherwise be global state: the
//! deterministic RNG, the asset cache, user options and the game
//! configuration. The [`World`](crate::world::World) owns one, and systems
//! reach it through `world.ctx`.

use crate::asset::{AssetCache, Options};
use crate::config::SimConfig;
use crate::rng::DeterministicRng;

pub struct GameContext {
    pub rng: DeterministicRng,
    pub assets: AssetCache,
    pub options: Options,
    pub config: SimConfig,
}

impl GameContext {
    /// Build a context from a config. The RNG is seeded from `config.seed`
    /// and assets resolve relative to the current directory.
    pub fn new(config: SimConfig) -> Self {
        Self {
            rng: DeterministicRng::new(config.seed),
            assets: AssetCache::new("assets"),
            options: Options::default(),
            config,
        }
    }

    /// Replace the asset cache (e.g. to point at a different asset root).
    pub fn with_assets(mut self, assets: AssetCache) -> Self {
        self.assets = assets;
        self
    }

    /// Queue a sound request, honoring the current options.
    pub fn play_sound(&mut self, name: &str) -> bool {
        self.assets.play_sound(name, &self.options)
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
