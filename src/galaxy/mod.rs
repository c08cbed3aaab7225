use bevy::prelude::*;

mod galaxy_config;
mod galaxy_slot;
mod generate_points;
mod presets;

pub use galaxy_config::{GalaxyConfig, GalaxyConfigError, GalaxyConfigPlugin, GalaxyParams};
pub use galaxy_slot::{GalaxySlot, GalaxyTarget};
pub use generate_points::{generate, GeneratedGalaxy};
pub use presets::PresetStore;

/// Number of points currently on screen
#[derive(Resource, Default)]
pub struct PointCount {
    pub count: usize,
}
