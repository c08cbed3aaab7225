pub use crate::galaxy::{GalaxyConfig, GalaxyParams, PointCount, PresetStore};
