use super::GalaxyParams;
use bevy::prelude::*;
use std::collections::BTreeMap;

/// Named parameter snapshots, kept for the running session only.
#[derive(Resource, Default)]
pub struct PresetStore {
    presets: BTreeMap<String, GalaxyParams>,
}

impl PresetStore {
    /// Overwrites any preset already saved under `name`.
    pub fn save(&mut self, name: &str, params: &GalaxyParams) {
        info!("Saved galaxy preset \"{}\"", name);
        self.presets.insert(name.to_string(), params.clone());
    }

    pub fn get(&self, name: &str) -> Option<&GalaxyParams> {
        self.presets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}
