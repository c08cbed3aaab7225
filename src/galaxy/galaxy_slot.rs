use super::GeneratedGalaxy;

/// Somewhere a generated galaxy can be shown.
pub trait GalaxyTarget {
    /// Whatever the target needs to tear the galaxy down again.
    type Attachment;

    fn attach(&mut self, galaxy: GeneratedGalaxy, point_size: f32) -> Self::Attachment;

    /// Disposes the buffers behind `attachment` and detaches it.
    fn release(&mut self, attachment: Self::Attachment);
}

/// Single owner of the attached galaxy, together with the config generation it was built from.
pub struct GalaxySlot<A> {
    generation: Option<u32>,
    attached: Option<A>,
}

impl<A> Default for GalaxySlot<A> {
    fn default() -> Self {
        Self {
            generation: None,
            attached: None,
        }
    }
}

impl<A> GalaxySlot<A> {
    pub fn is_stale(&self, generation: u32) -> bool {
        self.generation != Some(generation)
    }

    /// Releases the current galaxy, then attaches `galaxy` in its place.
    pub fn replace<T>(
        &mut self,
        target: &mut T,
        generation: u32,
        galaxy: GeneratedGalaxy,
        point_size: f32,
    ) where
        T: GalaxyTarget<Attachment = A>,
    {
        if let Some(old) = self.attached.take() {
            target.release(old);
        }
        self.attached = Some(target.attach(galaxy, point_size));
        self.generation = Some(generation);
    }

    /// Marks `generation` as handled without touching what is attached.
    pub fn skip(&mut self, generation: u32) {
        self.generation = Some(generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{generate, GalaxyParams};
    use bevy::prelude::*;
    use rand::prelude::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingTarget {
        next_id: u32,
        // id -> point count
        attached: HashMap<u32, usize>,
        released: Vec<u32>,
    }

    impl GalaxyTarget for RecordingTarget {
        type Attachment = u32;

        fn attach(&mut self, galaxy: GeneratedGalaxy, _point_size: f32) -> u32 {
            let id = self.next_id;
            self.next_id += 1;
            self.attached.insert(id, galaxy.len());
            id
        }

        fn release(&mut self, attachment: u32) {
            assert!(self.attached.remove(&attachment).is_some(), "double release");
            self.released.push(attachment);
        }
    }

    fn galaxy_of(count: u32) -> GeneratedGalaxy {
        let params = GalaxyParams {
            count,
            ..default()
        };
        generate(&params, &mut StdRng::seed_from_u64(count as u64)).unwrap()
    }

    #[test]
    fn test_regenerate_keeps_single_attachment() {
        let mut target = RecordingTarget::default();
        let mut slot = GalaxySlot::default();

        slot.replace(&mut target, 1, galaxy_of(100), 0.01);
        slot.replace(&mut target, 2, galaxy_of(250), 0.01);

        assert_eq!(target.attached.len(), 1);
        assert_eq!(target.attached.values().next(), Some(&250));
        assert_eq!(target.released, vec![0]);
        assert_eq!(slot.attached, Some(1));
    }

    #[test]
    fn test_stale_tracking() {
        let mut target = RecordingTarget::default();
        let mut slot = GalaxySlot::default();
        assert!(slot.is_stale(0));

        slot.replace(&mut target, 0, galaxy_of(100), 0.01);
        assert!(!slot.is_stale(0));
        assert!(slot.is_stale(1));

        slot.skip(1);
        assert!(!slot.is_stale(1));
        assert_eq!(slot.attached, Some(0));
    }
}
