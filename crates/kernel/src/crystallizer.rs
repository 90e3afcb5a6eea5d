use resonance_common::AttractorId;

use crate::entity::Entity;
use crate::field::Attractor;
use crate::system::System;
use crate::world::World;

/// Converts a fully cooled entity into a static attractor.
pub struct Crystallizer;

impl Crystallizer {
    /// Mass multiplier applied when an entity freezes.
    pub const MASS_FACTOR: f64 = 10.0;

    /// The attractor `entity` freezes into.
    ///
    /// Pure: the caller removes the entity from the world and inserts the
    /// attractor. Identical `(id, position, mass)` always give the same result.
    pub fn freeze(entity: &Entity) -> Attractor {
        Attractor::from_parts(
            AttractorId::frozen(entity.id()),
            entity.position(),
            entity.mass() * Self::MASS_FACTOR,
            entity.mass(),
            Some(*entity.soul()),
        )
    }
}

/// System that freezes every crystalline entity, archiving it into the field.
#[derive(Debug, Default)]
pub struct Crystallization {
    frozen: u64,
}

impl Crystallization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities frozen so far.
    pub fn frozen(&self) -> u64 {
        self.frozen
    }
}

impl System for Crystallization {
    fn name(&self) -> &str {
        "crystallization"
    }

    fn step(&mut self, world: &mut World, _dt: f64) {
        let ready: Vec<_> = world
            .entities()
            .values()
            .filter(|e| e.is_crystalline())
            .map(|e| e.id().clone())
            .collect();
        for id in ready {
            match world.freeze(&id) {
                Ok(_) => self.frozen += 1,
                Err(err) => tracing::warn!(entity = %id, %err, "crystallization skipped"),
            }
        }
    }
}
