use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use resonance_common::{AttractorId, EntityId, MatterState, Quaternion, Vector3};

use crate::crystallizer::Crystallizer;
use crate::entity::Entity;
use crate::error::{KernelError, Result};
use crate::field::{Attractor, PhysicsWorld};
use crate::holographic::HolographicBoundary;
use crate::narrative::{DefaultNarrator, Narrator};
use crate::orchestrator::Adjustment;
use crate::perception::{self, Senses};
use crate::system::System;

/// An event record produced by every mutation to the world.
///
/// Telemetry for external observers; the simulation never reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    EntitySpawned { id: EntityId, position: Vector3 },
    EntityDespawned { id: EntityId },
    AttractorAdded { id: AttractorId, mass: f64 },
    AttractorRemoved { id: AttractorId },
    /// An entity froze into a static attractor.
    Crystallized { entity: EntityId, attractor: AttractorId },
    ConstantsAdjusted { gravity_constant: f64, time_scale: f64 },
    BoundaryInstalled { radius: f64, resolution: usize },
    Stepped { tick: u64 },
}

/// The authoritative simulation state.
///
/// Owns the active entities, the [`PhysicsWorld`] and the registered systems.
/// Entities live in a `BTreeMap` so iteration, and therefore every per-tick
/// sum, runs in the same order on every run.
///
/// The event log gains at least one entry per tick and is only emptied by
/// [`World::drain_events`]; long-running drivers should drain it regularly.
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    physics: PhysicsWorld,
    systems: Vec<Box<dyn System>>,
    tick: u64,
    global_entropy: f64,
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Empty world at tick 0 with default field constants.
    pub fn new() -> Self {
        Self::with_physics(PhysicsWorld::default())
    }

    pub fn with_physics(physics: PhysicsWorld) -> Self {
        Self {
            entities: BTreeMap::new(),
            physics,
            systems: Vec::new(),
            tick: 0,
            global_entropy: 0.0,
            event_log: Vec::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &BTreeMap<EntityId, Entity> {
        &self.entities
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn global_entropy(&self) -> f64 {
        self.global_entropy
    }

    /// Feed the external disorder signal. Values are clamped into `[0, 1]`;
    /// NaN is ignored.
    pub fn set_global_entropy(&mut self, entropy: f64) {
        if entropy.is_nan() {
            tracing::warn!("ignoring NaN global entropy");
            return;
        }
        self.global_entropy = entropy.clamp(0.0, 1.0);
    }

    /// Append a system to the tick loop.
    pub fn register_system(&mut self, system: impl System + 'static) {
        self.add_system(Box::new(system));
    }

    pub fn add_system(&mut self, system: Box<dyn System>) {
        tracing::debug!(system = system.name(), "registered system");
        self.systems.push(system);
    }

    /// Names of registered systems in step order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Admit an entity. Fails on invalid records or a duplicate id.
    pub fn spawn_entity(&mut self, entity: Entity) -> Result<EntityId> {
        entity.validate()?;
        if self.entities.contains_key(entity.id()) {
            return Err(KernelError::DuplicateEntity(entity.id().clone()));
        }
        let id = entity.id().clone();
        tracing::debug!(entity = %id, "spawned entity");
        self.event_log.push(WorldEvent::EntitySpawned {
            id: id.clone(),
            position: entity.position(),
        });
        self.entities.insert(id.clone(), entity);
        Ok(id)
    }

    /// Remove an entity and hand it back.
    pub fn despawn_entity(&mut self, id: &EntityId) -> Result<Entity> {
        let entity = self
            .entities
            .remove(id)
            .ok_or_else(|| KernelError::EntityNotFound(id.clone()))?;
        tracing::debug!(entity = %id, "despawned entity");
        self.event_log
            .push(WorldEvent::EntityDespawned { id: id.clone() });
        Ok(entity)
    }

    pub fn add_attractor(&mut self, attractor: Attractor) -> Result<AttractorId> {
        let id = attractor.id().clone();
        let mass = attractor.mass();
        self.physics.add_attractor(attractor)?;
        tracing::debug!(attractor = %id, mass, "added attractor");
        self.event_log.push(WorldEvent::AttractorAdded {
            id: id.clone(),
            mass,
        });
        Ok(id)
    }

    pub fn remove_attractor(&mut self, id: &AttractorId) -> Result<Attractor> {
        let removed = self.physics.remove_attractor(id)?;
        tracing::debug!(attractor = %id, "removed attractor");
        self.event_log
            .push(WorldEvent::AttractorRemoved { id: id.clone() });
        Ok(removed)
    }

    /// Archive a crystalline entity as a static attractor.
    ///
    /// Removes the entity from the active set and inserts its frozen form into
    /// the field. On any error nothing changes.
    pub fn freeze(&mut self, id: &EntityId) -> Result<AttractorId> {
        let entity = self
            .entities
            .get(id)
            .ok_or_else(|| KernelError::EntityNotFound(id.clone()))?;
        if !entity.is_crystalline() {
            return Err(KernelError::NotCrystalline(id.clone()));
        }
        let attractor = Crystallizer::freeze(entity);
        let attractor_id = attractor.id().clone();
        self.physics.add_attractor(attractor)?;
        self.entities.remove(id);
        tracing::debug!(entity = %id, attractor = %attractor_id, "entity crystallized");
        self.event_log.push(WorldEvent::Crystallized {
            entity: id.clone(),
            attractor: attractor_id.clone(),
        });
        Ok(attractor_id)
    }

    /// Rotate an entity's facing.
    pub fn turn_entity(&mut self, id: &EntityId, rotation: &Quaternion) -> Result<()> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| KernelError::EntityNotFound(id.clone()))?;
        entity.turn(rotation);
        Ok(())
    }

    /// What `observer` senses within `range`.
    pub fn perceive(&self, observer: &EntityId, range: f64) -> Result<Senses> {
        self.perceive_with(observer, range, &DefaultNarrator)
    }

    pub fn perceive_with(
        &self,
        observer: &EntityId,
        range: f64,
        narrator: &dyn Narrator,
    ) -> Result<Senses> {
        let entity = self
            .entities
            .get(observer)
            .ok_or_else(|| KernelError::EntityNotFound(observer.clone()))?;
        Ok(perception::perceive(
            entity,
            range,
            &self.physics,
            self.entities.values(),
            narrator,
        ))
    }

    /// Number of entities in each phase of matter. Entities without thermal
    /// state are not counted.
    pub fn phase_census(&self) -> BTreeMap<MatterState, usize> {
        let mut census = BTreeMap::new();
        for phase in self.entities.values().filter_map(Entity::phase) {
            *census.entry(phase).or_insert(0) += 1;
        }
        census
    }

    /// Advance the simulation by one tick of `dt`.
    ///
    /// Increments the tick, runs every system in registration order, then
    /// advances every entity: the field is sampled for all entities first
    /// (read-only), and drift and cooling are applied afterwards.
    pub fn step(&mut self, dt: f64) {
        self.tick += 1;
        let _span = tracing::debug_span!("world_step", tick = self.tick).entered();
        self.event_log.push(WorldEvent::Stepped { tick: self.tick });

        let mut systems = std::mem::take(&mut self.systems);
        for system in systems.iter_mut() {
            system.step(self, dt);
        }
        // keep anything a system registered mid-step
        systems.append(&mut self.systems);
        self.systems = systems;

        self.advance_entities(dt);

        tracing::trace!(
            tick = self.tick,
            entities = self.entities.len(),
            attractors = self.physics.attractor_count(),
            "tick complete"
        );
    }

    fn advance_entities(&mut self, dt: f64) {
        let scaled = dt * self.physics.time_scale();
        if !(scaled.is_finite() && scaled > 0.0) {
            return;
        }

        let physics = &self.physics;
        let drifts: Vec<Vector3> = self
            .entities
            .values()
            .map(|e| physics.sample_field(e.position()).force / e.mass() * scaled)
            .collect();

        for (entity, drift) in self.entities.values_mut().zip(drifts) {
            entity.drift(drift);
            entity.cool_down(scaled);
        }
    }

    pub(crate) fn apply_adjustment(
        &mut self,
        adjustment: &Adjustment,
        boundary_template: &HolographicBoundary,
    ) {
        self.physics
            .set_constants(adjustment.gravity_constant, adjustment.time_scale);
        tracing::info!(
            tick = self.tick,
            regime = ?adjustment.regime,
            gravity_constant = adjustment.gravity_constant,
            time_scale = adjustment.time_scale,
            "spacetime adjusted"
        );
        self.event_log.push(WorldEvent::ConstantsAdjusted {
            gravity_constant: adjustment.gravity_constant,
            time_scale: adjustment.time_scale,
        });
        if adjustment.install_boundary && self.physics.boundary().is_none() {
            self.physics.install_boundary(boundary_template.clone());
            tracing::debug!(radius = boundary_template.radius, "holographic boundary installed");
            self.event_log.push(WorldEvent::BoundaryInstalled {
                radius: boundary_template.radius,
                resolution: boundary_template.resolution,
            });
        }
    }

    /// Deterministic hash of the simulation state for run comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_vec = |h: &mut u64, v: Vector3| {
            mix(h, &v.x.to_le_bytes());
            mix(h, &v.y.to_le_bytes());
            mix(h, &v.z.to_le_bytes());
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.physics.gravity_constant().to_le_bytes());
        mix(&mut h, &self.physics.time_scale().to_le_bytes());
        for (id, entity) in &self.entities {
            mix(&mut h, id.as_str().as_bytes());
            mix_vec(&mut h, entity.position());
            if let Some(thermal) = entity.thermal() {
                mix(&mut h, &thermal.temperature().to_le_bytes());
            }
        }
        for attractor in self.physics.attractors() {
            mix(&mut h, attractor.id().as_str().as_bytes());
            mix_vec(&mut h, attractor.position());
            mix(&mut h, &attractor.mass().to_le_bytes());
        }
        h
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("attractors", &self.physics.attractor_count())
            .field("systems", &self.system_names())
            .field("global_entropy", &self.global_entropy)
            .finish()
    }
}
