use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use resonance_common::{EntityId, MatterState};
use resonance_kernel::World;

/// World inspector for developer tooling.
///
/// Provides read-only queries against the world state for debugging,
/// telemetry, and CLI output.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let physics = world.physics();
        WorldSummary {
            tick: world.tick(),
            entity_count: world.entity_count(),
            attractor_count: physics.attractor_count(),
            gravity_constant: physics.gravity_constant(),
            time_scale: physics.time_scale(),
            boundary_active: physics.boundary().is_some(),
            global_entropy: world.global_entropy(),
            pending_events: world.events().len(),
        }
    }

    pub fn inspect_entity(world: &World, id: &EntityId) -> Option<EntityInfo> {
        world.get(id).map(|entity| {
            let p = entity.position();
            let f = entity.forward();
            EntityInfo {
                id: entity.id().clone(),
                position: [p.x, p.y, p.z],
                forward: [f.x, f.y, f.z],
                mass: entity.mass(),
                frequency: entity.soul().frequency(),
                temperature: entity.thermal().map(|t| t.temperature()),
                phase: entity.phase(),
            }
        })
    }

    /// List all entity ids in canonical order.
    pub fn list_entities(world: &World) -> Vec<EntityId> {
        world.entities().keys().cloned().collect()
    }

    /// Entities per phase, plus the count of athermal entities.
    pub fn phase_histogram(world: &World) -> PhaseHistogram {
        let counts = world.phase_census();
        let thermal: usize = counts.values().sum();
        PhaseHistogram {
            counts,
            athermal: world.entity_count() - thermal,
        }
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub tick: u64,
    pub entity_count: usize,
    pub attractor_count: usize,
    pub gravity_constant: f64,
    pub time_scale: f64,
    pub boundary_active: bool,
    pub global_entropy: f64,
    pub pending_events: usize,
}

impl fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "World: tick={} entities={} attractors={} G={:.4} time_scale={:.4} boundary={} entropy={:.2} pending_events={}",
            self.tick,
            self.entity_count,
            self.attractor_count,
            self.gravity_constant,
            self.time_scale,
            if self.boundary_active { "on" } else { "off" },
            self.global_entropy,
            self.pending_events
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub id: EntityId,
    pub position: [f64; 3],
    pub forward: [f64; 3],
    pub mass: f64,
    pub frequency: f64,
    pub temperature: Option<f64>,
    pub phase: Option<MatterState>,
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entity [{}] pos=({:.2}, {:.2}, {:.2}) mass={:.2} freq={:.2}",
            self.id,
            self.position[0],
            self.position[1],
            self.position[2],
            self.mass,
            self.frequency,
        )?;
        match (self.temperature, self.phase) {
            (Some(t), Some(phase)) => write!(f, " temp={t:.1} phase={phase}"),
            _ => write!(f, " athermal"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PhaseHistogram {
    pub counts: BTreeMap<MatterState, usize>,
    pub athermal: usize,
}

impl PhaseHistogram {
    pub fn count(&self, phase: MatterState) -> usize {
        self.counts.get(&phase).copied().unwrap_or(0)
    }
}

impl fmt::Display for PhaseHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = MatterState::ALL
            .iter()
            .map(|phase| format!("{phase}={}", self.count(*phase)))
            .collect();
        write!(f, "Phases: {} athermal={}", parts.join(" "), self.athermal)
    }
}
