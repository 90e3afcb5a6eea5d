//! Resonance kernel: attractor field, thermodynamic lifecycle, perception and
//! spacetime control, driven one tick at a time by an external loop.
//!
//! # Invariants
//! - A step is deterministic given identical inputs; there is no hidden randomness.
//! - All state mutations flow through explicit operations on [`World`].
//! - Global field constants are changed only by [`SpacetimeOrchestrator`].
//! - Failed operations leave the world unchanged.

pub mod config;
pub mod crystallizer;
pub mod entity;
pub mod error;
pub mod field;
pub mod holographic;
pub mod narrative;
pub mod orchestrator;
pub mod perception;
pub mod system;
pub mod world;

pub use config::{FieldConfig, OrchestratorConfig};
pub use crystallizer::{Crystallization, Crystallizer};
pub use entity::Entity;
pub use error::{KernelError, Result};
pub use field::{Attractor, FieldSample, PhysicsWorld};
pub use holographic::HolographicBoundary;
pub use narrative::{DefaultNarrator, Narrator};
pub use orchestrator::{Adjustment, Regime, SpacetimeOrchestrator};
pub use perception::{Senses, perceive};
pub use system::System;
pub use world::{World, WorldEvent};

pub use resonance_common::{
    AttractorId, EntityId, MatterState, PhysicsState, Quaternion, SoulTensor, ThermalState,
    Vector3,
};
