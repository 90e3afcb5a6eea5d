//! Common: vector/quaternion math and the state records simulated bodies are built from.
//!
//! # Invariants
//! - Quaternions are unit-norm after every mutation.
//! - A body's phase of matter is derived from its temperature, never stored.
//! - Invalid records fail at construction; nothing identity-defining is clamped.

mod error;
mod ids;
pub mod math;
mod state;
mod thermal;

pub use error::StateError;
pub use ids::{AttractorId, EntityId};
pub use math::{FORWARD, Quaternion, Vector3};
pub use state::{PhysicsState, SoulTensor, frequency_similarity};
pub use thermal::{MatterState, ThermalState};
