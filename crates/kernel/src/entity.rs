use serde::{Deserialize, Serialize};

use resonance_common::{
    EntityId, MatterState, PhysicsState, Quaternion, SoulTensor, StateError, ThermalState,
    Vector3,
};

/// The unit of active simulation.
///
/// Fields are private: an entity changes only through its own lifecycle
/// methods (cooling, turning, field drift).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    physics: PhysicsState,
    soul: SoulTensor,
    thermal: Option<ThermalState>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, physics: PhysicsState, soul: SoulTensor) -> Self {
        Self {
            id: id.into(),
            physics,
            soul,
            thermal: None,
        }
    }

    pub fn with_thermal(mut self, thermal: ThermalState) -> Self {
        self.thermal = Some(thermal);
        self
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn physics(&self) -> &PhysicsState {
        &self.physics
    }

    pub fn soul(&self) -> &SoulTensor {
        &self.soul
    }

    pub fn thermal(&self) -> Option<&ThermalState> {
        self.thermal.as_ref()
    }

    pub fn position(&self) -> Vector3 {
        self.physics.position()
    }

    pub fn mass(&self) -> f64 {
        self.physics.mass()
    }

    pub fn forward(&self) -> Vector3 {
        self.soul.forward()
    }

    /// Current phase, or `None` for bodies without thermal state.
    pub fn phase(&self) -> Option<MatterState> {
        self.thermal.map(|t| t.state())
    }

    pub fn is_crystalline(&self) -> bool {
        self.thermal.is_some_and(|t| t.is_crystalline())
    }

    /// Advance the thermal lifecycle by `dt`. Bodies without thermal state
    /// are unaffected.
    pub fn cool_down(&mut self, dt: f64) -> Option<MatterState> {
        self.thermal.as_mut().map(|t| t.cool_down(dt))
    }

    pub fn turn(&mut self, rotation: &Quaternion) {
        self.soul.turn(rotation);
    }

    pub(crate) fn drift(&mut self, displacement: Vector3) {
        self.physics.translate(displacement);
    }

    /// Check every record, e.g. before admitting a deserialized entity.
    pub fn validate(&self) -> Result<(), StateError> {
        self.physics.validate()?;
        self.soul.validate()?;
        if let Some(thermal) = &self.thermal {
            thermal.validate()?;
        }
        Ok(())
    }
}
