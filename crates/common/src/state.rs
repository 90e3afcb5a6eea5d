use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::StateError;
use crate::math::{Quaternion, Vector3};

/// Spatial state of a body: where it is and how heavy it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    position: Vector3,
    mass: f64,
}

impl PhysicsState {
    /// Fails if `mass` is not strictly positive or `position` is not finite.
    pub fn new(position: Vector3, mass: f64) -> Result<Self, StateError> {
        let state = Self { position, mass };
        state.validate()?;
        Ok(state)
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Move by `displacement`. Non-finite displacements are ignored.
    pub fn translate(&mut self, displacement: Vector3) {
        if displacement.is_finite() {
            self.position += displacement;
        }
    }

    /// Re-check the invariants, e.g. after deserializing.
    pub fn validate(&self) -> Result<(), StateError> {
        StateError::check_finite("position.x", self.position.x)?;
        StateError::check_finite("position.y", self.position.y)?;
        StateError::check_finite("position.z", self.position.z)?;
        StateError::check_positive("mass", self.mass)?;
        Ok(())
    }
}

/// Resonance signature shared by dynamic entities and static attractors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoulTensor {
    amplitude: f64,
    frequency: f64,
    phase: f64,
    orientation: Quaternion,
    spin: f64,
}

impl SoulTensor {
    /// Signature with zero phase, identity orientation and no spin.
    pub fn new(amplitude: f64, frequency: f64) -> Result<Self, StateError> {
        let soul = Self {
            amplitude,
            frequency,
            phase: 0.0,
            orientation: Quaternion::IDENTITY,
            spin: 0.0,
        };
        soul.validate()?;
        Ok(soul)
    }

    /// Phase is an angle, so it is wrapped into `[0, 2π)` rather than rejected.
    pub fn with_phase(mut self, phase: f64) -> Result<Self, StateError> {
        self.phase = wrap_phase(StateError::check_finite("phase", phase)?);
        Ok(self)
    }

    pub fn with_orientation(mut self, orientation: Quaternion) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_spin(mut self, spin: f64) -> Result<Self, StateError> {
        self.spin = StateError::check_finite("spin", spin)?;
        Ok(self)
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn spin(&self) -> f64 {
        self.spin
    }

    /// Facing direction derived from the orientation.
    pub fn forward(&self) -> Vector3 {
        self.orientation.forward()
    }

    /// Apply a further rotation to the orientation.
    pub fn turn(&mut self, rotation: &Quaternion) {
        self.orientation.rotate_by(rotation);
    }

    /// `1 / (1 + |f_self - f_other|)`: 1.0 for identical frequencies, falling
    /// toward zero as they diverge.
    pub fn frequency_similarity(&self, other_frequency: f64) -> f64 {
        frequency_similarity(self.frequency, other_frequency)
    }

    pub fn validate(&self) -> Result<(), StateError> {
        StateError::check_non_negative("amplitude", self.amplitude)?;
        StateError::check_non_negative("frequency", self.frequency)?;
        StateError::check_finite("spin", self.spin)?;
        if !(0.0..TAU).contains(&self.phase) {
            return Err(StateError::InvalidValue {
                field: "phase",
                value: self.phase,
                reason: "must lie in [0, 2π)",
            });
        }
        Ok(())
    }
}

impl Default for SoulTensor {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            frequency: 1.0,
            phase: 0.0,
            orientation: Quaternion::IDENTITY,
            spin: 0.0,
        }
    }
}

pub fn frequency_similarity(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + (a - b).abs())
}

fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}
