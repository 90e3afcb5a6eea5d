//! Vector and quaternion algebra in double precision.
//!
//! `Vector3` is glam's `DVec3`; normalizing a zero vector goes through
//! `normalize_or_zero` so degenerate input yields the zero vector instead of NaN.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Three-component double precision vector.
pub type Vector3 = DVec3;

/// Local axis an oriented body faces along before any rotation.
pub const FORWARD: Vector3 = DVec3::Z;

/// Unit direction and distance from `from` to `to`.
///
/// Coincident points give a zero direction and zero distance.
pub fn direction_and_distance(from: Vector3, to: Vector3) -> (Vector3, f64) {
    let delta = to - from;
    (delta.normalize_or_zero(), delta.length())
}

/// Unit-norm rotation.
///
/// The wrapped quaternion is renormalized after every construction and
/// composition, and on deserialization, so it never drifts off the unit sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DQuat", into = "DQuat")]
pub struct Quaternion(DQuat);

impl Quaternion {
    pub const IDENTITY: Self = Self(DQuat::IDENTITY);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Rotation of `angle` radians about `axis`. A zero axis yields identity.
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let axis = axis.normalize_or_zero();
        if axis == Vector3::ZERO || !angle.is_finite() {
            return Self::IDENTITY;
        }
        Self::from_raw(DQuat::from_axis_angle(axis, angle))
    }

    /// Wrap an arbitrary quaternion, normalizing it. Zero or non-finite input
    /// falls back to identity.
    pub fn from_raw(q: DQuat) -> Self {
        let len = q.length();
        if len <= f64::EPSILON || !len.is_finite() {
            Self::IDENTITY
        } else {
            Self(q / len)
        }
    }

    pub fn rotate(&self, v: Vector3) -> Vector3 {
        self.0 * v
    }

    /// `self` applied after `other`.
    pub fn compose(&self, other: &Quaternion) -> Self {
        Self::from_raw(self.0 * other.0)
    }

    /// In-place composition with a further rotation.
    pub fn rotate_by(&mut self, rotation: &Quaternion) {
        *self = rotation.compose(self);
    }

    /// The direction this rotation makes [`FORWARD`] point.
    pub fn forward(&self) -> Vector3 {
        self.rotate(FORWARD)
    }

    pub fn norm(&self) -> f64 {
        self.0.length()
    }

    pub fn as_dquat(&self) -> DQuat {
        self.0
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<DQuat> for Quaternion {
    fn from(q: DQuat) -> Self {
        Self::from_raw(q)
    }
}

impl From<Quaternion> for DQuat {
    fn from(q: Quaternion) -> Self {
        q.0
    }
}
