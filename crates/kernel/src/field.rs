use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use resonance_common::math::direction_and_distance;
use resonance_common::{AttractorId, SoulTensor, StateError, Vector3, frequency_similarity};

use crate::config::FieldConfig;
use crate::error::{KernelError, Result};
use crate::holographic::{BoundaryEncoding, HolographicBoundary};

/// A static field source: a placed gravity well or a crystallized former entity.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    id: AttractorId,
    position: Vector3,
    mass: f64,
    radius: f64,
    soul: Option<SoulTensor>,
}

impl Attractor {
    /// Point attractor with zero radius and no resonance signature.
    pub fn new(
        id: impl Into<AttractorId>,
        position: Vector3,
        mass: f64,
    ) -> std::result::Result<Self, StateError> {
        let attractor = Self {
            id: id.into(),
            position,
            mass,
            radius: 0.0,
            soul: None,
        };
        attractor.validate()?;
        Ok(attractor)
    }

    pub fn with_radius(mut self, radius: f64) -> std::result::Result<Self, StateError> {
        self.radius = StateError::check_non_negative("radius", radius)?;
        Ok(self)
    }

    pub fn with_soul(mut self, soul: SoulTensor) -> Self {
        self.soul = Some(soul);
        self
    }

    /// Assemble from already-validated parts.
    pub(crate) fn from_parts(
        id: AttractorId,
        position: Vector3,
        mass: f64,
        radius: f64,
        soul: Option<SoulTensor>,
    ) -> Self {
        Self {
            id,
            position,
            mass,
            radius,
            soul,
        }
    }

    pub fn id(&self) -> &AttractorId {
        &self.id
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn soul(&self) -> Option<&SoulTensor> {
        self.soul.as_ref()
    }

    pub fn validate(&self) -> std::result::Result<(), StateError> {
        StateError::check_finite("position.x", self.position.x)?;
        StateError::check_finite("position.y", self.position.y)?;
        StateError::check_finite("position.z", self.position.z)?;
        StateError::check_positive("mass", self.mass)?;
        StateError::check_non_negative("radius", self.radius)?;
        if let Some(soul) = &self.soul {
            soul.validate()?;
        }
        Ok(())
    }

    pub(crate) fn as_source(&self) -> FieldSource {
        FieldSource {
            position: self.position,
            mass: self.mass,
            resonance: self.soul.map(|s| (s.amplitude(), s.frequency())),
        }
    }
}

/// Point mass contributing to a field sample, with optional
/// `(amplitude, frequency)` resonance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FieldSource {
    pub position: Vector3,
    pub mass: f64,
    pub resonance: Option<(f64, f64)>,
}

/// Result of sampling the field at a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSample {
    pub force: Vector3,
    pub resonance: f64,
}

impl FieldSample {
    pub fn into_parts(self) -> (Vector3, f64) {
        (self.force, self.resonance)
    }
}

/// The static part of the world: attractors plus the global physical constants.
///
/// Constants change only through the spacetime controller; attractors only
/// through explicit add/remove.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    attractors: BTreeMap<AttractorId, Attractor>,
    gravity_constant: f64,
    time_scale: f64,
    epsilon: f64,
    reference_frequency: f64,
    spacetime_torsion: Option<f64>,
    boundary: Option<BoundaryEncoding>,
}

impl PhysicsWorld {
    pub fn new(config: FieldConfig) -> Result<Self> {
        config.validate()?;
        let mut world = Self {
            attractors: BTreeMap::new(),
            gravity_constant: config.gravity_constant,
            time_scale: config.time_scale,
            epsilon: config.epsilon,
            reference_frequency: config.reference_frequency,
            spacetime_torsion: config.spacetime_torsion,
            boundary: None,
        };
        if let Some(boundary) = config.boundary {
            world.install_boundary(boundary);
        }
        Ok(world)
    }

    pub fn gravity_constant(&self) -> f64 {
        self.gravity_constant
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn reference_frequency(&self) -> f64 {
        self.reference_frequency
    }

    pub fn spacetime_torsion(&self) -> Option<f64> {
        self.spacetime_torsion
    }

    pub fn boundary(&self) -> Option<&HolographicBoundary> {
        self.boundary.as_ref().map(|b| b.boundary())
    }

    /// How many attractors the installed boundary currently covers.
    pub fn boundary_coverage(&self) -> Option<usize> {
        self.boundary.as_ref().map(|b| b.encoded_count())
    }

    pub fn attractors(&self) -> impl Iterator<Item = &Attractor> {
        self.attractors.values()
    }

    pub fn attractor(&self, id: &AttractorId) -> Option<&Attractor> {
        self.attractors.get(id)
    }

    pub fn attractor_count(&self) -> usize {
        self.attractors.len()
    }

    /// Insert an attractor. Fails on an invalid record or an id already in use.
    pub fn add_attractor(&mut self, attractor: Attractor) -> Result<()> {
        attractor.validate()?;
        if self.attractors.contains_key(attractor.id()) {
            return Err(KernelError::DuplicateAttractor(attractor.id().clone()));
        }
        self.attractors.insert(attractor.id().clone(), attractor);
        self.reencode();
        Ok(())
    }

    pub fn remove_attractor(&mut self, id: &AttractorId) -> Result<Attractor> {
        let removed = self
            .attractors
            .remove(id)
            .ok_or_else(|| KernelError::AttractorNotFound(id.clone()))?;
        self.reencode();
        Ok(removed)
    }

    /// Force and resonance at `point`, resonance measured against the
    /// configured reference frequency.
    pub fn sample_field(&self, point: Vector3) -> FieldSample {
        self.sample_field_at_frequency(point, self.reference_frequency)
    }

    /// Like [`sample_field`](Self::sample_field) with resonance measured
    /// against `frequency`.
    ///
    /// Without a boundary this sums every attractor exactly (O(N)). With one,
    /// distant shell cells are summed as single sources and nearby cells
    /// member by member.
    pub fn sample_field_at_frequency(&self, point: Vector3, frequency: f64) -> FieldSample {
        match &self.boundary {
            Some(encoding) => self.accumulate(point, frequency, encoding.sources_for(point)),
            None => self.accumulate(
                point,
                frequency,
                self.attractors.values().map(Attractor::as_source),
            ),
        }
    }

    /// Exact O(N) sample regardless of any installed boundary.
    pub fn sample_field_exact(&self, point: Vector3) -> FieldSample {
        self.accumulate(
            point,
            self.reference_frequency,
            self.attractors.values().map(Attractor::as_source),
        )
    }

    fn accumulate(
        &self,
        point: Vector3,
        frequency: f64,
        sources: impl Iterator<Item = FieldSource>,
    ) -> FieldSample {
        let mut sample = FieldSample::default();
        for source in sources {
            let (direction, distance) = direction_and_distance(point, source.position);
            let clamped = distance.max(self.epsilon);
            sample.force += direction * (self.gravity_constant * source.mass / (clamped * clamped));
            if let Some((amplitude, source_frequency)) = source.resonance {
                sample.resonance +=
                    amplitude * frequency_similarity(frequency, source_frequency) / (1.0 + distance);
            }
        }
        if let Some(torsion) = self.spacetime_torsion {
            sample.force += Vector3::Y.cross(sample.force) * torsion;
        }
        sample
    }

    pub(crate) fn set_constants(&mut self, gravity_constant: f64, time_scale: f64) {
        self.gravity_constant = gravity_constant;
        self.time_scale = time_scale;
    }

    pub(crate) fn install_boundary(&mut self, boundary: HolographicBoundary) {
        self.boundary = Some(BoundaryEncoding::encode(boundary, self.attractors.values()));
    }

    fn reencode(&mut self) {
        if let Some(encoding) = &self.boundary {
            let boundary = encoding.boundary().clone();
            self.boundary = Some(BoundaryEncoding::encode(boundary, self.attractors.values()));
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            attractors: BTreeMap::new(),
            gravity_constant: 1.0,
            time_scale: 1.0,
            epsilon: 0.1,
            reference_frequency: 1.0,
            spacetime_torsion: None,
            boundary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3, b: Vector3) -> bool {
        (a - b).length() < 1e-9
    }

    fn well(id: &str, x: f64, mass: f64) -> Attractor {
        Attractor::new(id, Vector3::new(x, 0.0, 0.0), mass).unwrap()
    }

    #[test]
    fn attractor_rejects_invalid_mass_and_radius() {
        assert!(Attractor::new("a", Vector3::ZERO, 0.0).is_err());
        assert!(Attractor::new("a", Vector3::ZERO, 1.0).unwrap().with_radius(-1.0).is_err());
    }

    #[test]
    fn empty_field_is_zero() {
        let world = PhysicsWorld::default();
        assert_eq!(world.sample_field(Vector3::ONE), FieldSample::default());
    }

    #[test]
    fn inverse_square_toward_attractor() {
        let mut world = PhysicsWorld::default();
        world.add_attractor(well("a", 2.0, 8.0)).unwrap();
        let sample = world.sample_field(Vector3::ZERO);
        // G * m / d^2 = 1 * 8 / 4
        assert!(close(sample.force, Vector3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn near_zero_distance_is_clamped() {
        let mut world = PhysicsWorld::default();
        world.add_attractor(well("a", 0.01, 1.0)).unwrap();
        let sample = world.sample_field(Vector3::ZERO);
        assert!(sample.force.is_finite());
        // clamped to epsilon = 0.1 => 1 / 0.01
        assert!((sample.force.length() - 100.0).abs() < 1e-9);

        let on_top = world.sample_field(Vector3::new(0.01, 0.0, 0.0));
        assert_eq!(on_top.force, Vector3::ZERO);
    }

    #[test]
    fn symmetric_configuration_gives_opposite_forces() {
        let mut world = PhysicsWorld::default();
        world.add_attractor(well("left", -5.0, 3.0)).unwrap();
        world.add_attractor(well("right", 5.0, 3.0)).unwrap();

        let p = Vector3::new(2.0, 1.5, -0.5);
        let a = world.sample_field(p);
        let b = world.sample_field(-p);
        assert!((a.force.length() - b.force.length()).abs() < 1e-12);
        assert!(close(a.force, -b.force));
    }

    #[test]
    fn sum_is_independent_of_insertion_order() {
        let mut w1 = PhysicsWorld::default();
        let mut w2 = PhysicsWorld::default();
        let wells = [well("a", 1.0, 1.0), well("b", -3.0, 2.0), well("c", 7.0, 5.0)];
        for w in wells.iter().cloned() {
            w1.add_attractor(w).unwrap();
        }
        for w in wells.iter().rev().cloned() {
            w2.add_attractor(w).unwrap();
        }
        let p = Vector3::new(0.3, 0.2, 0.1);
        assert_eq!(w1.sample_field(p), w2.sample_field(p));
    }

    #[test]
    fn resonance_prefers_matching_frequency() {
        let mut world = PhysicsWorld::default();
        let soul = SoulTensor::new(2.0, 5.0).unwrap();
        world.add_attractor(well("a", 1.0, 1.0).with_soul(soul)).unwrap();
        let matched = world.sample_field_at_frequency(Vector3::ZERO, 5.0);
        let detuned = world.sample_field_at_frequency(Vector3::ZERO, 9.0);
        assert!(matched.resonance > detuned.resonance);
        // amplitude * 1 / (1 + distance)
        assert!((matched.resonance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_attractor_rejected() {
        let mut world = PhysicsWorld::default();
        world.add_attractor(well("a", 1.0, 1.0)).unwrap();
        let err = world.add_attractor(well("a", 2.0, 1.0)).unwrap_err();
        assert_eq!(err, KernelError::DuplicateAttractor(AttractorId::from("a")));
        assert_eq!(world.attractor_count(), 1);
    }

    #[test]
    fn remove_missing_attractor_is_not_found() {
        let mut world = PhysicsWorld::default();
        world.add_attractor(well("a", 1.0, 1.0)).unwrap();
        let err = world.remove_attractor(&AttractorId::from("zzz")).unwrap_err();
        assert!(matches!(err, KernelError::AttractorNotFound(_)));
        assert_eq!(world.attractor_count(), 1);
        assert!(world.remove_attractor(&AttractorId::from("a")).is_ok());
        assert_eq!(world.attractor_count(), 0);
    }

    #[test]
    fn torsion_twists_without_changing_radial_part() {
        let config = FieldConfig {
            spacetime_torsion: Some(0.5),
            ..FieldConfig::default()
        };
        let mut world = PhysicsWorld::new(config).unwrap();
        world.add_attractor(well("a", 2.0, 4.0)).unwrap();
        let sample = world.sample_field(Vector3::ZERO);
        assert!((sample.force.x - 1.0).abs() < 1e-12);
        // Y x (1,0,0) = (0,0,-1), scaled by torsion
        assert!((sample.force.z + 0.5).abs() < 1e-12);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = FieldConfig {
            time_scale: -1.0,
            ..FieldConfig::default()
        };
        assert!(PhysicsWorld::new(config).is_err());
    }
}
