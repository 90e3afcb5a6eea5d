//! Scenario files: a YAML description of a starting world and its entropy signal.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use resonance_common::{PhysicsState, Quaternion, SoulTensor, ThermalState, Vector3};
use resonance_kernel::{
    Attractor, Crystallization, Entity, FieldConfig, OrchestratorConfig, PhysicsWorld,
    SpacetimeOrchestrator, World,
};

/// Entropy fed to the controller when neither the command line nor the
/// scenario provides one.
const DEFAULT_ENTROPY: f64 = 0.5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub field: FieldConfig,
    pub orchestrator: OrchestratorConfig,
    /// Register the system that freezes crystalline entities every tick.
    pub crystallize: bool,
    pub entities: Vec<EntitySpec>,
    pub attractors: Vec<AttractorSpec>,
    /// Entropy per tick, repeated cyclically.
    pub entropy: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySpec {
    pub id: String,
    pub position: [f64; 3],
    pub mass: f64,
    pub amplitude: f64,
    pub frequency: f64,
    pub spin: f64,
    /// Rotation about the world Y axis, in degrees.
    pub yaw: f64,
    pub temperature: Option<f64>,
    pub cooling_rate: f64,
}

impl Default for EntitySpec {
    fn default() -> Self {
        Self {
            id: String::new(),
            position: [0.0; 3],
            mass: 1.0,
            amplitude: 1.0,
            frequency: 1.0,
            spin: 0.0,
            yaw: 0.0,
            temperature: None,
            cooling_rate: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractorSpec {
    pub id: String,
    pub position: [f64; 3],
    pub mass: f64,
    pub radius: f64,
    /// Resonance signature as `[amplitude, frequency]`.
    pub resonance: Option<[f64; 2]>,
}

impl Default for AttractorSpec {
    fn default() -> Self {
        Self {
            id: String::new(),
            position: [0.0; 3],
            mass: 1.0,
            radius: 0.0,
            resonance: None,
        }
    }
}

impl EntitySpec {
    fn build(&self) -> anyhow::Result<Entity> {
        let physics = PhysicsState::new(Vector3::from_array(self.position), self.mass)?;
        let soul = SoulTensor::new(self.amplitude, self.frequency)?
            .with_spin(self.spin)?
            .with_orientation(Quaternion::from_axis_angle(
                Vector3::Y,
                self.yaw.to_radians(),
            ));
        let mut entity = Entity::new(self.id.as_str(), physics, soul);
        if let Some(temperature) = self.temperature {
            entity = entity.with_thermal(ThermalState::new(temperature, self.cooling_rate)?);
        }
        Ok(entity)
    }
}

impl AttractorSpec {
    fn build(&self) -> anyhow::Result<Attractor> {
        let mut attractor =
            Attractor::new(self.id.as_str(), Vector3::from_array(self.position), self.mass)?
                .with_radius(self.radius)?;
        if let Some([amplitude, frequency]) = self.resonance {
            attractor = attractor.with_soul(SoulTensor::new(amplitude, frequency)?);
        }
        Ok(attractor)
    }
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Scenario file at `path`, or the built-in demo scene.
    pub fn load_or_demo(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::demo()),
        }
    }

    /// A small scene: two resonant wells and a ring of cooling bodies.
    pub fn demo() -> Self {
        let attractors = vec![
            AttractorSpec {
                id: "sun".into(),
                position: [0.0, 0.0, 0.0],
                mass: 40.0,
                radius: 2.0,
                resonance: Some([2.0, 1.0]),
            },
            AttractorSpec {
                id: "moon".into(),
                position: [30.0, 0.0, 10.0],
                mass: 8.0,
                radius: 0.5,
                resonance: Some([1.0, 3.0]),
            },
        ];
        let entities = (0..6)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 6.0;
                EntitySpec {
                    id: format!("wanderer-{i}"),
                    position: [angle.cos() * 15.0, 0.0, angle.sin() * 15.0],
                    mass: 1.0 + i as f64,
                    frequency: 1.0 + 0.5 * i as f64,
                    spin: if i % 2 == 0 { 0.5 } else { -0.5 },
                    yaw: i as f64 * 60.0,
                    temperature: Some(200.0 + 150.0 * i as f64),
                    cooling_rate: 25.0,
                    ..EntitySpec::default()
                }
            })
            .collect();
        Self {
            crystallize: true,
            entities,
            attractors,
            entropy: vec![0.9, 0.9, 0.8, 0.4, 0.2, 0.1],
            ..Self::default()
        }
    }

    /// Entropy for the `tick`-th step (zero-based). An explicit override wins
    /// over the schedule.
    pub fn entropy_at(&self, tick: u64, override_entropy: Option<f64>) -> f64 {
        if let Some(entropy) = override_entropy {
            return entropy;
        }
        if self.entropy.is_empty() {
            return DEFAULT_ENTROPY;
        }
        self.entropy[(tick % self.entropy.len() as u64) as usize]
    }

    pub fn build_world(&self) -> anyhow::Result<World> {
        let mut world = World::with_physics(PhysicsWorld::new(self.field.clone())?);
        world.register_system(SpacetimeOrchestrator::new(self.orchestrator.clone())?);
        if self.crystallize {
            world.register_system(Crystallization::new());
        }
        for spec in &self.attractors {
            let attractor = spec
                .build()
                .with_context(|| format!("attractor {:?}", spec.id))?;
            world.add_attractor(attractor)?;
        }
        for spec in &self.entities {
            let entity = spec.build().with_context(|| format!("entity {:?}", spec.id))?;
            world.spawn_entity(entity)?;
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_builds() {
        let scenario = ScenarioConfig::demo();
        let world = scenario.build_world().unwrap();
        assert_eq!(world.entity_count(), 6);
        assert_eq!(world.physics().attractor_count(), 2);
        assert_eq!(world.system_names(), vec!["spacetime", "crystallization"]);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = r#"
field:
  gravity_constant: 2.0
orchestrator:
  cooldown: 3
entities:
  - id: probe
    position: [1.0, 2.0, 3.0]
    temperature: 900.0
attractors:
  - id: well
    mass: 5.0
    resonance: [1.0, 2.0]
entropy: [0.9, 0.1]
"#;
        let scenario: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.field.time_scale, 1.0);
        assert_eq!(scenario.orchestrator.cooldown, 3);
        assert_eq!(scenario.entities[0].mass, 1.0);
        assert!(!scenario.crystallize);

        let world = scenario.build_world().unwrap();
        assert_eq!(world.physics().gravity_constant(), 2.0);
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.system_names(), vec!["spacetime"]);
    }

    #[test]
    fn entropy_schedule_cycles() {
        let scenario = ScenarioConfig {
            entropy: vec![0.9, 0.1],
            ..ScenarioConfig::default()
        };
        assert_eq!(scenario.entropy_at(0, None), 0.9);
        assert_eq!(scenario.entropy_at(3, None), 0.1);
        assert_eq!(scenario.entropy_at(3, Some(0.4)), 0.4);
        assert_eq!(ScenarioConfig::default().entropy_at(7, None), DEFAULT_ENTROPY);
    }

    #[test]
    fn invalid_entity_is_reported() {
        let scenario = ScenarioConfig {
            entities: vec![EntitySpec {
                id: "bad".into(),
                mass: -1.0,
                ..EntitySpec::default()
            }],
            ..ScenarioConfig::default()
        };
        let err = scenario.build_world().unwrap_err();
        assert!(format!("{err:#}").contains("bad"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let spec = AttractorSpec {
            id: "twin".into(),
            ..AttractorSpec::default()
        };
        let scenario = ScenarioConfig {
            attractors: vec![spec.clone(), spec],
            ..ScenarioConfig::default()
        };
        assert!(scenario.build_world().is_err());
    }
}
