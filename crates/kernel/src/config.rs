//! Typed configuration for the field and the spacetime controller.
//!
//! Every field has a default matching the documented constants, and
//! `#[serde(default)]` lets a partial document override only what it names.

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};
use crate::holographic::HolographicBoundary;

/// Global constants a [`PhysicsWorld`](crate::PhysicsWorld) starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub gravity_constant: f64,
    pub time_scale: f64,
    /// Distances below this are clamped when computing inverse-square terms.
    pub epsilon: f64,
    /// Frequency that `sample_field` measures resonance against.
    pub reference_frequency: f64,
    /// Twist applied to the field about the world Y axis.
    pub spacetime_torsion: Option<f64>,
    /// Boundary installed from the start instead of waiting for the controller.
    pub boundary: Option<HolographicBoundary>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            gravity_constant: 1.0,
            time_scale: 1.0,
            epsilon: 0.1,
            reference_frequency: 1.0,
            spacetime_torsion: None,
            boundary: None,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        positive("gravity_constant", self.gravity_constant)?;
        positive("time_scale", self.time_scale)?;
        positive("epsilon", self.epsilon)?;
        non_negative("reference_frequency", self.reference_frequency)?;
        if let Some(torsion) = self.spacetime_torsion {
            if !torsion.is_finite() {
                return Err(KernelError::InvalidConfig(format!(
                    "spacetime_torsion must be finite, got {torsion}"
                )));
            }
        }
        if let Some(boundary) = &self.boundary {
            boundary.validate()?;
        }
        Ok(())
    }
}

/// Tuning for [`SpacetimeOrchestrator`](crate::SpacetimeOrchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Entropy above which spacetime contracts.
    pub entropy_threshold: f64,
    /// Minimum number of ticks between two adjustments.
    pub cooldown: u64,
    pub gravity_gain: f64,
    pub gravity_decay: f64,
    pub time_dilation: f64,
    pub time_recovery: f64,
    pub gravity_min: f64,
    pub gravity_max: f64,
    pub time_scale_min: f64,
    pub time_scale_max: f64,
    /// Boundary installed on the first high-entropy adjustment.
    pub boundary_template: HolographicBoundary,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            entropy_threshold: 0.7,
            cooldown: 10,
            gravity_gain: 1.2,
            gravity_decay: 0.98,
            time_dilation: 0.8,
            time_recovery: 1.02,
            gravity_min: 0.1,
            gravity_max: 50.0,
            time_scale_min: 0.25,
            time_scale_max: 2.0,
            boundary_template: HolographicBoundary::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.entropy_threshold) {
            return Err(KernelError::InvalidConfig(format!(
                "entropy_threshold must lie in [0, 1], got {}",
                self.entropy_threshold
            )));
        }
        positive("gravity_gain", self.gravity_gain)?;
        positive("gravity_decay", self.gravity_decay)?;
        positive("time_dilation", self.time_dilation)?;
        positive("time_recovery", self.time_recovery)?;
        positive("gravity_min", self.gravity_min)?;
        positive("time_scale_min", self.time_scale_min)?;
        ordered("gravity", self.gravity_min, self.gravity_max)?;
        ordered("time_scale", self.time_scale_min, self.time_scale_max)?;
        self.boundary_template.validate()
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidConfig(format!(
            "{field} must be finite and > 0, got {value}"
        )))
    }
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidConfig(format!(
            "{field} must be finite and >= 0, got {value}"
        )))
    }
}

fn ordered(name: &str, min: f64, max: f64) -> Result<()> {
    if max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(KernelError::InvalidConfig(format!(
            "{name} bounds are inverted: min={min} max={max}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(FieldConfig::default().validate().is_ok());
        assert!(OrchestratorConfig::default().validate().is_ok());
    }

    #[test]
    fn orchestrator_defaults_match_documented_constants() {
        let c = OrchestratorConfig::default();
        assert_eq!(c.entropy_threshold, 0.7);
        assert_eq!(c.gravity_max, 50.0);
        assert_eq!(c.gravity_min, 0.1);
        assert_eq!(c.time_scale_min, 0.25);
        assert_eq!(c.time_scale_max, 2.0);
    }

    #[test]
    fn rejects_non_positive_gravity() {
        let config = FieldConfig {
            gravity_constant: 0.0,
            ..FieldConfig::default()
        };
        assert!(matches!(config.validate(), Err(KernelError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let config = OrchestratorConfig {
            time_scale_min: 3.0,
            ..OrchestratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: OrchestratorConfig = serde_yaml::from_str("cooldown: 5\n").unwrap();
        assert_eq!(config.cooldown, 5);
        assert_eq!(config.gravity_gain, 1.2);

        let field: FieldConfig = serde_yaml::from_str("gravity_constant: 2.5\n").unwrap();
        assert_eq!(field.gravity_constant, 2.5);
        assert_eq!(field.epsilon, 0.1);
    }
}
