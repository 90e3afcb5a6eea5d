//! Spacetime controller: tunes the global constants from the world's entropy signal.
//!
//! # Invariants
//! - At most one adjustment per `cooldown` ticks, counted in ticks.
//! - Adjustments are multiplicative and clamped, so the constants approach
//!   their bounds geometrically and never leave them.

use serde::Serialize;

use crate::config::OrchestratorConfig;
use crate::error::Result;
use crate::system::System;
use crate::world::World;

/// Which way the controller pushed spacetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Regime {
    /// Entropy above threshold: stronger gravity, slower time.
    Contract,
    /// Entropy at or below threshold: gravity relaxes, time recovers.
    Relax,
}

/// The constants the controller wants to apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustment {
    pub regime: Regime,
    pub gravity_constant: f64,
    pub time_scale: f64,
    pub install_boundary: bool,
}

/// Feedback controller mapping `global_entropy` to gravity and time scale.
#[derive(Debug, Clone)]
pub struct SpacetimeOrchestrator {
    config: OrchestratorConfig,
    last_adjustment: Option<u64>,
    adjustments: u64,
}

impl SpacetimeOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            last_adjustment: None,
            adjustments: 0,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Tick of the most recent adjustment.
    pub fn last_adjustment(&self) -> Option<u64> {
        self.last_adjustment
    }

    /// Total adjustments applied.
    pub fn adjustments(&self) -> u64 {
        self.adjustments
    }

    /// Whether the cooldown has elapsed at `tick`.
    pub fn ready(&self, tick: u64) -> bool {
        match self.last_adjustment {
            None => true,
            Some(last) => tick.saturating_sub(last) >= self.config.cooldown,
        }
    }

    /// Pure control law: the constants that follow from `entropy` and the
    /// current state. Out-of-range results are clamped to the configured bounds.
    pub fn decide(
        &self,
        entropy: f64,
        gravity_constant: f64,
        time_scale: f64,
        boundary_active: bool,
    ) -> Adjustment {
        let c = &self.config;
        if entropy > c.entropy_threshold {
            Adjustment {
                regime: Regime::Contract,
                gravity_constant: (gravity_constant * c.gravity_gain)
                    .clamp(c.gravity_min, c.gravity_max),
                time_scale: (time_scale * c.time_dilation).clamp(c.time_scale_min, c.time_scale_max),
                install_boundary: !boundary_active,
            }
        } else {
            Adjustment {
                regime: Regime::Relax,
                gravity_constant: (gravity_constant * c.gravity_decay)
                    .clamp(c.gravity_min, c.gravity_max),
                time_scale: (time_scale * c.time_recovery).clamp(c.time_scale_min, c.time_scale_max),
                install_boundary: false,
            }
        }
    }
}

impl System for SpacetimeOrchestrator {
    fn name(&self) -> &str {
        "spacetime"
    }

    fn step(&mut self, world: &mut World, _dt: f64) {
        let tick = world.tick();
        if !self.ready(tick) {
            return;
        }
        let physics = world.physics();
        let adjustment = self.decide(
            world.global_entropy(),
            physics.gravity_constant(),
            physics.time_scale(),
            physics.boundary().is_some(),
        );
        world.apply_adjustment(&adjustment, &self.config.boundary_template);
        self.last_adjustment = Some(tick);
        self.adjustments += 1;
    }
}
