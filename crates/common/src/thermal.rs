use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StateError;

/// Phase of matter, ordered from hottest to coldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatterState {
    Plasma,
    Gas,
    Liquid,
    Solid,
    Crystal,
}

impl MatterState {
    pub const PLASMA_ABOVE: f64 = 800.0;
    pub const GAS_FROM: f64 = 500.0;
    pub const LIQUID_FROM: f64 = 200.0;
    pub const SOLID_FROM: f64 = 50.0;

    /// All phases in cooling order.
    pub const ALL: [MatterState; 5] = [
        MatterState::Plasma,
        MatterState::Gas,
        MatterState::Liquid,
        MatterState::Solid,
        MatterState::Crystal,
    ];

    /// Pure, monotonic (non-increasing) map from temperature to phase.
    pub fn from_temperature(temperature: f64) -> Self {
        if temperature > Self::PLASMA_ABOVE {
            MatterState::Plasma
        } else if temperature >= Self::GAS_FROM {
            MatterState::Gas
        } else if temperature >= Self::LIQUID_FROM {
            MatterState::Liquid
        } else if temperature >= Self::SOLID_FROM {
            MatterState::Solid
        } else {
            MatterState::Crystal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatterState::Plasma => "plasma",
            MatterState::Gas => "gas",
            MatterState::Liquid => "liquid",
            MatterState::Solid => "solid",
            MatterState::Crystal => "crystal",
        }
    }
}

impl fmt::Display for MatterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temperature and cooling rate of a body.
///
/// The phase is never stored: [`ThermalState::state`] derives it from the
/// current temperature on every read, so it cannot go stale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalState {
    temperature: f64,
    cooling_rate: f64,
}

impl ThermalState {
    pub fn new(temperature: f64, cooling_rate: f64) -> Result<Self, StateError> {
        let thermal = Self {
            temperature,
            cooling_rate,
        };
        thermal.validate()?;
        Ok(thermal)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn cooling_rate(&self) -> f64 {
        self.cooling_rate
    }

    pub fn state(&self) -> MatterState {
        MatterState::from_temperature(self.temperature)
    }

    pub fn is_crystalline(&self) -> bool {
        self.state() == MatterState::Crystal
    }

    /// Lower the temperature by `cooling_rate * dt`, floored at zero.
    ///
    /// One-way: `Crystal` is terminal and further calls are no-ops, and a
    /// negative or non-finite `dt` never reheats. Returns the phase after the call.
    pub fn cool_down(&mut self, dt: f64) -> MatterState {
        if self.is_crystalline() || !dt.is_finite() || dt <= 0.0 {
            return self.state();
        }
        self.temperature = (self.temperature - self.cooling_rate * dt).max(0.0);
        self.state()
    }

    pub fn validate(&self) -> Result<(), StateError> {
        StateError::check_non_negative("temperature", self.temperature)?;
        StateError::check_non_negative("cooling_rate", self.cooling_rate)?;
        Ok(())
    }
}
