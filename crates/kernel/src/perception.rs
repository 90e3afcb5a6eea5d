//! Multi-sense perception of the surrounding field.
//!
//! Every attractor and every other entity within `range` of the observer is a
//! stimulus. Vision is gated by facing: only stimuli in front of the observer
//! (`forward · direction > 0`) are seen. Touch and balance are omnidirectional.
//! Smell and taste are saturating blends of non-negative per-stimulus terms
//! (resonance, pressure, unsigned spin flux), bounded to `[0, 1)` and
//! non-decreasing as stimuli are added.
//!
//! Perception only reads world state. The narrative line is formatted last,
//! from the finished numbers, and never feeds back into them.

use serde::{Deserialize, Serialize};

use resonance_common::math::direction_and_distance;
use resonance_common::{SoulTensor, Vector3, frequency_similarity};

use crate::entity::Entity;
use crate::field::{Attractor, PhysicsWorld};
use crate::narrative::Narrator;

/// What an observer senses in one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Senses {
    /// Facing-gated brightness, in `[0, 1)`.
    pub visual_clarity: f64,
    /// Sum of `1 / (1 + |Δf|)` over resonant stimuli.
    pub auditory_resonance: f64,
    /// Sum of `mass / distance²`.
    pub haptic_pressure: f64,
    /// Sum of `spin / distance`.
    pub vestibular_balance: f64,
    pub olfactory_essence: f64,
    pub gustatory_chemistry: f64,
    pub narrative: String,
}

/// A body the observer can sense.
#[derive(Debug, Clone, Copy)]
struct Stimulus<'a> {
    position: Vector3,
    mass: f64,
    soul: Option<&'a SoulTensor>,
}

impl<'a> From<&'a Attractor> for Stimulus<'a> {
    fn from(a: &'a Attractor) -> Self {
        Self {
            position: a.position(),
            mass: a.mass(),
            soul: a.soul(),
        }
    }
}

impl<'a> From<&'a Entity> for Stimulus<'a> {
    fn from(e: &'a Entity) -> Self {
        Self {
            position: e.position(),
            mass: e.mass(),
            soul: Some(e.soul()),
        }
    }
}

/// Perceive the attractors of `physics` and the `others` entities from
/// `observer`'s point of view. The observer itself is skipped if it appears
/// among `others`. A negative or non-finite `range` senses nothing.
pub fn perceive<'a>(
    observer: &Entity,
    range: f64,
    physics: &'a PhysicsWorld,
    others: impl IntoIterator<Item = &'a Entity>,
    narrator: &dyn Narrator,
) -> Senses {
    let stimuli = physics.attractors().map(Stimulus::from).chain(
        others
            .into_iter()
            .filter(|e| e.id() != observer.id())
            .map(Stimulus::from),
    );
    let mut senses = sense(observer, range, physics.epsilon(), stimuli);
    senses.narrative = narrator.narrate(&senses);
    senses
}

fn sense<'a>(
    observer: &Entity,
    range: f64,
    epsilon: f64,
    stimuli: impl Iterator<Item = Stimulus<'a>>,
) -> Senses {
    let mut senses = Senses::default();
    if !(range.is_finite() && range >= 0.0) {
        return senses;
    }

    let origin = observer.position();
    let forward = observer.forward();
    let frequency = observer.soul().frequency();
    let mut brightness = 0.0;
    // unsigned spin flux: opposite spins never cancel
    let mut agitation = 0.0;

    for stimulus in stimuli {
        let (direction, distance) = direction_and_distance(origin, stimulus.position);
        if distance > range {
            continue;
        }
        let clamped = distance.max(epsilon);

        let alignment = forward.dot(direction);
        if alignment > 0.0 {
            let amplitude = stimulus.soul.map_or(0.0, |s| s.amplitude());
            brightness += alignment * (1.0 + amplitude) / (1.0 + distance);
        }

        senses.haptic_pressure += stimulus.mass / (clamped * clamped);

        if let Some(soul) = stimulus.soul {
            senses.auditory_resonance += frequency_similarity(frequency, soul.frequency());
            senses.vestibular_balance += soul.spin() / clamped;
            agitation += soul.spin().abs() / clamped;
        }
    }

    senses.visual_clarity = saturate(brightness);
    senses.olfactory_essence = saturate(senses.auditory_resonance + 0.1 * senses.haptic_pressure);
    senses.gustatory_chemistry = saturate(0.5 * senses.haptic_pressure + agitation);
    senses
}

/// Monotonic map of `[0, ∞)` onto `[0, 1)`.
fn saturate(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        0.0
    } else if x.is_infinite() {
        1.0
    } else {
        x / (1.0 + x)
    }
}
