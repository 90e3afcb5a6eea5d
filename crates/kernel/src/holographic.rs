//! Holographic boundary: approximate field sampling over a spherical shell.
//!
//! Attractors inside the boundary are binned by direction from its center into
//! `resolution` shell cells laid out on a Fibonacci sphere. Each cell keeps its
//! total mass, mass-weighted centroid and amplitude-weighted frequency. A cell
//! whose centroid lies far from the sample point compared with the cell's
//! spread is sampled as a single point source; a nearby cell is summed member
//! by member. Distant structure costs O(resolution) instead of O(attractors),
//! while attractors close to the sample point keep their exact pull, so the
//! ranking of contributions is preserved anywhere inside the boundary.
//!
//! Attractors outside the boundary are not encoded and are summed exactly.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use resonance_common::Vector3;

use crate::error::{KernelError, Result};
use crate::field::{Attractor, FieldSource};

/// Shape of an approximate sampling shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolographicBoundary {
    pub center: Vector3,
    pub radius: f64,
    /// Number of shell cells.
    pub resolution: usize,
}

impl Default for HolographicBoundary {
    fn default() -> Self {
        Self {
            center: Vector3::ZERO,
            radius: 100.0,
            resolution: 32,
        }
    }
}

impl HolographicBoundary {
    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() {
            return Err(KernelError::InvalidConfig(
                "boundary center must be finite".into(),
            ));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(KernelError::InvalidConfig(format!(
                "boundary radius must be finite and > 0, got {}",
                self.radius
            )));
        }
        if self.resolution == 0 {
            return Err(KernelError::InvalidConfig(
                "boundary resolution must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn contains(&self, point: Vector3) -> bool {
        point.distance(self.center) <= self.radius
    }
}

/// Ratio of distance to spread beyond which a cell is sampled as one source.
const OPENING_RATIO: f64 = 2.0;

#[derive(Debug, Clone)]
struct ShellCell {
    members: Vec<FieldSource>,
    merged: FieldSource,
    /// Largest member distance from the merged centroid.
    spread: f64,
}

impl ShellCell {
    fn from_members(members: Vec<FieldSource>) -> Self {
        let mut mass = 0.0;
        let mut weighted_position = Vector3::ZERO;
        let mut amplitude = 0.0;
        let mut weighted_frequency = 0.0;
        for m in &members {
            mass += m.mass;
            weighted_position += m.position * m.mass;
            if let Some((a, f)) = m.resonance {
                amplitude += a;
                weighted_frequency += f * a;
            }
        }
        let centroid = weighted_position / mass;
        let spread = members
            .iter()
            .map(|m| m.position.distance(centroid))
            .fold(0.0, f64::max);
        Self {
            members,
            merged: FieldSource {
                position: centroid,
                mass,
                resonance: (amplitude > 0.0).then(|| (amplitude, weighted_frequency / amplitude)),
            },
            spread,
        }
    }

    /// The merged source when `point` is far from the cell, its members otherwise.
    fn sources_for(&self, point: Vector3) -> &[FieldSource] {
        if point.distance(self.merged.position) > OPENING_RATIO * self.spread {
            std::slice::from_ref(&self.merged)
        } else {
            &self.members
        }
    }
}

/// A boundary together with the attractors currently encoded onto it.
///
/// Attractors outside the radius are kept aside and always summed exactly.
#[derive(Debug, Clone)]
pub(crate) struct BoundaryEncoding {
    boundary: HolographicBoundary,
    cells: Vec<ShellCell>,
    exterior: Vec<FieldSource>,
    encoded: usize,
}

impl BoundaryEncoding {
    pub fn encode<'a>(
        boundary: HolographicBoundary,
        attractors: impl Iterator<Item = &'a Attractor>,
    ) -> Self {
        let normals = fibonacci_sphere(boundary.resolution.max(1));
        let mut bins: Vec<Vec<FieldSource>> = vec![Vec::new(); normals.len()];
        let mut exterior = Vec::new();
        let mut encoded = 0;

        for attractor in attractors {
            if !boundary.contains(attractor.position()) {
                exterior.push(attractor.as_source());
                continue;
            }
            let direction = (attractor.position() - boundary.center).normalize_or_zero();
            bins[nearest_normal(&normals, direction)].push(attractor.as_source());
            encoded += 1;
        }

        let cells: Vec<ShellCell> = bins
            .into_iter()
            .filter(|members| !members.is_empty())
            .map(ShellCell::from_members)
            .collect();

        tracing::debug!(
            resolution = normals.len(),
            occupied = cells.len(),
            encoded,
            exterior = exterior.len(),
            radius = boundary.radius,
            "encoded holographic boundary"
        );

        Self {
            boundary,
            cells,
            exterior,
            encoded,
        }
    }

    pub fn boundary(&self) -> &HolographicBoundary {
        &self.boundary
    }

    /// Number of attractors folded into the shell.
    pub fn encoded_count(&self) -> usize {
        self.encoded
    }

    /// Sources to sum when sampling at `point`: one per distant cell, the
    /// members of nearby cells, and every exterior attractor.
    pub fn sources_for(&self, point: Vector3) -> impl Iterator<Item = FieldSource> + '_ {
        self.cells
            .iter()
            .flat_map(move |cell| cell.sources_for(point).iter().copied())
            .chain(self.exterior.iter().copied())
    }
}

fn nearest_normal(normals: &[Vector3], direction: Vector3) -> usize {
    let mut best = 0;
    let mut best_dot = f64::NEG_INFINITY;
    for (i, n) in normals.iter().enumerate() {
        let d = n.dot(direction);
        if d > best_dot {
            best = i;
            best_dot = d;
        }
    }
    best
}

/// `n` roughly evenly spaced unit vectors.
fn fibonacci_sphere(n: usize) -> Vec<Vector3> {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f64;
            Vector3::new(theta.cos() * r, y, theta.sin() * r)
        })
        .collect()
}
