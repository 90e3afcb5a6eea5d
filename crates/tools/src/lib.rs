//! Developer tooling: read-only world inspection for telemetry and CLI output.
//!
//! # Invariants
//! - Tools never mutate the world they inspect.

pub mod inspector;

pub use inspector::{EntityInfo, PhaseHistogram, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    concat!("resonance-tools v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
