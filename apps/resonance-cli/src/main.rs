mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use resonance_common::EntityId;
use resonance_kernel::{FieldConfig, OrchestratorConfig, Senses, World, WorldEvent};
use resonance_tools::{PhaseHistogram, WorldInspector, WorldSummary};

use crate::scenario::ScenarioConfig;

#[derive(Parser)]
#[command(name = "resonance-cli", about = "Drive the resonance kernel from the command line")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and default constants
    Info,
    /// Step a scenario and report the final state
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "100")]
        ticks: u64,
        /// Time step per tick
        #[arg(long, default_value = "0.1")]
        dt: f64,
        /// Constant entropy signal, overriding the scenario schedule
        #[arg(short, long)]
        entropy: Option<f64>,
        /// YAML scenario file; the built-in demo scene is used without one
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report what one entity senses, optionally after stepping
    Perceive {
        /// Observer entity id
        #[arg(short, long)]
        observer: String,
        /// Sensing range
        #[arg(short, long, default_value = "50.0")]
        range: f64,
        /// Ticks to simulate before perceiving
        #[arg(short, long, default_value = "0")]
        ticks: u64,
        /// Time step per tick
        #[arg(long, default_value = "0.1")]
        dt: f64,
        /// YAML scenario file; the built-in demo scene is used without one
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the senses as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct RunReport {
    summary: WorldSummary,
    phases: PhaseHistogram,
    adjustments: usize,
    crystallized: usize,
    state_hash: String,
}

#[derive(Serialize)]
struct PerceiveReport<'a> {
    observer: &'a EntityId,
    tick: u64,
    range: f64,
    senses: Senses,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("resonance-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: tick={}", World::new().tick());
            println!("tools: {}", resonance_tools::crate_info());
            println!("field defaults:\n{}", serde_yaml::to_string(&FieldConfig::default())?);
            println!(
                "orchestrator defaults:\n{}",
                serde_yaml::to_string(&OrchestratorConfig::default())?
            );
        }
        Commands::Run {
            ticks,
            dt,
            entropy,
            config,
            json,
        } => {
            let scenario = ScenarioConfig::load_or_demo(config.as_deref())?;
            let mut world = scenario.build_world()?;
            tracing::info!(ticks, dt, entities = world.entity_count(), "run started");
            let tally = drive(&mut world, &scenario, ticks, dt, entropy);

            let report = run_report(&world, &tally);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary);
                println!("{}", report.phases);
                println!(
                    "Adjustments: {}  Crystallized: {}",
                    report.adjustments, report.crystallized
                );
                for id in WorldInspector::list_entities(&world) {
                    if let Some(info) = WorldInspector::inspect_entity(&world, &id) {
                        println!("  {info}");
                    }
                }
                println!("State hash: {}", report.state_hash);
            }
        }
        Commands::Perceive {
            observer,
            range,
            ticks,
            dt,
            config,
            json,
        } => {
            let scenario = ScenarioConfig::load_or_demo(config.as_deref())?;
            let mut world = scenario.build_world()?;
            drive(&mut world, &scenario, ticks, dt, None);

            let observer = EntityId::from(observer);
            let senses = world
                .perceive(&observer, range)
                .with_context(|| format!("perceiving from {observer} at tick {}", world.tick()))?;
            if json {
                let report = PerceiveReport {
                    observer: &observer,
                    tick: world.tick(),
                    range,
                    senses,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Observer {observer} at tick {} (range {range}):", world.tick());
                println!("  visual clarity:      {:.4}", senses.visual_clarity);
                println!("  auditory resonance:  {:.4}", senses.auditory_resonance);
                println!("  haptic pressure:     {:.4}", senses.haptic_pressure);
                println!("  vestibular balance:  {:.4}", senses.vestibular_balance);
                println!("  olfactory essence:   {:.4}", senses.olfactory_essence);
                println!("  gustatory chemistry: {:.4}", senses.gustatory_chemistry);
                println!("  \"{}\"", senses.narrative);
            }
        }
    }

    Ok(())
}

/// Event counts gathered while driving the world.
#[derive(Debug, Default, PartialEq)]
struct EventTally {
    adjustments: usize,
    crystallized: usize,
}

impl EventTally {
    fn record(&mut self, events: &[WorldEvent]) {
        for event in events {
            match event {
                WorldEvent::ConstantsAdjusted { .. } => self.adjustments += 1,
                WorldEvent::Crystallized { .. } => self.crystallized += 1,
                _ => {}
            }
        }
    }
}

/// The external loop: feed entropy, step, drain the event log, repeat.
fn drive(
    world: &mut World,
    scenario: &ScenarioConfig,
    ticks: u64,
    dt: f64,
    entropy: Option<f64>,
) -> EventTally {
    let mut tally = EventTally::default();
    tally.record(&world.drain_events());
    for i in 0..ticks {
        world.set_global_entropy(scenario.entropy_at(i, entropy));
        world.step(dt);
        tally.record(&world.drain_events());
    }
    tally
}

fn run_report(world: &World, tally: &EventTally) -> RunReport {
    RunReport {
        summary: WorldInspector::summary(world),
        phases: WorldInspector::phase_histogram(world),
        adjustments: tally.adjustments,
        crystallized: tally.crystallized,
        state_hash: format!("{:#018x}", world.state_hash()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_keeps_event_log_empty() {
        let scenario = ScenarioConfig::demo();
        let mut world = scenario.build_world().unwrap();
        let tally = drive(&mut world, &scenario, 200, 0.5, None);
        assert!(world.events().is_empty());
        assert_eq!(world.tick(), 200);
        assert!(tally.adjustments >= 1);
    }

    #[test]
    fn tally_counts_adjustments_and_freezes() {
        let mut tally = EventTally::default();
        tally.record(&[
            WorldEvent::Stepped { tick: 1 },
            WorldEvent::ConstantsAdjusted {
                gravity_constant: 1.2,
                time_scale: 0.8,
            },
            WorldEvent::Crystallized {
                entity: "e".into(),
                attractor: "frozen_e".into(),
            },
        ]);
        assert_eq!(
            tally,
            EventTally {
                adjustments: 1,
                crystallized: 1,
            }
        );
    }
}
