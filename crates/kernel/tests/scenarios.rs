use resonance_kernel::{
    Attractor, Crystallization, EntityId, Entity, FieldConfig, HolographicBoundary,
    KernelError, MatterState, OrchestratorConfig, PhysicsState, PhysicsWorld, Quaternion,
    SoulTensor, SpacetimeOrchestrator, ThermalState, Vector3, World, WorldEvent,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn orchestrated_world(cooldown: u64) -> World {
    let mut world = World::new();
    world.register_system(
        SpacetimeOrchestrator::new(OrchestratorConfig {
            cooldown,
            ..OrchestratorConfig::default()
        })
        .unwrap(),
    );
    world
}

fn adjustments(world: &World) -> usize {
    world
        .events()
        .iter()
        .filter(|e| matches!(e, WorldEvent::ConstantsAdjusted { .. }))
        .count()
}

#[test]
fn cooling_entity_crystallizes_and_freezes() {
    let mut world = World::new();
    let mass = 3.0;
    let id = world
        .spawn_entity(
            Entity::new(
                "ember",
                PhysicsState::new(Vector3::new(4.0, 5.0, 6.0), mass).unwrap(),
                SoulTensor::default(),
            )
            .with_thermal(ThermalState::new(1000.0, 50.0).unwrap()),
        )
        .unwrap();

    for _ in 0..19 {
        world.step(1.0);
    }
    let thermal = *world.get(&id).unwrap().thermal().unwrap();
    assert_eq!(thermal.temperature(), 50.0);
    assert_eq!(thermal.state(), MatterState::Solid);

    world.step(1.0);
    let thermal = *world.get(&id).unwrap().thermal().unwrap();
    assert_eq!(thermal.temperature(), 0.0);
    assert_eq!(thermal.state(), MatterState::Crystal);

    // terminal: more ticks change nothing
    world.step(1.0);
    assert_eq!(world.get(&id).unwrap().thermal().unwrap().temperature(), 0.0);

    let attractor_id = world.freeze(&id).unwrap();
    assert!(world.get(&id).is_none());
    let attractor = world.physics().attractor(&attractor_id).unwrap();
    assert_eq!(attractor.mass(), 10.0 * mass);
    assert_eq!(attractor.radius(), mass);
    assert_eq!(attractor.position(), Vector3::new(4.0, 5.0, 6.0));
}

#[test]
fn phase_sequence_never_reverses_during_run() {
    let mut world = World::new();
    world
        .spawn_entity(
            Entity::new(
                "e",
                PhysicsState::new(Vector3::ZERO, 1.0).unwrap(),
                SoulTensor::default(),
            )
            .with_thermal(ThermalState::new(1500.0, 13.0).unwrap()),
        )
        .unwrap();
    let id = EntityId::from("e");
    let mut seen = vec![world.get(&id).unwrap().phase().unwrap()];
    for _ in 0..200 {
        world.step(0.75);
        let phase = world.get(&id).unwrap().phase().unwrap();
        assert!(phase >= *seen.last().unwrap());
        if phase != *seen.last().unwrap() {
            seen.push(phase);
        }
    }
    assert_eq!(seen, MatterState::ALL.to_vec());
}

#[test]
fn high_entropy_burst_adjusts_once_per_cooldown() {
    let mut world = orchestrated_world(5);
    assert_eq!(world.physics().gravity_constant(), 1.0);
    for _ in 0..5 {
        world.set_global_entropy(0.9);
        world.step(1.0);
    }
    assert_eq!(adjustments(&world), 1);
    assert!(close(world.physics().gravity_constant(), 1.2));
    assert!(close(world.physics().time_scale(), 0.8));
    assert!(world.physics().boundary().is_some());

    // the sixth tick opens the next window
    world.step(1.0);
    assert_eq!(adjustments(&world), 2);
    assert!(close(world.physics().gravity_constant(), 1.44));
}

#[test]
fn constants_stay_bounded_over_long_runs() {
    let config = OrchestratorConfig {
        cooldown: 1,
        ..OrchestratorConfig::default()
    };
    let mut world = World::new();
    world.register_system(SpacetimeOrchestrator::new(config.clone()).unwrap());

    let mut last_adjust_tick = None;
    for i in 0..5_000u64 {
        // bursts of disorder alternating with calm stretches
        let entropy = if (i / 200) % 2 == 0 { 0.95 } else { 0.05 };
        world.set_global_entropy(entropy);
        let before = adjustments(&world);
        world.step(0.1);
        let g = world.physics().gravity_constant();
        let t = world.physics().time_scale();
        assert!((config.gravity_min..=config.gravity_max).contains(&g));
        assert!((config.time_scale_min..=config.time_scale_max).contains(&t));
        if adjustments(&world) > before {
            if let Some(prev) = last_adjust_tick {
                assert!(world.tick() - prev >= config.cooldown);
            }
            last_adjust_tick = Some(world.tick());
        }
    }
}

#[test]
fn cooldown_spacing_holds_for_arbitrary_signal() {
    let mut world = orchestrated_world(7);
    let mut ticks = Vec::new();
    for i in 0..300u64 {
        world.set_global_entropy(((i * 37) % 101) as f64 / 100.0);
        let before = adjustments(&world);
        world.step(1.0);
        if adjustments(&world) > before {
            ticks.push(world.tick());
        }
    }
    assert!(!ticks.is_empty());
    for pair in ticks.windows(2) {
        assert!(pair[1] - pair[0] >= 7);
    }
}

#[test]
fn boundary_is_installed_once() {
    let mut world = orchestrated_world(1);
    world.set_global_entropy(1.0);
    for _ in 0..10 {
        world.step(1.0);
    }
    let installs = world
        .events()
        .iter()
        .filter(|e| matches!(e, WorldEvent::BoundaryInstalled { .. }))
        .count();
    assert_eq!(installs, 1);
}

#[test]
fn symmetric_wells_give_opposite_forces() {
    let mut physics = PhysicsWorld::new(FieldConfig::default()).unwrap();
    physics
        .add_attractor(Attractor::new("a", Vector3::new(0.0, 4.0, 0.0), 2.0).unwrap())
        .unwrap();
    physics
        .add_attractor(Attractor::new("b", Vector3::new(0.0, -4.0, 0.0), 2.0).unwrap())
        .unwrap();
    for p in [Vector3::new(1.0, 0.5, 0.0), Vector3::new(-2.0, 3.0, 1.0)] {
        let f1 = physics.sample_field(p).force;
        let f2 = physics.sample_field(-p).force;
        assert!(close(f1.length(), f2.length()));
        assert!((f1 + f2).length() < 1e-12);
    }
}

#[test]
fn turning_observer_away_removes_only_vision() {
    let mut world = World::new();
    let observer = world
        .spawn_entity(Entity::new(
            "observer",
            PhysicsState::new(Vector3::ZERO, 1.0).unwrap(),
            SoulTensor::new(1.0, 2.0).unwrap(),
        ))
        .unwrap();
    world
        .add_attractor(
            Attractor::new("beacon", Vector3::new(0.0, 0.0, 5.0), 20.0)
                .unwrap()
                .with_soul(SoulTensor::new(3.0, 2.0).unwrap().with_spin(4.0).unwrap()),
        )
        .unwrap();

    let before = world.perceive(&observer, 10.0).unwrap();
    world
        .turn_entity(&observer, &Quaternion::from_axis_angle(Vector3::Y, std::f64::consts::PI))
        .unwrap();
    let after = world.perceive(&observer, 10.0).unwrap();

    assert!(before.visual_clarity > 0.0);
    assert_eq!(after.visual_clarity, 0.0);
    assert!(after.haptic_pressure >= before.haptic_pressure);
    assert!(after.vestibular_balance >= before.vestibular_balance);
    assert_ne!(before.narrative, after.narrative);
}

#[test]
fn crystallization_system_archives_cooled_entities() {
    let mut world = World::new();
    world.register_system(Crystallization::new());
    for i in 0..5 {
        world
            .spawn_entity(
                Entity::new(
                    format!("e{i}"),
                    PhysicsState::new(Vector3::new(i as f64 * 3.0, 0.0, 0.0), 1.0).unwrap(),
                    SoulTensor::default(),
                )
                .with_thermal(ThermalState::new(100.0 * (i + 1) as f64, 100.0).unwrap()),
            )
            .unwrap();
    }
    for _ in 0..10 {
        world.step(1.0);
    }
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.physics().attractor_count(), 5);
}

#[test]
fn failed_freeze_leaves_world_unchanged() {
    let mut world = World::new();
    world
        .add_attractor(Attractor::new("frozen_x", Vector3::ONE, 1.0).unwrap())
        .unwrap();
    world
        .spawn_entity(
            Entity::new(
                "x",
                PhysicsState::new(Vector3::ZERO, 1.0).unwrap(),
                SoulTensor::default(),
            )
            .with_thermal(ThermalState::new(0.0, 1.0).unwrap()),
        )
        .unwrap();
    let hash = world.state_hash();
    let err = world.freeze(&EntityId::from("x")).unwrap_err();
    assert!(matches!(err, KernelError::DuplicateAttractor(_)));
    assert_eq!(world.state_hash(), hash);
}

#[test]
fn identical_inputs_replay_identically() {
    let run = || {
        let mut world = World::with_physics(
            PhysicsWorld::new(FieldConfig {
                boundary: Some(HolographicBoundary::default()),
                ..FieldConfig::default()
            })
            .unwrap(),
        );
        world.register_system(
            SpacetimeOrchestrator::new(OrchestratorConfig {
                cooldown: 3,
                ..OrchestratorConfig::default()
            })
            .unwrap(),
        );
        world.register_system(Crystallization::new());
        for i in 0..8 {
            world
                .add_attractor(
                    Attractor::new(
                        format!("w{i}"),
                        Vector3::new((i as f64).cos() * 20.0, 0.0, (i as f64).sin() * 20.0),
                        5.0 + i as f64,
                    )
                    .unwrap(),
                )
                .unwrap();
        }
        for i in 0..16 {
            world
                .spawn_entity(
                    Entity::new(
                        format!("e{i:02}"),
                        PhysicsState::new(Vector3::new(i as f64, 1.0, -(i as f64)), 1.0 + i as f64)
                            .unwrap(),
                        SoulTensor::new(1.0, i as f64).unwrap(),
                    )
                    .with_thermal(ThermalState::new(50.0 * i as f64, 25.0).unwrap()),
                )
                .unwrap();
        }
        for tick in 0..120u64 {
            world.set_global_entropy(if tick % 40 < 20 { 0.9 } else { 0.1 });
            world.step(0.5);
        }
        (world.state_hash(), world.events().to_vec())
    };
    assert_eq!(run(), run());
}
