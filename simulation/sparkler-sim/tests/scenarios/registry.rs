//! Many sparklers behind one registry

use std::time::{Duration, Instant};

use crate::common::FRAME;
use sparkler_sim::{
    BurnState, FrameInput, RegistryConfig, SparklerError, SparklerId, SparklerRegistry,
};

fn registry(timeout: Duration) -> SparklerRegistry {
    SparklerRegistry::new(RegistryConfig {
        idle_timeout: timeout,
        ..RegistryConfig::default()
    })
    .expect("valid registry config")
}

#[test]
fn test_hosts_drive_instances_independently() {
    let mut reg = registry(Duration::from_secs(10));
    let now = Instant::now();
    let a = SparklerId(1);
    let b = SparklerId(2);

    let mut progress = 0.0;
    for _ in 0..60 {
        reg.simulate_frame(a, FrameInput::burning(FRAME, progress), now)
            .expect("frame runs");
        progress += 0.1 * FRAME;
    }
    reg.simulate_frame(b, FrameInput::unlit(FRAME), now)
        .expect("frame runs");

    assert_eq!(reg.len(), 2);
    let a_state = reg.get(a).expect("a exists");
    let b_state = reg.get(b).expect("b exists");
    assert_eq!(a_state.state(), BurnState::Burning);
    assert!(a_state.average_height() > 0.0);
    assert_eq!(b_state.state(), BurnState::Unlit);
    assert_eq!(b_state.average_height(), 0.0);
}

#[test]
fn test_ids_get_distinct_streams() {
    let mut reg = registry(Duration::from_secs(10));
    let now = Instant::now();

    for id in [SparklerId(10), SparklerId(11)] {
        let mut progress = 0.0;
        for _ in 0..30 {
            reg.simulate_frame(id, FrameInput::burning(FRAME, progress), now)
                .expect("frame runs");
            progress += 0.1 * FRAME;
        }
    }

    let first = reg.get(SparklerId(10)).expect("exists").snapshot();
    let second = reg.get(SparklerId(11)).expect("exists").snapshot();
    assert_ne!(first.sparks, second.sparks);
}

#[test]
fn test_same_id_replays_after_destroy() {
    let mut reg = registry(Duration::from_secs(10));
    let now = Instant::now();
    let id = SparklerId(0xDEAD_BEEF);

    let run = |reg: &mut SparklerRegistry| {
        let mut progress = 0.0;
        for _ in 0..45 {
            reg.simulate_frame(id, FrameInput::burning(FRAME, progress), now)
                .expect("frame runs");
            progress += 0.1 * FRAME;
        }
        reg.destroy(id).expect("instance exists").snapshot()
    };

    let first = run(&mut reg);
    let second = run(&mut reg);
    assert_eq!(first, second);
    assert!(reg.is_empty());
}

#[test]
fn test_idle_instances_evicted() {
    let mut reg = registry(Duration::from_secs(2));
    let start = Instant::now();

    reg.simulate_frame(SparklerId(1), FrameInput::burning(FRAME, 0.1), start)
        .expect("frame runs");
    reg.simulate_frame(SparklerId(2), FrameInput::burning(FRAME, 0.1), start)
        .expect("frame runs");

    // Only the second keeps receiving frames
    for second in 1..=3 {
        let now = start + Duration::from_secs(second);
        reg.simulate_frame(SparklerId(2), FrameInput::burning(FRAME, 0.1), now)
            .expect("frame runs");
    }

    let evicted = reg.evict_idle(start + Duration::from_secs(3));
    assert_eq!(evicted, 1);
    assert!(!reg.contains(SparklerId(1)));
    assert!(reg.contains(SparklerId(2)));
    assert_eq!(
        reg.get(SparklerId(1)).err(),
        Some(SparklerError::UnknownInstance(SparklerId(1)))
    );
}

#[test]
fn test_evicted_id_comes_back_unlit() {
    let mut reg = registry(Duration::from_secs(1));
    let start = Instant::now();
    let id = SparklerId(7);

    reg.simulate_frame(id, FrameInput::burning(FRAME, 0.2), start)
        .expect("frame runs");
    assert_eq!(reg.evict_idle(start + Duration::from_secs(5)), 1);

    let later = start + Duration::from_secs(6);
    let sparkler = reg.get_or_create(id, later).expect("created");
    assert_eq!(sparkler.state(), BurnState::Unlit);
    assert_eq!(sparkler.frame(), 0);
}

#[test]
fn test_invalid_sparkler_config_rejected() {
    let mut config = RegistryConfig::default();
    config.sparkler.max_frame_delta = 0.0;
    assert!(matches!(
        SparklerRegistry::new(config),
        Err(SparklerError::InvalidConfig { .. })
    ));
}

#[test]
fn test_get_mut_does_not_create() {
    let mut reg = registry(Duration::from_secs(10));
    assert!(reg.get_mut(SparklerId(3)).is_err());
    assert!(reg.is_empty());

    reg.get_or_create(SparklerId(3), Instant::now())
        .expect("created");
    let ids: Vec<_> = reg.ids().collect();
    assert_eq!(ids, vec![SparklerId(3)]);
}
