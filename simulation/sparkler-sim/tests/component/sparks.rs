//! Spark lifecycles: phase events, ownership of descendants and death

use crate::common::rng;
use glam::Vec3;
use proptest::prelude::*;
use sparkler_sim::particles::PhaseEvents;
use sparkler_sim::{
    BallisticSpark, CascadePhase, CascadeSpark, CascadeType, Spark, SparkKind, SparkPopulation,
};

fn cascade(seed: u64, max_age: f32, kind: CascadeType) -> CascadeSpark {
    let mut rng = rng(seed);
    CascadeSpark::new(
        Vec3::new(0.5, 0.7, 0.5),
        Vec3::new(2.0, 1.5, 0.5),
        max_age,
        0.05,
        1.8,
        kind,
        &mut rng,
    )
}

/// Step until `update` reports the spark dead; returns the number of steps
fn run_to_death<S: Spark>(spark: &mut S, dt: f32, seed: u64) -> usize {
    let mut rng = rng(seed);
    let mut steps = 0;
    while spark.update(dt, &mut rng) {
        steps += 1;
        assert!(steps < 100_000, "spark never died");
    }
    steps
}

#[test]
fn test_cascade_visits_every_phase_in_order() {
    let mut spark = cascade(1, 0.5, CascadeType::Inner);
    let mut rng = rng(2);
    let mut seen = vec![spark.phase()];

    while spark.update(0.002, &mut rng) {
        if seen.last() != Some(&spark.phase()) {
            seen.push(spark.phase());
        }
    }

    assert_eq!(seen, CascadePhase::ALL.to_vec());
}

#[test]
fn test_cascade_events_fire_once_each() {
    let mut spark = cascade(3, 0.6, CascadeType::Core);
    let mut rng = rng(4);
    let mut fragments_after_split = None;

    while spark.update(1.0 / 60.0, &mut rng) {
        if spark.events().contains(PhaseEvents::SECONDARY_FRAGMENTED) && fragments_after_split.is_none() {
            fragments_after_split = Some(spark.fragments().len());
        }
        if let Some(count) = fragments_after_split {
            // No new top-level fragments once the split has happened
            assert!(spark.fragments().len() <= count);
        }
        assert!(spark.events_fired() <= 3);
    }

    assert_eq!(spark.events(), PhaseEvents::all());
    assert_eq!(spark.events_fired(), 3);
}

#[test]
fn test_fragment_count_in_range() {
    for seed in 0..20 {
        let mut spark = cascade(seed, 0.5, CascadeType::Outer);
        let mut rng = rng(seed + 100);
        while !spark.events().contains(PhaseEvents::FRAGMENTED) {
            assert!(spark.update(0.005, &mut rng));
        }
        assert!((3..=5).contains(&spark.fragments().len()));
    }
}

#[test]
fn test_cascade_outlives_itself_while_fragments_live() {
    let mut spark = cascade(5, 0.5, CascadeType::Inner);
    let mut rng = rng(6);

    let mut alive = true;
    while !spark.body.is_expired() {
        alive = spark.update(0.01, &mut rng);
    }

    assert!(alive);
    assert!(spark.live_descendants() > 0);

    let mut out = Vec::new();
    spark.collect_render(&mut out);
    assert!(out.iter().all(|s| s.kind != SparkKind::Core && s.kind != SparkKind::Inner));
    assert!(out.iter().any(|s| s.kind == SparkKind::Fragment));
}

#[test]
fn test_cascade_dies_with_its_last_descendant() {
    let mut spark = cascade(7, 0.4, CascadeType::Hair);
    run_to_death(&mut spark, 1.0 / 60.0, 8);

    assert!(spark.body.is_expired());
    assert_eq!(spark.live_descendants(), 0);
    let mut out = Vec::new();
    spark.collect_render(&mut out);
    assert!(out.is_empty());
}

#[test]
fn test_primary_lives_on_through_secondaries() {
    let mut rng = rng(9);
    let mut spark =
        BallisticSpark::primary_with_lifetime(Vec3::ZERO, Vec3::Y, 3.0, 1.0, 0.3, &mut rng);

    while !spark.has_exploded() {
        assert!(spark.update(0.02, &mut rng));
    }
    let secondaries = spark.children().len();
    assert!((3..=5).contains(&secondaries));
    assert!(spark.children().iter().all(|c| c.kind() == SparkKind::Secondary));
    assert_eq!(spark.live_descendants(), secondaries);

    run_to_death(&mut spark, 0.02, 10);
    assert_eq!(spark.live_descendants(), 0);
}

#[test]
fn test_population_ceiling_counts_top_level_only() {
    let mut rng = rng(11);
    let mut population = SparkPopulation::new(4);
    for _ in 0..10 {
        let spark = CascadeSpark::new(
            Vec3::ZERO,
            Vec3::new(1.0, 2.0, 0.0),
            0.5,
            0.05,
            1.5,
            CascadeType::Outer,
            &mut rng,
        );
        population.try_push(spark);
    }
    assert_eq!(population.len(), 4);
    assert!(!population.has_room());

    let mut peak = 0;
    for _ in 0..25 {
        population.update(0.016, &mut rng);
        peak = peak.max(population.total_live());
    }
    // Fragments ride on top of the ceiling
    assert!(peak > 4);
    assert!(population.len() <= 4);
}

#[test]
fn test_population_drops_dead_sparks_same_frame() {
    let mut rng = rng(12);
    let mut population = SparkPopulation::new(16);
    population.try_push(BallisticSpark::secondary(Vec3::ZERO, Vec3::X, 1.0, &mut rng));

    let mut frames = 0;
    while !population.is_empty() {
        population.update(0.05, &mut rng);
        frames += 1;
        assert!(frames < 1000);
    }
    let mut out = Vec::new();
    population.collect_render(&mut out);
    assert!(out.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_events_fire_at_most_once(
        seed in any::<u64>(),
        max_age in 0.2f32..1.5,
        steps in prop::collection::vec(0.001f32..0.2, 1..200),
    ) {
        let mut spark = cascade(seed, max_age, CascadeType::Outer);
        let mut rng = rng(seed ^ 0xFF);
        let mut last_phase = spark.phase();

        for dt in steps {
            let alive = spark.update(dt, &mut rng);
            prop_assert!(spark.phase() >= last_phase);
            prop_assert!(spark.events_fired() as usize == spark.events().iter().count());
            prop_assert!(spark.bloom_rays().len() <= sparkler_sim::particles::MAX_BLOOM_RAYS);
            last_phase = spark.phase();
            if !alive {
                prop_assert_eq!(spark.live_descendants(), 0);
                break;
            }
        }
    }
}
