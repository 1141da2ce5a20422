//! Emitters feeding bounded populations

use crate::common::{FRAME, rng};
use glam::{Mat4, Vec3};
use sparkler_sim::emission::{EmissionPoints, LayeredEmitter, RateEmitter};
use sparkler_sim::{SparkPopulation, StickGeometry};
use test_case::test_case;

const BURN_POINT: Vec3 = Vec3::new(0.5, 0.6, 0.5);

#[test]
fn test_rate_ceiling_five_at_intensity_hundred() {
    let mut rng = rng(1);
    let mut emitter = RateEmitter::new(0.016);
    let mut population = SparkPopulation::new(5);

    let spawned = emitter.emit(1.0, 100.0, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng);
    assert_eq!(spawned, 5);
    assert_eq!(population.len(), 5);

    // A full population absorbs further frames without growing
    for _ in 0..10 {
        emitter.emit(FRAME, 100.0, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng);
        assert!(population.len() <= 5);
    }
    assert!(emitter.pending() <= emitter.interval(100.0));
}

#[test]
fn test_layered_ceiling_five_at_intensity_hundred() {
    let mut rng = rng(11);
    let mut emitter = LayeredEmitter::new();
    let mut population = SparkPopulation::new(5);

    let spawned = emitter.emit(100.0, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng);
    assert_eq!(spawned, 5);
    assert_eq!(population.len(), 5);
    // The core layer alone asks for far more than the ceiling
    assert!(population.iter().all(|s| s.kind == sparkler_sim::CascadeType::Core));

    let again = emitter.emit(100.0, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng);
    assert_eq!(again, 0);
    assert_eq!(population.len(), 5);
}

#[test_case(1.0 ; "full")]
#[test_case(0.5 ; "half")]
#[test_case(0.25 ; "quarter")]
fn test_rate_follows_intensity(intensity: f32) {
    let mut rng = rng(2);
    let mut emitter = RateEmitter::new(0.016);
    let mut population = SparkPopulation::new(10_000);

    let mut spawned = 0;
    for _ in 0..60 {
        spawned += emitter.emit(FRAME, intensity, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng);
    }

    // One second at interval 0.016 / intensity
    let expected = intensity / 0.016;
    assert!(
        (spawned as f32 - expected).abs() <= 2.0,
        "{spawned} spawns, expected about {expected}"
    );
}

#[test]
fn test_rate_idle_at_zero_intensity() {
    let mut rng = rng(3);
    let mut emitter = RateEmitter::new(0.016);
    let mut population = SparkPopulation::new(100);
    emitter.emit(0.01, 1.0, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng);

    assert_eq!(
        emitter.emit(1.0, 0.0, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng),
        0
    );
    assert_eq!(emitter.pending(), 0.0);
}

#[test]
fn test_layered_fills_coarse_layers_first() {
    let mut rng = rng(4);
    let mut population = SparkPopulation::new(20);
    let spawned = LayeredEmitter::new().emit(
        1.0,
        BURN_POINT,
        &Mat4::IDENTITY,
        &mut population,
        &mut rng,
    );

    assert_eq!(spawned, 20);
    // Core asks for at least 8, inner for at least 15, so hair never fits
    assert!(population.iter().all(|s| s.kind != sparkler_sim::CascadeType::Hair));
    assert_eq!(population.iter().next().map(|s| s.kind), Some(sparkler_sim::CascadeType::Core));
}

#[test]
fn test_layered_respects_ceiling_across_frames() {
    let mut rng = rng(5);
    let mut emitter = LayeredEmitter::new();
    let mut population = SparkPopulation::new(600);

    for _ in 0..120 {
        emitter.emit(1.0, BURN_POINT, &Mat4::IDENTITY, &mut population, &mut rng);
        assert!(population.len() <= 600);
        population.update(FRAME, &mut rng);
    }
    assert!(!population.is_empty());
}

#[test]
fn test_layered_sparks_placed_in_world() {
    let mut rng = rng(6);
    let mut population = SparkPopulation::new(600);
    let offset = Vec3::new(10.0, 64.0, -3.0);
    LayeredEmitter::new().emit(
        1.0,
        BURN_POINT,
        &Mat4::from_translation(offset),
        &mut population,
        &mut rng,
    );

    for spark in &population {
        assert!(spark.body.position.distance(BURN_POINT + offset) < 0.1);
    }
}

#[test]
fn test_points_fire_once_along_the_burn() {
    let mut rng = rng(7);
    let stick = StickGeometry::default();
    let mut points = EmissionPoints::new(10);
    let mut population = SparkPopulation::new(100_000);

    let mut progress = 0.0;
    let mut total = 0;
    while progress <= 1.0 {
        total += points.fire(progress, 1.0, &stick, &Mat4::IDENTITY, &mut population, &mut rng);
        progress += 0.01;
    }

    assert_eq!(points.fired_count(), 10);
    // 40-69 sparks per point
    assert!((400..=690).contains(&total), "{total}");

    // Nothing left to fire
    assert_eq!(
        points.fire(1.0, 1.0, &stick, &Mat4::IDENTITY, &mut population, &mut rng),
        0
    );
}

#[test]
fn test_points_jump_fires_all_passed() {
    let mut rng = rng(8);
    let stick = StickGeometry::default();
    let mut points = EmissionPoints::new(20);
    let mut population = SparkPopulation::new(100_000);

    points.fire(0.5, 1.0, &stick, &Mat4::IDENTITY, &mut population, &mut rng);
    // Points 0..=10 sit at or below 0.5
    assert_eq!(points.fired_count(), 11);
    assert!(points.has_fired(10));
    assert!(!points.has_fired(11));
}

#[test]
fn test_points_bounded_by_ceiling() {
    let mut rng = rng(9);
    let stick = StickGeometry::default();
    let mut points = EmissionPoints::new(60);
    let mut population = SparkPopulation::new(50);

    let spawned = points.fire(1.0, 1.0, &stick, &Mat4::IDENTITY, &mut population, &mut rng);
    assert!(spawned <= 50);
    assert_eq!(population.len(), spawned);
    assert_eq!(points.fired_count(), 60);
}

#[test]
fn test_faded_points_still_mark_fired() {
    let mut rng = rng(10);
    let stick = StickGeometry::default();
    let mut points = EmissionPoints::new(5);
    let mut population = SparkPopulation::new(1000);

    let spawned = points.fire(1.0, 0.0, &stick, &Mat4::IDENTITY, &mut population, &mut rng);
    assert_eq!(spawned, 0);
    assert_eq!(points.fired_count(), 5);
}
