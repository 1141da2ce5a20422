//! Erosion front behavior over realistic and adversarial step sequences

use crate::common::{probe_angles, rng};
use proptest::prelude::*;
use sparkler_sim::{Erosion, ErosionConfig};

fn erosion(seed: u64, config: ErosionConfig) -> (Erosion, rand::rngs::StdRng) {
    let mut rng = rng(seed);
    let erosion = Erosion::new(config, &mut rng).expect("valid erosion config");
    (erosion, rng)
}

#[test]
fn test_reaches_cap_in_one_long_step() {
    let config = ErosionConfig {
        burn_duration: 5.0,
        ..ErosionConfig::default()
    };
    let (mut erosion, mut rng) = erosion(11, config);
    erosion.advance(10.0, &mut rng);

    for &height in erosion.column_heights() {
        assert_eq!(height, 0.75);
    }
    assert!((erosion.average_height() - 0.75).abs() < 1e-6);
    assert!(erosion.is_fully_burned());
}

#[test]
fn test_steady_burn_reaches_cap() {
    let config = ErosionConfig {
        burn_duration: 5.0,
        ..ErosionConfig::default()
    };
    let (mut erosion, mut rng) = erosion(12, config);
    for _ in 0..1200 {
        erosion.advance(1.0 / 60.0, &mut rng);
    }
    assert!(erosion.column_heights().iter().all(|&h| h >= 0.75));
}

#[test]
fn test_invalid_steps_change_nothing() {
    let (mut erosion, mut rng) = erosion(13, ErosionConfig::default());
    for _ in 0..30 {
        erosion.advance(0.05, &mut rng);
    }
    let heights = erosion.column_heights().to_vec();
    let elapsed = erosion.elapsed();

    for dt in [f32::NAN, f32::NEG_INFINITY, f32::INFINITY, -1.0, 0.0] {
        erosion.advance(dt, &mut rng);
    }
    assert_eq!(erosion.column_heights(), heights.as_slice());
    assert_eq!(erosion.elapsed(), elapsed);
}

#[test]
fn test_front_stays_cohesive() {
    let (mut erosion, mut rng) = erosion(14, ErosionConfig::default());
    for _ in 0..600 {
        erosion.advance(1.0 / 60.0, &mut rng);
    }
    let average = erosion.average_height();
    let spread = erosion
        .column_heights()
        .iter()
        .map(|h| (h - average).abs())
        .fold(0.0, f32::max);
    assert!(average > 0.1);
    assert!(spread < 0.1, "columns drifted {spread} from the average");
}

#[test]
fn test_reset_returns_to_unburnt() {
    let (mut erosion, mut rng) = erosion(15, ErosionConfig::default());
    for _ in 0..120 {
        erosion.advance(0.05, &mut rng);
    }
    erosion.reset();

    assert_eq!(erosion.average_height(), 0.0);
    assert_eq!(erosion.elapsed(), 0.0);
    for angle in probe_angles(16) {
        assert_eq!(erosion.height_at_angle(angle), 0.0);
    }
}

#[test]
fn test_invalid_config_rejected() {
    let config = ErosionConfig {
        columns: 0,
        ..ErosionConfig::default()
    };
    let mut rng = rng(16);
    assert!(Erosion::new(config, &mut rng).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_rendered_height_never_decreases(
        seed in any::<u64>(),
        steps in prop::collection::vec(
            prop_oneof![
                8 => 0.0f32..0.1,
                1 => 0.1f32..2.0,
                1 => -1.0f32..0.0,
            ],
            1..120,
        ),
    ) {
        let (mut erosion, mut rng) = erosion(seed, ErosionConfig::default());
        let angles = probe_angles(37);
        let mut last: Vec<f32> = angles.iter().map(|&a| erosion.height_at_angle(a)).collect();

        for dt in steps {
            erosion.advance(dt, &mut rng);
            for (angle, before) in angles.iter().zip(last.iter_mut()) {
                let now = erosion.height_at_angle(*angle);
                prop_assert!(now >= *before, "height at {} fell from {} to {}", angle, before, now);
                *before = now;
            }
        }
    }

    #[test]
    fn prop_columns_respect_cap(
        seed in any::<u64>(),
        max_progress in 0.2f32..1.0,
        steps in prop::collection::vec(0.0f32..0.5, 1..80),
    ) {
        let config = ErosionConfig {
            max_progress,
            ..ErosionConfig::default()
        };
        let (mut erosion, mut rng) = erosion(seed, config);
        for dt in steps {
            erosion.advance(dt, &mut rng);
            for &height in erosion.column_heights() {
                prop_assert!((0.0..=max_progress).contains(&height));
            }
        }
    }
}
