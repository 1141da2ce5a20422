//! Whole-lifecycle runs of a single sparkler

use crate::common::{FRAME, burn, config, probe_angles, sparkler};
use glam::{Mat4, Vec3};
use pretty_assertions::assert_eq;
use sparkler_sim::{
    BurnClock, BurnState, EmissionLayers, FrameInput, Sparkler, SparklerConfig, TICKS_PER_SECOND,
};

#[test]
fn test_full_lifecycle() {
    let mut s = sparkler(1, EmissionLayers::all());
    assert_eq!(s.state(), BurnState::Unlit);

    // 0.15 per second reaches the 0.75 cap after five seconds
    let progress = burn(&mut s, 290, 0.0, 0.15);
    assert_eq!(s.state(), BurnState::Burning);
    let burning = s.snapshot();
    assert!(!burning.sparks.is_empty());
    assert!(burning.primary_count > 0);
    assert!(burning.cascade_count > 0);
    assert!(burning.points_fired > 0);
    assert_eq!(burning.light.map(|l| l.intensity), Some(1.0));
    assert!(!burning.fully_burned);
    assert!((burning.average_height - progress).abs() < 0.01);

    burn(&mut s, 20, progress, 0.15);
    assert_eq!(s.state(), BurnState::BurnedOut);
    let out = s.snapshot();
    assert!(out.fully_burned);
    assert!(s.erosion().is_fully_burned());
    assert!((out.average_height - 0.75).abs() < 1e-6);
    assert_eq!(out.burn_progress, 0.75);
    assert_eq!(out.light.map(|l| l.intensity), Some(1.0));

    // Sparks already in flight play out; nothing new is spawned
    let live_at_burnout = out.total_particles;
    for _ in 0..120 {
        s.simulate_frame(FrameInput::burning(FRAME, 0.75));
    }
    let settled = s.snapshot();
    assert!(settled.total_particles <= live_at_burnout);
    assert_eq!(settled.primary_count, 0);
    assert_eq!(settled.cascade_count, 0);

    // Hold for ten seconds then fade over one
    for _ in 0..600 {
        s.simulate_frame(FrameInput::burning(FRAME, 0.75));
    }
    assert!(s.light().is_none());
    assert_eq!(s.state(), BurnState::BurnedOut);
}

#[test]
fn test_height_monotonic_through_burn() {
    let mut s = sparkler(2, EmissionLayers::default());
    let angles = probe_angles(64);
    let mut last: Vec<f32> = angles.iter().map(|&a| s.height_at_angle(a)).collect();

    let mut progress = 0.0;
    for _ in 0..600 {
        s.simulate_frame(FrameInput::burning(FRAME, progress));
        progress += 0.1 * FRAME;
        for (angle, before) in angles.iter().zip(last.iter_mut()) {
            let now = s.height_at_angle(*angle);
            assert!(now >= *before, "height at {angle} fell from {before} to {now}");
            *before = now;
        }
    }
    assert!(s.average_height() > 0.0);
}

#[test]
fn test_unlit_clears_everything() {
    let mut s = sparkler(3, EmissionLayers::all());
    burn(&mut s, 120, 0.0, 0.1);
    assert!(!s.snapshot().sparks.is_empty());

    assert_eq!(s.simulate_frame(FrameInput::unlit(FRAME)), BurnState::Unlit);
    let snap = s.snapshot();
    assert!(snap.sparks.is_empty());
    assert_eq!(snap.total_particles, 0);
    assert_eq!(snap.light, None);
    assert!(snap.spark_lights.is_empty());
    assert_eq!(snap.average_height, 0.0);
    assert_eq!(snap.points_fired, 0);
    assert!(snap.profile.iter().all(|p| p.height() == 0.0));
}

#[test]
fn test_relight_after_unlit_starts_fresh() {
    let mut s = sparkler(4, EmissionLayers::default());
    burn(&mut s, 200, 0.0, 0.1);
    let frames = s.frame();
    s.simulate_frame(FrameInput::unlit(FRAME));

    assert_eq!(s.simulate_frame(FrameInput::burning(FRAME, 0.0)), BurnState::Burning);
    assert_eq!(s.frame(), frames + 2);
    assert!(s.average_height() < 0.01);
}

#[test]
fn test_relight_after_burnout() {
    let mut s = sparkler(5, EmissionLayers::default());
    burn(&mut s, 10, 0.0, 0.1);
    s.simulate_frame(FrameInput::burning(FRAME, 1.0));
    assert_eq!(s.state(), BurnState::BurnedOut);

    // Host restarted its clock
    assert_eq!(s.simulate_frame(FrameInput::burning(FRAME, 0.05)), BurnState::Burning);
    assert_eq!(s.light().map(|l| l.intensity), Some(1.0));
    assert_eq!(s.snapshot().burn_progress, 0.05);
}

#[test]
fn test_same_seed_same_frames() {
    let run = |seed| {
        let mut s = sparkler(seed, EmissionLayers::all());
        let mut snapshots = Vec::new();
        let mut progress = 0.0;
        for _ in 0..90 {
            s.simulate_frame(FrameInput::burning(FRAME, progress));
            progress += 0.2 * FRAME;
            snapshots.push(s.snapshot());
        }
        snapshots
    };

    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn test_garbage_input_is_sanitized() {
    let mut s = sparkler(6, EmissionLayers::default());
    burn(&mut s, 60, 0.0, 0.1);
    let height = s.average_height();

    let garbage = FrameInput {
        dt: f32::NAN,
        burn_progress: f32::NAN,
        fade: f32::INFINITY,
        lit: true,
        transform: Mat4::from_cols_array(&[f32::NAN; 16]),
    };
    assert_eq!(s.simulate_frame(garbage), BurnState::Burning);
    assert_eq!(s.average_height(), height);
    assert!(s.world_burn_point().is_finite());

    // A huge step is clamped; the front only catches up with the host
    s.simulate_frame(FrameInput::burning(1000.0, 0.2));
    assert!(s.average_height() <= 0.2 + 0.004 + 1e-6);
    assert!(s.average_height() > height);
}

#[test]
fn test_burn_point_follows_transform() {
    let mut s = sparkler(7, EmissionLayers::BALLISTIC);
    let offset = Vec3::new(100.0, 64.0, -20.0);
    let transform = Mat4::from_translation(offset);

    let mut progress = 0.0;
    for _ in 0..30 {
        s.simulate_frame(FrameInput::burning(FRAME, progress).with_transform(transform));
        progress += 0.1 * FRAME;
    }

    assert!((s.world_burn_point() - (s.burn_point() + offset)).length() < 1e-4);
    let snap = s.snapshot();
    assert!(snap.sparks.iter().all(|spark| spark.position.distance(offset) < 5.0));
}

#[test]
fn test_faded_sparkler_stops_emitting() {
    let mut s = sparkler(8, EmissionLayers::BALLISTIC | EmissionLayers::CASCADE);
    for _ in 0..60 {
        s.simulate_frame(FrameInput::burning(FRAME, 0.3).with_fade(0.0));
    }
    assert_eq!(s.snapshot().total_particles, 0);
    assert_eq!(s.state(), BurnState::Burning);
}

#[test]
fn test_populations_stay_bounded() {
    let mut config: SparklerConfig = config(9, EmissionLayers::all());
    config.emission.max_primary_sparks = 20;
    config.emission.max_cascade_sparks = 150;
    let mut s = Sparkler::new(config).expect("valid config");

    let mut progress = 0.0;
    for _ in 0..300 {
        s.simulate_frame(FrameInput::burning(FRAME, progress));
        progress += 0.1 * FRAME;
        assert!(s.primaries().len() <= 20);
        assert!(s.cascades().len() <= 150);
    }
}

#[test]
fn test_tick_clock_drives_burn() {
    let clock = BurnClock {
        duration_ticks: 100,
        ..BurnClock::default()
    };
    let mut s = sparkler(10, EmissionLayers::default());
    let lit_at = Some(1);
    let dt = 1.0 / TICKS_PER_SECOND as f32;

    let mut states = Vec::new();
    for tick in 1..=120 {
        let input = FrameInput::burning(dt, clock.burn_progress(lit_at, tick))
            .with_fade(clock.fade_factor(lit_at, tick));
        states.push(s.simulate_frame(input));
    }

    // 75 ticks to reach the cap
    assert_eq!(states[74], BurnState::Burning);
    assert_eq!(states[75], BurnState::BurnedOut);
    assert!(clock.is_fully_burned(lit_at, 120));
}

#[test]
fn test_front_follows_host_progress() {
    // Host clock runs four times faster than the erosion's own clock
    let mut config = config(11, EmissionLayers::default());
    config.erosion.burn_duration = 120.0;
    let mut s = Sparkler::new(config).expect("valid config");

    let progress = burn(&mut s, 240, 0.0, 0.1);
    assert_eq!(s.state(), BurnState::Burning);
    let last_input = progress - 0.1 * FRAME;
    assert!((s.average_height() - last_input).abs() <= 0.004 + 1e-4);
    assert!(!s.snapshot().fully_burned);
}

#[test]
fn test_burnout_completes_erosion() {
    let mut s = sparkler(12, EmissionLayers::all());
    let angles = probe_angles(32);

    let mut progress = 0.0;
    let mut last: Vec<f32> = angles.iter().map(|&a| s.height_at_angle(a)).collect();
    while s.state() != BurnState::BurnedOut {
        s.simulate_frame(FrameInput::burning(FRAME, progress));
        progress += 0.5 * FRAME;
        let snap = s.snapshot();
        assert_eq!(snap.fully_burned, s.erosion().is_fully_burned());
        for (angle, before) in angles.iter().zip(last.iter_mut()) {
            let now = s.height_at_angle(*angle);
            assert!(now >= *before);
            *before = now;
        }
    }

    let out = s.snapshot();
    assert!(out.fully_burned);
    assert!((out.average_height - 0.75).abs() < 1e-6);
    assert!(out.profile.iter().all(|p| p.melt >= 0.75 - 1e-6));
    assert!(s.erosion().column_heights().iter().all(|&h| h == 0.75));

    // Staying burnt out keeps the ring complete
    for _ in 0..30 {
        s.simulate_frame(FrameInput::burning(FRAME, 0.75));
    }
    assert!(s.snapshot().fully_burned);
}
