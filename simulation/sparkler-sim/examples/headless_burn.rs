//! Burn one sparkler on a fixed tick clock and print a line per second
//!
//! Run with `RUST_LOG=debug` to see lifecycle events.

use sparkler_sim::ignition::seconds_to_ticks;
use sparkler_sim::{BurnClock, BurnState, FrameInput, Sparkler, SparklerConfig, TICKS_PER_SECOND};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let clock = BurnClock::default();
    let mut sparkler = Sparkler::new(SparklerConfig::default().with_seed(2024))?;
    let dt = 1.0 / TICKS_PER_SECOND as f32;

    let lit_at = Some(1);
    let end = seconds_to_ticks(45.0);

    println!("tick  state      progress  height  primaries  cascades  particles  light");
    for tick in 1..=end {
        let input = FrameInput::burning(dt, clock.burn_progress(lit_at, tick))
            .with_fade(clock.fade_factor(lit_at, tick));
        let state = sparkler.simulate_frame(input);

        if tick % i64::from(TICKS_PER_SECOND) == 0 {
            let snap = sparkler.snapshot();
            let light = snap.light.map_or(0, |l| l.level());
            println!(
                "{tick:>4}  {:<9}  {:>8.3}  {:>6.3}  {:>9}  {:>8}  {:>9}  {light:>5}",
                format!("{state:?}"),
                snap.burn_progress,
                snap.average_height,
                snap.primary_count,
                snap.cascade_count,
                snap.total_particles,
            );
        }

        if state == BurnState::BurnedOut && sparkler.light().is_none() {
            println!("Light out after {tick} ticks");
            break;
        }
    }

    Ok(())
}
