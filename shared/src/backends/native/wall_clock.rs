use std::sync::OnceLock;
use std::time::Instant;

static ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Monotonic wall-clock milliseconds, anchored at first use.
///
/// Used for RTT measurement and frame pacing only; simulation time is a
/// separate axis and never derives from this clock.
pub struct WallClock;

impl WallClock {
    /// Milliseconds elapsed since the first call in this process.
    pub fn now_ms() -> f64 {
        let anchor = ANCHOR.get_or_init(Instant::now);
        anchor.elapsed().as_secs_f64() * 1000.0
    }
}
