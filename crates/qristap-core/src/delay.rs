use std::time::Duration;

/// Blind timing pause between actions.
///
/// The device exposes no handshake for "the UI finished rendering", so every
/// pause in the system is an open-loop wait. Routing them through one trait
/// lets tests swap in a zero-latency stand-in and assert ordering without
/// real wall-clock waits.
pub trait Delay: Send + Sync {
    fn hold(&self, duration: Duration);
}

/// Real wall-clock pacing.
pub struct WallClock;

impl Delay for WallClock {
    fn hold(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tracing::info!("waiting for {:.1}s", duration.as_secs_f64());
        std::thread::sleep(duration);
    }
}

/// Zero-latency stand-in for tests.
pub struct NoDelay;

impl Delay for NoDelay {
    fn hold(&self, _duration: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn wall_clock_waits_at_least_the_requested_time() {
        let start = Instant::now();
        WallClock.hold(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn zero_hold_returns_immediately() {
        let start = Instant::now();
        WallClock.hold(Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(5));
    }
}
