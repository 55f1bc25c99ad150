use std::time::{Duration, Instant};

/// Frame counter that reports once per `interval`.
#[derive(Debug)]
pub struct FpsCounter {
    interval: Duration,
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self::with_interval(now, Duration::from_secs(1))
    }

    pub fn with_interval(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            window_start: now,
            frames: 0,
        }
    }

    /// Count one frame; returns the average rate when an interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }
        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}
