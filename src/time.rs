//! Frame timing.
//!
//! [`FrameClock`] is ticked once per redraw and reports the delta the
//! camera controller integrates, plus a smoothed FPS for the panel.

use std::time::{Duration, Instant};

/// Per-frame clock.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Start a clock at `Instant::now()`.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance to now. Returns the delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        delta
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_returns_delta() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);

        let delta = clock.tick_at(t0 + Duration::from_millis(20));
        assert!((delta - 0.020).abs() < 1e-4);
        let delta = clock.tick_at(t0 + Duration::from_millis(50));
        assert!((delta - 0.030).abs() < 1e-4);
        assert_eq!(clock.frame_count, 2);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0 + Duration::from_millis(10));
        assert_eq!(clock.tick_at(t0), 0.0);
    }

    #[test]
    fn test_fps_updates_every_interval() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        for i in 1..=30 {
            clock.tick_at(t0 + Duration::from_millis(i * 10));
        }
        assert_eq!(clock.fps(), 0.0);
        for i in 31..=60 {
            clock.tick_at(t0 + Duration::from_millis(i * 10));
        }
        // 50 frames over the first 500 ms
        assert!((clock.fps() - 100.0).abs() < 0.5);
    }
}
