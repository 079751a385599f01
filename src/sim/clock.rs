//! Wall-clock to simulation time
//!
//! Turns raw frame timestamps (milliseconds, e.g. from
//! `requestAnimationFrame`) into a bounded, never-negative delta in seconds.

use crate::consts::MAX_FRAME_DT;

#[derive(Debug, Clone)]
pub struct Clock {
    last_ms: Option<f64>,
    max_dt: f32,
    /// Frames whose delta had to be capped
    pub clamped_frames: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl Clock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
            clamped_frames: 0,
        }
    }

    /// Seconds since the previous timestamp.
    ///
    /// The first call after construction or [`Clock::reset`] only records the
    /// baseline and returns 0. Deltas above the cap are clamped to the cap;
    /// zero, negative or non-finite deltas return 0 and keep the later baseline.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            log::warn!("Ignoring non-finite timestamp {now_ms}");
            return 0.0;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0.0;
        };

        let dt = ((now_ms - last) / 1000.0) as f32;
        if dt <= 0.0 {
            if dt < 0.0 {
                log::debug!("Clock went backwards by {:.1}ms", (last - now_ms));
                self.last_ms = Some(last);
            }
            return 0.0;
        }
        if dt > self.max_dt {
            self.clamped_frames += 1;
            log::debug!("Frame gap of {:.0}ms capped to {:.0}ms", dt * 1000.0, self.max_dt * 1000.0);
            return self.max_dt;
        }
        dt
    }

    /// Make `now_ms` the baseline without producing a delta
    pub fn resync(&mut self, now_ms: f64) {
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
    }

    /// Forget the baseline; the next `advance` starts fresh
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn is_synced(&self) -> bool {
        self.last_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_zero() {
        let mut clock = Clock::default();
        assert_eq!(clock.advance(12_345.0), 0.0);
        assert!((clock.advance(12_345.0 + 16.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_large_gap_capped() {
        let mut clock = Clock::default();
        clock.advance(0.0);
        assert_eq!(clock.advance(5_000.0), MAX_FRAME_DT);
        assert_eq!(clock.clamped_frames, 1);
        assert!((clock.advance(5_016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = Clock::default();
        clock.advance(1_000.0);
        assert_eq!(clock.advance(900.0), 0.0);
        // Baseline stays at the later timestamp
        assert!((clock.advance(1_010.0) - 0.010).abs() < 1e-6);
        assert_eq!(clock.advance(f64::NAN), 0.0);
    }

    #[test]
    fn test_resync_skips_paused_interval() {
        let mut clock = Clock::default();
        clock.advance(0.0);
        clock.advance(16.0);
        // Shop open for a minute
        clock.resync(60_016.0);
        assert!((clock.advance(60_032.0) - 0.016).abs() < 1e-6);

        clock.reset();
        assert!(!clock.is_synced());
        assert_eq!(clock.advance(90_000.0), 0.0);
    }
}
