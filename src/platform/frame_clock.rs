//! Animation-frame subscription
//!
//! Tracks the pending `requestAnimationFrame` handle and the timestamp of the
//! previous frame. At most one frame request is outstanding at a time.

use crate::consts::{MAX_FRAME_MS, NOMINAL_FRAME_MS};

#[derive(Debug, Default)]
pub struct FrameClock {
    handle: Option<i32>,
    last_time: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self) -> bool {
        self.handle.is_some()
    }

    /// Record a freshly requested frame
    pub fn subscribe(&mut self, handle: i32) {
        if let Some(old) = self.handle.replace(handle) {
            log::warn!("Frame {} replaced pending frame {}", handle, old);
        }
    }

    /// Forget the pending frame and the timing history.
    /// Returns the handle the caller must cancel, if any.
    pub fn unsubscribe(&mut self) -> Option<i32> {
        self.last_time = None;
        self.handle.take()
    }

    /// The pending frame fired at `now_ms`; returns the clamped delta since
    /// the previous frame (one nominal frame if there was none)
    pub fn fired(&mut self, now_ms: f64) -> f64 {
        self.handle = None;
        let dt = match self.last_time {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_MS),
            None => NOMINAL_FRAME_MS,
        };
        self.last_time = Some(now_ms);
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_cycle() {
        let mut clock = FrameClock::new();
        assert!(!clock.is_subscribed());
        clock.subscribe(1);
        assert!(clock.is_subscribed());

        clock.fired(1000.0);
        assert!(!clock.is_subscribed());

        clock.subscribe(2);
        assert_eq!(clock.unsubscribe(), Some(2));
        assert_eq!(clock.unsubscribe(), None);
    }

    #[test]
    fn test_deltas() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.fired(1000.0), NOMINAL_FRAME_MS);
        assert_eq!(clock.fired(1016.0), 16.0);
        // Backgrounded tab
        assert_eq!(clock.fired(6016.0), MAX_FRAME_MS);
        // Clock going backwards never yields a negative delta
        assert_eq!(clock.fired(6000.0), 0.0);
    }

    #[test]
    fn test_unsubscribe_resets_timing() {
        let mut clock = FrameClock::new();
        clock.fired(1000.0);
        clock.unsubscribe();
        assert_eq!(clock.fired(90_000.0), NOMINAL_FRAME_MS);
    }
}
