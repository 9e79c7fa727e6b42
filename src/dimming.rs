//! Backlight dimming after touch inactivity.
//!
//! The monitor only tracks timestamps; the caller supplies `now` in
//! milliseconds and the backlight to drive.  Brightness writes are
//! fire-and-forget PWM updates.

use crate::config::{DIM_BRIGHTNESS, SCREEN_DIM_TIMEOUT_MS};

/// Backlight brightness control (0..=100).
pub trait Backlight {
    fn set_brightness(&mut self, level: u8);
}

/// Decide whether an undimmed screen should dim now.
///
/// Strictly greater than the timeout: an idle time equal to the timeout
/// still counts as active.
pub fn should_dim(dimmed: bool, idle_ms: u64, timeout_ms: u64) -> bool {
    !dimmed && idle_ms > timeout_ms
}

/// Tracks the last touch contact and dims/restores the backlight.
#[derive(Clone, Debug)]
pub struct ActivityMonitor {
    last_activity_ms: u64,
    dimmed: bool,
    timeout_ms: u64,
    dim_level: u8,
    restore_level: u8,
}

impl ActivityMonitor {
    /// `restore_level` is applied when a touch wakes a dimmed screen.
    pub fn new(now_ms: u64, restore_level: u8) -> Self {
        Self {
            last_activity_ms: now_ms,
            dimmed: false,
            timeout_ms: SCREEN_DIM_TIMEOUT_MS,
            dim_level: DIM_BRIGHTNESS,
            restore_level: restore_level.min(100),
        }
    }

    pub fn is_dimmed(&self) -> bool {
        self.dimmed
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    /// Record a touch contact (press, not release).
    pub fn on_activity(&mut self, now_ms: u64, backlight: &mut impl Backlight) {
        if self.dimmed {
            backlight.set_brightness(self.restore_level);
            self.dimmed = false;
            #[cfg(feature = "defmt")]
            defmt::debug!("Backlight: restored to {}", self.restore_level);
        }
        self.last_activity_ms = now_ms;
    }

    /// Periodic check, once per main loop iteration.
    pub fn tick(&mut self, now_ms: u64, backlight: &mut impl Backlight) {
        let idle_ms = now_ms.saturating_sub(self.last_activity_ms);
        if should_dim(self.dimmed, idle_ms, self.timeout_ms) {
            backlight.set_brightness(self.dim_level);
            self.dimmed = true;
            #[cfg(feature = "defmt")]
            defmt::debug!("Backlight: dimmed after {} ms idle", idle_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingBacklight {
        level: Option<u8>,
        writes: usize,
    }

    impl Backlight for RecordingBacklight {
        fn set_brightness(&mut self, level: u8) {
            self.level = Some(level);
            self.writes += 1;
        }
    }

    #[test]
    fn dim_policy_boundary() {
        assert!(!should_dim(false, 9_999, 10_000));
        assert!(!should_dim(false, 10_000, 10_000));
        assert!(should_dim(false, 10_001, 10_000));
        assert!(!should_dim(true, 50_000, 10_000));
    }

    #[test]
    fn tick_before_timeout_leaves_brightness_alone() {
        let mut bl = RecordingBacklight::default();
        let mut monitor = ActivityMonitor::new(1_000, 100);
        monitor.tick(1_000 + 9_999, &mut bl);
        assert!(!monitor.is_dimmed());
        assert_eq!(bl.writes, 0);
    }

    #[test]
    fn tick_after_timeout_dims_to_ten() {
        let mut bl = RecordingBacklight::default();
        let mut monitor = ActivityMonitor::new(1_000, 100);
        monitor.tick(1_000 + 10_001, &mut bl);
        assert!(monitor.is_dimmed());
        assert_eq!(bl.level, Some(10));
    }

    #[test]
    fn repeated_ticks_while_dimmed_are_noops() {
        let mut bl = RecordingBacklight::default();
        let mut monitor = ActivityMonitor::new(0, 100);
        monitor.tick(20_000, &mut bl);
        monitor.tick(30_000, &mut bl);
        monitor.tick(u64::MAX, &mut bl);
        assert!(monitor.is_dimmed());
        assert_eq!(bl.writes, 1);
    }

    #[test]
    fn activity_restores_and_rearms() {
        let mut bl = RecordingBacklight::default();
        let mut monitor = ActivityMonitor::new(0, 100);
        monitor.tick(10_001, &mut bl);
        monitor.on_activity(12_000, &mut bl);

        assert!(!monitor.is_dimmed());
        assert_eq!(bl.level, Some(100));
        assert_eq!(monitor.last_activity_ms(), 12_000);

        monitor.tick(22_000, &mut bl);
        assert!(!monitor.is_dimmed());
        monitor.tick(22_001, &mut bl);
        assert!(monitor.is_dimmed());
    }

    #[test]
    fn activity_while_bright_only_resets_clock() {
        let mut bl = RecordingBacklight::default();
        let mut monitor = ActivityMonitor::new(0, 100);
        monitor.on_activity(5_000, &mut bl);
        assert_eq!(bl.writes, 0);
        monitor.tick(14_000, &mut bl);
        assert!(!monitor.is_dimmed());
    }

    #[test]
    fn restore_uses_configured_level() {
        let mut bl = RecordingBacklight::default();
        let mut monitor = ActivityMonitor::new(0, 60);
        monitor.tick(10_001, &mut bl);
        monitor.on_activity(10_002, &mut bl);
        assert_eq!(bl.level, Some(60));
    }

    #[test]
    fn clock_going_backwards_never_dims() {
        let mut bl = RecordingBacklight::default();
        let mut monitor = ActivityMonitor::new(50_000, 100);
        monitor.tick(10, &mut bl);
        assert!(!monitor.is_dimmed());
    }
}
