//! Panel backlight on a PWM channel.

use defmt::debug;
use embassy_nrf::pwm::{Instance, Prescaler, SimplePwm};
use glowring::config::BACKLIGHT_PWM_TOP;
use glowring::Backlight;

pub struct PwmBacklight<'d, T: Instance> {
    pwm: SimplePwm<'d, T>,
    level: u8,
}

impl<'d, T: Instance> PwmBacklight<'d, T> {
    /// Takes a single-channel PWM and starts at `level` (0..=100).
    pub fn new(mut pwm: SimplePwm<'d, T>, level: u8) -> Self {
        pwm.set_prescaler(Prescaler::Div1);
        pwm.set_max_duty(BACKLIGHT_PWM_TOP);
        let mut backlight = Self { pwm, level };
        backlight.apply(level);
        backlight
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    fn apply(&mut self, level: u8) {
        let on = (level.min(100) as u32 * BACKLIGHT_PWM_TOP as u32 / 100) as u16;
        // The compare value sets the low time of the output.
        self.pwm.set_duty(0, BACKLIGHT_PWM_TOP - on);
    }
}

impl<T: Instance> Backlight for PwmBacklight<'_, T> {
    fn set_brightness(&mut self, level: u8) {
        debug!("Backlight: {} -> {}", self.level, level);
        self.level = level;
        self.apply(level);
    }
}
