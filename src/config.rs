//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, geometry and
//! palette constants live here so they can be tuned in one place.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

// Panel

/// GC9A01 round panel resolution (pixels).
pub const SCREEN_WIDTH: u32 = 240;
pub const SCREEN_HEIGHT: u32 = 240;

/// Panel memory offset (the GC9A01 maps 1:1).
pub const SCREEN_OFFSET_X: u16 = 0;
pub const SCREEN_OFFSET_Y: u16 = 0;

/// SPI clock for the panel (Hz). The nRF52840 SPIM3 tops out at 32 MHz.
pub const PANEL_SPI_FREQ_HZ: u32 = 32_000_000;

// GPIO pin assignments (nRF52840 + GC9A01 round module)
//
// Logical names only; the concrete `embassy_nrf::peripherals::*` are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Panel SCLK     → P0.19
//   Panel MOSI     → P0.20
//   Panel DC       → P0.21
//   Panel CS       → P0.22
//   Panel RST      → P0.23
//   Backlight PWM  → P0.24
//   Touch SDA      → P0.26
//   Touch SCL      → P0.27
//   Touch INT      → P0.25
//   Touch RST      → P0.28

// Timing

/// Main loop yield between iterations (ms).
pub const LOOP_YIELD_MS: u64 = 5;

/// Inactivity before the backlight is dimmed (ms).
pub const SCREEN_DIM_TIMEOUT_MS: u64 = 10_000;

/// Backlight level while dimmed (absolute, 0..=100).
pub const DIM_BRIGHTNESS: u8 = 10;

/// Backlight level when no brightness setting is stored (0..=100).
pub const DEFAULT_BRIGHTNESS: u8 = 100;

/// Duration of the slide between Home and Picker (ms).
pub const SCREEN_ANIM_MS: u32 = 400;

/// Backlight PWM top value; duty is scaled from 0..=100 onto this.
pub const BACKLIGHT_PWM_TOP: u16 = 1000;

// Palette

/// Default glow color on a fresh device (purple).
pub const DEFAULT_GLOW: Rgb888 = Rgb888::new(140, 0, 255);

/// Arc and icon color while power is off.
pub const POWER_OFF_GRAY: Rgb888 = Rgb888::new(40, 40, 40);

/// Screen and button background.
pub const BACKGROUND: Rgb888 = Rgb888::BLACK;

/// Power icon color while checked.
pub const POWER_ON_ICON: Rgb888 = Rgb888::WHITE;

// Home screen geometry

/// Outer diameter of the power ring.
pub const ARC_DIAMETER: u32 = 200;

/// Stroke width of the power ring.
pub const ARC_WIDTH: u32 = 20;

/// Ring start/end angles in degrees, clockwise from 3 o'clock.
/// 120 → 60 leaves the gap at the bottom.
pub const ARC_START_DEG: u16 = 120;
pub const ARC_END_DEG: u16 = 60;

/// Ring range; the value is pinned to the top of it.
pub const ARC_RANGE_MIN: i16 = 0;
pub const ARC_RANGE_MAX: i16 = 100;

/// Diameter of the power toggle in the middle of the ring.
pub const POWER_BTN_DIAMETER: u32 = 120;

// Picker screen geometry

/// Diameter of the swatch and back buttons.
pub const PICKER_BTN_DIAMETER: u32 = 50;

/// Back button offset from the screen centre.
pub const BACK_BTN_OFFSET: Point = Point::new(0, 80);

// Settings storage

/// Flash range reserved for the settings map (last 8 KB of the 1 MB part).
pub const SETTINGS_FLASH_START: u32 = 0x000F_E000;
pub const SETTINGS_FLASH_END: u32 = 0x0010_0000;
