//! CST816S capacitive touch controller over I²C.
//!
//! The `cst816s` driver reports discrete events (down, contact, lift);
//! the main loop wants the current contact each iteration, so the last
//! point is held until a lift-up event arrives.  Coordinates come back
//! in the panel's native frame and are rotated to match the display.

use cst816s::CST816S;
use defmt::{info, warn};
use embassy_nrf::gpio::{Input, Output};
use embassy_nrf::twim::{Instance, Twim};
use embassy_time::Delay;
use embedded_graphics::prelude::*;
use glowring::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use glowring::driver::rotate_touch;
use glowring::TouchInput;

/// `TouchEvent::action` value for a finger leaving the panel.
const ACTION_LIFT_UP: u8 = 1;

pub struct Cst816s<'d, T: Instance> {
    dev: CST816S<Twim<'d, T>, Input<'d>, Output<'d>>,
    quarter_turns: u8,
    contact: Option<Point>,
}

impl<'d, T: Instance> Cst816s<'d, T> {
    /// Reset the controller and wrap it.  A failed setup is logged and
    /// the device keeps running without touch.
    pub fn new(mut dev: CST816S<Twim<'d, T>, Input<'d>, Output<'d>>, quarter_turns: u8) -> Self {
        match dev.setup(&mut Delay) {
            Ok(()) => info!("Touch controller ready"),
            Err(_) => warn!("Touch controller setup failed - touch disabled until reboot"),
        }
        Self {
            dev,
            quarter_turns,
            contact: None,
        }
    }
}

impl<T: Instance> TouchInput for Cst816s<'_, T> {
    fn read_touch(&mut self) -> Option<Point> {
        // Only reads when INT is asserted, so idle polls stay off the bus.
        if let Some(event) = self.dev.read_one_touch_event(true) {
            self.contact = if event.action == ACTION_LIFT_UP {
                None
            } else {
                let size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
                let raw = Point::new(event.x as i32, event.y as i32);
                Some(rotate_touch(raw, self.quarter_turns, size))
            };
        }
        self.contact
    }
}
