//! Application state - in-memory mirror of the persisted glow color and
//! power flag.
//!
//! `AppState` owns the settings store so the mirror and the store can
//! only change together.  Every setter writes through before returning.

use crate::error::Error;
use crate::settings::{SettingKey, Settings, SettingsStore};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

pub struct AppState<S: SettingsStore> {
    store: S,
    color: Rgb888,
    power_on: bool,
    settings: Settings,
}

impl<S: SettingsStore> AppState<S> {
    /// Read every key (missing ones resolve to defaults).
    ///
    /// Must run once, before any screen is built.
    pub fn load_initial(mut store: S) -> Self {
        let settings = Settings::load(&mut store);
        Self {
            store,
            color: settings.glow,
            power_on: settings.power_on,
            settings,
        }
    }

    pub fn color(&self) -> Rgb888 {
        self.color
    }

    pub fn power_on(&self) -> bool {
        self.power_on
    }

    /// Settings as they were at boot (rotation and brightness are only
    /// read once).
    pub fn boot_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give the store back, e.g. to simulate a reboot.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Persist the power flag.
    pub fn set_power(&mut self, on: bool) -> Result<(), Error> {
        self.store.put_int(SettingKey::PowerState, on as i32)?;
        self.power_on = on;
        Ok(())
    }

    /// Persist all three channels.
    ///
    /// Three sequential single-key writes; the loop is single-threaded so
    /// nobody can observe a half-written color.  If a write fails, the
    /// mirror keeps the channels that did reach the store.
    pub fn set_color(&mut self, color: Rgb888) -> Result<(), Error> {
        self.store.put_int(SettingKey::GlowRed, color.r() as i32)?;
        self.color = Rgb888::new(color.r(), self.color.g(), self.color.b());

        self.store.put_int(SettingKey::GlowGreen, color.g() as i32)?;
        self.color = Rgb888::new(color.r(), color.g(), self.color.b());

        self.store.put_int(SettingKey::GlowBlue, color.b() as i32)?;
        self.color = color;
        Ok(())
    }
}
