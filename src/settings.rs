//! Persisted settings keys, defaults and the store abstraction.
//!
//! The store is a flat integer key/value map.  Missing keys are not an
//! error: every read names its default, so a fresh device boots with
//! the documented values.

use crate::config::{DEFAULT_BRIGHTNESS, DEFAULT_GLOW};
use crate::error::StorageError;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

/// Keys held by the settings store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingKey {
    GlowRed,
    GlowGreen,
    GlowBlue,
    PowerState,
    Rotate,
    Brightness,
}

impl SettingKey {
    pub const COUNT: usize = 6;

    pub const ALL: [SettingKey; Self::COUNT] = [
        SettingKey::GlowRed,
        SettingKey::GlowGreen,
        SettingKey::GlowBlue,
        SettingKey::PowerState,
        SettingKey::Rotate,
        SettingKey::Brightness,
    ];

    /// Stable key name, as shown in logs.
    pub const fn name(self) -> &'static str {
        match self {
            SettingKey::GlowRed => "glowRed",
            SettingKey::GlowGreen => "glowGreen",
            SettingKey::GlowBlue => "glowBlue",
            SettingKey::PowerState => "powerState",
            SettingKey::Rotate => "rotate",
            SettingKey::Brightness => "brightness",
        }
    }

    /// One-byte key used in the flash map. Never renumber.
    pub const fn id(self) -> u8 {
        match self {
            SettingKey::GlowRed => 0x01,
            SettingKey::GlowGreen => 0x02,
            SettingKey::GlowBlue => 0x03,
            SettingKey::PowerState => 0x04,
            SettingKey::Rotate => 0x05,
            SettingKey::Brightness => 0x06,
        }
    }

    pub const fn index(self) -> usize {
        self.id() as usize - 1
    }
}

/// Durable key/value store surviving power loss.
///
/// Writes are synchronous and durable on `Ok`.  The core never batches:
/// every settings change is one `put_int` per key.
pub trait SettingsStore {
    /// Read `key`, or `default` when it was never written.
    fn get_int(&mut self, key: SettingKey, default: i32) -> i32;

    /// Persist `value` under `key`.
    fn put_int(&mut self, key: SettingKey, value: i32) -> Result<(), StorageError>;
}

/// Snapshot of every persisted setting, resolved against defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub glow: Rgb888,
    pub power_on: bool,
    pub rotate: u8,
    pub brightness: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            glow: DEFAULT_GLOW,
            power_on: true,
            rotate: 0,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl Settings {
    /// Read all keys.  Out-of-range values are clamped rather than
    /// rejected so a corrupted entry can never brick the UI.
    pub fn load(store: &mut impl SettingsStore) -> Self {
        let defaults = Self::default();
        let r = store.get_int(SettingKey::GlowRed, defaults.glow.r() as i32);
        let g = store.get_int(SettingKey::GlowGreen, defaults.glow.g() as i32);
        let b = store.get_int(SettingKey::GlowBlue, defaults.glow.b() as i32);
        let power = store.get_int(SettingKey::PowerState, defaults.power_on as i32);
        let rotate = store.get_int(SettingKey::Rotate, defaults.rotate as i32);
        let brightness = store.get_int(SettingKey::Brightness, defaults.brightness as i32);

        Self {
            glow: Rgb888::new(channel(r), channel(g), channel(b)),
            power_on: power != 0,
            rotate: rotate.rem_euclid(4) as u8,
            brightness: brightness.clamp(0, 100) as u8,
        }
    }
}

/// Clamp a stored integer into a color channel.
pub fn channel(value: i32) -> u8 {
    value.clamp(0, u8::MAX as i32) as u8
}

/// RAM-backed store for host tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: [Option<i32>; SettingKey::COUNT],
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            values: [None; SettingKey::COUNT],
            writes: 0,
            fail_writes: false,
        }
    }

    /// Raw stored value, `None` if never written.
    pub fn get(&self, key: SettingKey) -> Option<i32> {
        self.values[key.index()]
    }

    /// Number of successful `put_int` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Make every subsequent write fail with `StorageError::Unavailable`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl SettingsStore for MemoryStore {
    fn get_int(&mut self, key: SettingKey, default: i32) -> i32 {
        self.values[key.index()].unwrap_or(default)
    }

    fn put_int(&mut self, key: SettingKey, value: i32) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable);
        }
        self.values[key.index()] = Some(value);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_resolves_defaults() {
        let mut store = MemoryStore::new();
        let settings = Settings::load(&mut store);
        assert_eq!(settings.glow, Rgb888::new(140, 0, 255));
        assert!(settings.power_on);
        assert_eq!(settings.rotate, 0);
        assert_eq!(settings.brightness, 100);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn stored_values_win_over_defaults() {
        let mut store = MemoryStore::new();
        store.put_int(SettingKey::GlowRed, 0).unwrap();
        store.put_int(SettingKey::GlowGreen, 255).unwrap();
        store.put_int(SettingKey::GlowBlue, 255).unwrap();
        store.put_int(SettingKey::PowerState, 0).unwrap();
        store.put_int(SettingKey::Rotate, 2).unwrap();
        store.put_int(SettingKey::Brightness, 60).unwrap();

        let settings = Settings::load(&mut store);
        assert_eq!(settings.glow, Rgb888::new(0, 255, 255));
        assert!(!settings.power_on);
        assert_eq!(settings.rotate, 2);
        assert_eq!(settings.brightness, 60);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut store = MemoryStore::new();
        store.put_int(SettingKey::GlowRed, 300).unwrap();
        store.put_int(SettingKey::GlowGreen, -5).unwrap();
        store.put_int(SettingKey::PowerState, 7).unwrap();
        store.put_int(SettingKey::Rotate, 5).unwrap();
        store.put_int(SettingKey::Brightness, 250).unwrap();

        let settings = Settings::load(&mut store);
        assert_eq!(settings.glow.r(), 255);
        assert_eq!(settings.glow.g(), 0);
        assert!(settings.power_on);
        assert_eq!(settings.rotate, 1);
        assert_eq!(settings.brightness, 100);
    }

    #[test]
    fn key_ids_are_stable_and_unique() {
        let mut ids = [0u8; SettingKey::COUNT];
        for (i, key) in SettingKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
            ids[i] = key.id();
        }
        assert_eq!(ids, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(SettingKey::PowerState.name(), "powerState");
    }

    #[test]
    fn failing_store_keeps_previous_value() {
        let mut store = MemoryStore::new();
        store.put_int(SettingKey::Brightness, 40).unwrap();
        store.set_fail_writes(true);
        assert_eq!(
            store.put_int(SettingKey::Brightness, 80),
            Err(StorageError::Unavailable)
        );
        assert_eq!(store.get(SettingKey::Brightness), Some(40));
        assert_eq!(store.writes(), 1);
    }
}
