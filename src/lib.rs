//! Library interface for glowring.
//!
//! Everything that does not touch hardware lives here so it can be
//! tested on the host: settings, app state, the retained UI scene, the
//! screen controller, dimming and the main loop step.
//!
//! Usage: `cargo test --lib` (host), `cargo test --test integration`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and supplies the panel, touch controller, backlight and flash store
//! through the traits defined here.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controller;
pub mod dimming;
pub mod driver;
pub mod error;
pub mod settings;
pub mod state;
pub mod ui;

pub use controller::ScreenController;
pub use dimming::{ActivityMonitor, Backlight};
pub use driver::{MainLoop, TouchInput};
pub use error::{Error, StorageError};
pub use settings::{MemoryStore, SettingKey, Settings, SettingsStore};
pub use state::AppState;
pub use ui::{ScreenId, UiEvent, WidgetId, SWATCHES};

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - cross-module wiring
// ═══════════════════════════════════════════════════════════════════════════
