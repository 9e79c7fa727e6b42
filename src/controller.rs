//! Screen controller - builds Home and Picker once and routes clicks to
//! state changes.
//!
//! Screen state machine:
//!
//! ```text
//!   Home ──arc tap──▶ Picker
//!   Home ◀─back tap── Picker
//! ```
//!
//! Initial screen is Home; there is no terminal state.  Arc navigation
//! does not depend on the power state, so a color can be chosen while
//! the light is off.

use crate::config::{
    ARC_DIAMETER, ARC_END_DEG, ARC_RANGE_MAX, ARC_RANGE_MIN, ARC_START_DEG, ARC_WIDTH, BACKGROUND,
    BACK_BTN_OFFSET, PICKER_BTN_DIAMETER, POWER_BTN_DIAMETER, POWER_OFF_GRAY, POWER_ON_ICON,
    SCREEN_ANIM_MS,
};
use crate::error::Error;
use crate::settings::SettingsStore;
use crate::state::AppState;
use crate::ui::engine::{Engine, Icon, Widget};
use crate::ui::{ScreenAnim, ScreenId, UiEvent, WidgetId, SWATCHES};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

pub struct ScreenController<S: SettingsStore> {
    state: AppState<S>,
    engine: Engine,
}

impl<S: SettingsStore> ScreenController<S> {
    /// Build both screens from the loaded state and show Home.
    pub fn new(state: AppState<S>, size: Size) -> Result<Self, Error> {
        let mut controller = Self {
            state,
            engine: Engine::new(size),
        };
        controller.build_home()?;
        controller.build_picker()?;
        controller.engine.load_screen(ScreenId::Home);
        Ok(controller)
    }

    pub fn state(&self) -> &AppState<S> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState<S> {
        &mut self.state
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn active_screen(&self) -> ScreenId {
        self.engine.active_screen()
    }

    pub fn into_state(self) -> AppState<S> {
        self.state
    }

    /// Ring color for the current power state.
    fn arc_color(&self) -> Rgb888 {
        if self.state.power_on() {
            self.state.color()
        } else {
            POWER_OFF_GRAY
        }
    }

    fn build_home(&mut self) -> Result<(), Error> {
        self.engine.set_background(ScreenId::Home, BACKGROUND);

        let arc = Widget::arc(WidgetId::PowerArc, ARC_DIAMETER, ARC_WIDTH)
            .with_angles(ARC_START_DEG, ARC_END_DEG)
            .with_range(ARC_RANGE_MIN, ARC_RANGE_MAX)
            .with_value(ARC_RANGE_MAX)
            .with_arc_color(self.arc_color());
        self.engine.add_widget(ScreenId::Home, arc)?;

        // Checked state comes from the store so a reboot shows the
        // persisted power state.
        let power = Widget::button(WidgetId::PowerButton, POWER_BTN_DIAMETER)
            .with_bg(BACKGROUND)
            .with_icon(Icon::Power, POWER_OFF_GRAY)
            .with_checked_icon_color(POWER_ON_ICON)
            .checkable(self.state.power_on());
        self.engine.add_widget(ScreenId::Home, power)
    }

    fn build_picker(&mut self) -> Result<(), Error> {
        self.engine.set_background(ScreenId::Picker, BACKGROUND);

        let back = Widget::button(WidgetId::BackButton, PICKER_BTN_DIAMETER)
            .at(BACK_BTN_OFFSET)
            .with_bg(BACKGROUND)
            .with_icon(Icon::ChevronDown, self.state.color());
        self.engine.add_widget(ScreenId::Picker, back)?;

        for (index, swatch) in SWATCHES.iter().enumerate() {
            let button = Widget::button(WidgetId::Swatch(index as u8), PICKER_BTN_DIAMETER)
                .at(swatch.offset)
                .with_bg(swatch.color);
            self.engine.add_widget(ScreenId::Picker, button)?;
        }
        Ok(())
    }

    /// Dispatch one engine event.
    pub fn handle(&mut self, event: UiEvent) -> Result<(), Error> {
        match event {
            UiEvent::Clicked(WidgetId::PowerArc) => {
                self.engine
                    .load_screen_anim(ScreenId::Picker, ScreenAnim::MoveBottom, SCREEN_ANIM_MS);
                Ok(())
            }
            UiEvent::Clicked(WidgetId::BackButton) => {
                self.engine
                    .load_screen_anim(ScreenId::Home, ScreenAnim::MoveTop, SCREEN_ANIM_MS);
                Ok(())
            }
            UiEvent::Clicked(WidgetId::PowerButton) => {
                // The engine already flipped the toggle.
                let on = self.engine.is_checked(WidgetId::PowerButton);
                self.set_power(on)
            }
            UiEvent::Clicked(WidgetId::Swatch(index)) => match SWATCHES.get(index as usize) {
                Some(swatch) => self.set_color(swatch.color),
                None => Err(Error::UnknownWidget),
            },
        }
    }

    /// Persist the power flag, then recolor the ring and sync the toggle.
    pub fn set_power(&mut self, on: bool) -> Result<(), Error> {
        let result = self.state.set_power(on);
        let synced = self.sync_power_visuals();
        #[cfg(feature = "defmt")]
        defmt::info!("Power: {}", if self.state.power_on() { "on" } else { "off" });
        result.and(synced)
    }

    /// Persist a new glow color, then recolor the ring (if on) and the
    /// back icon (always).
    pub fn set_color(&mut self, color: Rgb888) -> Result<(), Error> {
        let result = self.state.set_color(color);
        let stored = self.state.color();
        if self.state.power_on() {
            self.engine.set_arc_color(WidgetId::PowerArc, stored)?;
        }
        self.engine.set_icon_color(WidgetId::BackButton, stored)?;
        #[cfg(feature = "defmt")]
        defmt::info!("Color: ({}, {}, {})", stored.r(), stored.g(), stored.b());
        result
    }

    /// Visuals follow the mirror, so a failed write leaves the toggle and
    /// ring showing what is actually stored.
    fn sync_power_visuals(&mut self) -> Result<(), Error> {
        let on = self.state.power_on();
        self.engine.set_checked(WidgetId::PowerButton, on)?;
        self.engine.set_arc_color(WidgetId::PowerArc, self.arc_color())
    }
}
