//! User interface subsystem - round touch display with two screens.
//!
//! The engine keeps a small retained scene per screen, hit-tests touch
//! input and reports clicks; the controller reacts to those clicks and
//! restyles widgets.
//!
//! ## Components
//!
//! - **Engine**: widget tree, pointer tracking, slide transitions,
//!   dirty-region bookkeeping
//! - **Draw**: embedded-graphics rendering of arcs, buttons and icons

pub mod draw;
pub mod engine;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

/// Screens (views) the UI can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenId {
    /// Power ring + power toggle.
    Home,
    /// Seven color swatches + back button.
    Picker,
}

impl ScreenId {
    pub const fn index(self) -> usize {
        match self {
            ScreenId::Home => 0,
            ScreenId::Picker => 1,
        }
    }
}

/// Every interactive element, by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WidgetId {
    PowerArc,
    PowerButton,
    BackButton,
    /// Index into [`SWATCHES`].
    Swatch(u8),
}

/// Input-derived events, reported by the engine after hit testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiEvent {
    /// Press and release both landed on the widget.
    Clicked(WidgetId),
}

/// Animated screen load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenAnim {
    /// New screen slides in from the bottom edge.
    MoveBottom,
    /// New screen slides in from the top edge.
    MoveTop,
}

/// A fixed color choice on the Picker screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSwatch {
    /// Offset from the screen centre.
    pub offset: Point,
    pub color: Rgb888,
}

impl ColorSwatch {
    const fn new(x: i32, y: i32, r: u8, g: u8, b: u8) -> Self {
        Self {
            offset: Point::new(x, y),
            color: Rgb888::new(r, g, b),
        }
    }
}

/// Swatch ring, clockwise from bottom-left.
pub const SWATCHES: [ColorSwatch; 7] = [
    ColorSwatch::new(-57, 57, 255, 0, 0),     // red
    ColorSwatch::new(-80, 0, 255, 0, 255),    // pink
    ColorSwatch::new(-57, -57, 140, 0, 255),  // purple
    ColorSwatch::new(0, -80, 0, 255, 255),    // cyan
    ColorSwatch::new(57, -57, 0, 255, 0),     // green
    ColorSwatch::new(80, 0, 255, 255, 0),     // yellow
    ColorSwatch::new(57, 57, 255, 255, 255),  // white
];
