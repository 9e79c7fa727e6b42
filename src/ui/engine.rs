//! Retained scene for the two screens.
//!
//! Holds the widget list of each screen, turns raw touch samples into
//! clicks, runs the slide between screens and remembers which part of
//! the panel needs repainting.  Everything here runs inside the main
//! loop; nothing blocks.

use super::draw;
use super::{ScreenAnim, ScreenId, UiEvent, WidgetId};
use crate::error::Error;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::{Deque, Vec};

/// Widgets per screen (Picker: 7 swatches + back).
pub const MAX_WIDGETS: usize = 8;

/// Clicks buffered between two `process_step` calls.
pub const MAX_EVENTS: usize = 4;

/// Extra touch slack around the arc band (pixels).
const ARC_HIT_TOLERANCE: i32 = 10;

pub type Events = Vec<UiEvent, MAX_EVENTS>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Icon {
    None,
    Power,
    ChevronDown,
}

/// Ring control: background track plus an indicator proportional to
/// `value` within `range`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArcStyle {
    pub width: u32,
    /// Degrees clockwise from 3 o'clock.
    pub start_deg: u16,
    pub end_deg: u16,
    pub range: (i16, i16),
    pub value: i16,
    pub track_color: Rgb888,
    pub indicator_color: Rgb888,
}

impl ArcStyle {
    /// Clockwise span from start to end; equal angles mean a full ring.
    pub fn sweep_deg(&self) -> u16 {
        match (self.end_deg as i32 - self.start_deg as i32).rem_euclid(360) {
            0 => 360,
            sweep => sweep as u16,
        }
    }

    pub fn indicator_sweep_deg(&self) -> u16 {
        let (min, max) = self.range;
        let span = (max as i32 - min as i32).max(1);
        let value = self.value.max(min).min(max) as i32 - min as i32;
        (self.sweep_deg() as i32 * value / span) as u16
    }

    fn contains_angle(&self, deg: u16) -> bool {
        let rel = (deg as i32 - self.start_deg as i32).rem_euclid(360);
        rel <= self.sweep_deg() as i32
    }
}

/// Round push button with an optional icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonStyle {
    pub bg_color: Rgb888,
    pub icon: Icon,
    pub icon_color: Rgb888,
    /// Icon color while checked; falls back to `icon_color`.
    pub checked_icon_color: Option<Rgb888>,
    pub checkable: bool,
    pub checked: bool,
}

impl ButtonStyle {
    pub fn current_icon_color(&self) -> Rgb888 {
        match (self.checked, self.checked_icon_color) {
            (true, Some(color)) => color,
            _ => self.icon_color,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Arc(ArcStyle),
    Button(ButtonStyle),
}

/// A positioned element.  `offset` is relative to the screen centre;
/// every widget occupies a `diameter` square around its centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Widget {
    pub id: WidgetId,
    pub offset: Point,
    pub diameter: u32,
    pub shape: Shape,
}

impl Widget {
    pub fn arc(id: WidgetId, diameter: u32, width: u32) -> Self {
        Self {
            id,
            offset: Point::zero(),
            diameter,
            shape: Shape::Arc(ArcStyle {
                width,
                start_deg: 0,
                end_deg: 0,
                range: (0, 100),
                value: 0,
                track_color: Rgb888::BLACK,
                indicator_color: Rgb888::BLACK,
            }),
        }
    }

    pub fn button(id: WidgetId, diameter: u32) -> Self {
        Self {
            id,
            offset: Point::zero(),
            diameter,
            shape: Shape::Button(ButtonStyle {
                bg_color: Rgb888::BLACK,
                icon: Icon::None,
                icon_color: Rgb888::WHITE,
                checked_icon_color: None,
                checkable: false,
                checked: false,
            }),
        }
    }

    pub fn at(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_angles(mut self, start_deg: u16, end_deg: u16) -> Self {
        if let Shape::Arc(arc) = &mut self.shape {
            arc.start_deg = start_deg % 360;
            arc.end_deg = end_deg % 360;
        }
        self
    }

    pub fn with_range(mut self, min: i16, max: i16) -> Self {
        if let Shape::Arc(arc) = &mut self.shape {
            arc.range = (min.min(max), min.max(max));
        }
        self
    }

    pub fn with_value(mut self, value: i16) -> Self {
        if let Shape::Arc(arc) = &mut self.shape {
            arc.value = value;
        }
        self
    }

    /// Sets both track and indicator.
    pub fn with_arc_color(mut self, color: Rgb888) -> Self {
        if let Shape::Arc(arc) = &mut self.shape {
            arc.track_color = color;
            arc.indicator_color = color;
        }
        self
    }

    pub fn with_bg(mut self, color: Rgb888) -> Self {
        if let Shape::Button(btn) = &mut self.shape {
            btn.bg_color = color;
        }
        self
    }

    pub fn with_icon(mut self, icon: Icon, color: Rgb888) -> Self {
        if let Shape::Button(btn) = &mut self.shape {
            btn.icon = icon;
            btn.icon_color = color;
        }
        self
    }

    pub fn with_checked_icon_color(mut self, color: Rgb888) -> Self {
        if let Shape::Button(btn) = &mut self.shape {
            btn.checked_icon_color = Some(color);
        }
        self
    }

    pub fn checkable(mut self, checked: bool) -> Self {
        if let Shape::Button(btn) = &mut self.shape {
            btn.checkable = true;
            btn.checked = checked;
        }
        self
    }

    pub fn center(&self, screen_center: Point) -> Point {
        screen_center + self.offset
    }

    pub fn bounds(&self, screen_center: Point) -> Rectangle {
        Rectangle::with_center(
            self.center(screen_center),
            Size::new(self.diameter, self.diameter),
        )
    }

    /// Whether `point` lands on the widget's touch area.
    pub fn hit(&self, screen_center: Point, point: Point) -> bool {
        let d = point - self.center(screen_center);
        let dist2 = d.x * d.x + d.y * d.y;
        let outer = self.diameter as i32 / 2;

        match &self.shape {
            Shape::Button(_) => dist2 <= outer * outer,
            Shape::Arc(arc) => {
                let band_outer = outer + ARC_HIT_TOLERANCE;
                let band_inner = (outer - arc.width as i32 - ARC_HIT_TOLERANCE).max(0);
                if dist2 > band_outer * band_outer || dist2 < band_inner * band_inner {
                    return false;
                }
                arc.contains_angle(angle_deg(d))
            }
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self.shape, Shape::Button(ButtonStyle { checked: true, .. }))
    }
}

/// Clockwise angle of `d` from the positive x axis, 0..360.
fn angle_deg(d: Point) -> u16 {
    let rad = libm::atan2f(d.y as f32, d.x as f32);
    let deg = libm::roundf(rad * (180.0 / core::f32::consts::PI)) as i32;
    deg.rem_euclid(360) as u16
}

/// Widget list and background of one screen.
#[derive(Clone, Debug)]
pub struct ScreenNode {
    pub background: Rgb888,
    widgets: Vec<Widget, MAX_WIDGETS>,
}

impl ScreenNode {
    const fn new() -> Self {
        Self {
            background: Rgb888::BLACK,
            widgets: Vec::new(),
        }
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Later widgets sit on top of earlier ones.
    fn topmost_at(&self, screen_center: Point, point: Point) -> Option<WidgetId> {
        self.widgets
            .iter()
            .rev()
            .find(|w| w.hit(screen_center, point))
            .map(|w| w.id)
    }
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    from: ScreenId,
    anim: ScreenAnim,
    elapsed_ms: u32,
    duration_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pointer {
    Released,
    /// `target` is dropped when the finger slides off it or the press
    /// began during a transition.
    Pressed { target: Option<WidgetId> },
}

pub struct Engine {
    size: Size,
    screens: [ScreenNode; 2],
    active: ScreenId,
    transition: Option<Transition>,
    clock_ms: u64,
    pointer: Pointer,
    events: Deque<UiEvent, MAX_EVENTS>,
    dirty: Option<Rectangle>,
}

impl Engine {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            screens: [ScreenNode::new(), ScreenNode::new()],
            active: ScreenId::Home,
            transition: None,
            clock_ms: 0,
            pointer: Pointer::Released,
            events: Deque::new(),
            dirty: Some(Rectangle::new(Point::zero(), size)),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn center(&self) -> Point {
        Point::new(self.size.width as i32 / 2, self.size.height as i32 / 2)
    }

    fn full_area(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size)
    }

    pub fn screen(&self, id: ScreenId) -> &ScreenNode {
        &self.screens[id.index()]
    }

    pub fn active_screen(&self) -> ScreenId {
        self.active
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Region still waiting for `render`.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty
    }

    pub fn set_background(&mut self, screen: ScreenId, color: Rgb888) {
        self.screens[screen.index()].background = color;
        if screen == self.active {
            self.invalidate_all();
        }
    }

    pub fn add_widget(&mut self, screen: ScreenId, widget: Widget) -> Result<(), Error> {
        let bounds = widget.bounds(self.center());
        self.screens[screen.index()]
            .widgets
            .push(widget)
            .map_err(|_| Error::SceneFull)?;
        if screen == self.active {
            self.invalidate(bounds);
        }
        Ok(())
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.screens
            .iter()
            .flat_map(|s| s.widgets.iter())
            .find(|w| w.id == id)
    }

    pub fn is_checked(&self, id: WidgetId) -> bool {
        self.widget(id).is_some_and(Widget::is_checked)
    }

    pub fn set_arc_color(&mut self, id: WidgetId, color: Rgb888) -> Result<(), Error> {
        self.restyle(id, |shape| match shape {
            Shape::Arc(arc) => {
                arc.track_color = color;
                arc.indicator_color = color;
                true
            }
            Shape::Button(_) => false,
        })
    }

    pub fn set_icon_color(&mut self, id: WidgetId, color: Rgb888) -> Result<(), Error> {
        self.restyle(id, |shape| match shape {
            Shape::Button(btn) => {
                btn.icon_color = color;
                true
            }
            Shape::Arc(_) => false,
        })
    }

    pub fn set_checked(&mut self, id: WidgetId, checked: bool) -> Result<(), Error> {
        self.restyle(id, |shape| match shape {
            Shape::Button(btn) if btn.checkable => {
                btn.checked = checked;
                true
            }
            _ => false,
        })
    }

    fn restyle(
        &mut self,
        id: WidgetId,
        apply: impl FnOnce(&mut Shape) -> bool,
    ) -> Result<(), Error> {
        let center = self.center();
        let (screen, bounds) = self
            .screens
            .iter_mut()
            .enumerate()
            .find_map(|(i, s)| {
                s.widgets
                    .iter_mut()
                    .find(|w| w.id == id)
                    .map(|w| (i, w))
            })
            .and_then(|(i, w)| apply(&mut w.shape).then(|| (i, w.bounds(center))))
            .ok_or(Error::UnknownWidget)?;

        if screen == self.active.index() {
            self.invalidate(bounds);
        }
        Ok(())
    }

    /// Switch screens without animation.
    pub fn load_screen(&mut self, screen: ScreenId) {
        self.transition = None;
        self.active = screen;
        self.pointer = Pointer::Released;
        self.invalidate_all();
    }

    /// Slide to `screen`.  Touch input is ignored until the slide ends.
    pub fn load_screen_anim(&mut self, screen: ScreenId, anim: ScreenAnim, duration_ms: u32) {
        if screen == self.active {
            return;
        }
        if duration_ms == 0 {
            self.load_screen(screen);
            return;
        }
        self.transition = Some(Transition {
            from: self.active,
            anim,
            elapsed_ms: 0,
            duration_ms,
        });
        self.active = screen;
        self.invalidate_all();
    }

    pub fn advance_clock(&mut self, delta_ms: u32) {
        self.clock_ms = self.clock_ms.saturating_add(delta_ms as u64);
        if let Some(t) = &mut self.transition {
            t.elapsed_ms = t.elapsed_ms.saturating_add(delta_ms).min(t.duration_ms);
            self.invalidate_all();
        }
    }

    /// Feed the latest touch sample (`None` = no contact).
    pub fn inject_pointer(&mut self, touch: Option<Point>) {
        let center = self.center();
        let transitioning = self.transition.is_some();

        match (self.pointer, touch) {
            (Pointer::Released, Some(point)) => {
                let target = if transitioning {
                    None
                } else {
                    self.screens[self.active.index()].topmost_at(center, point)
                };
                self.pointer = Pointer::Pressed { target };
            }
            (Pointer::Pressed { target: Some(id) }, Some(point)) => {
                let still_on = !transitioning
                    && self
                        .widget(id)
                        .is_some_and(|w| w.hit(center, point));
                if !still_on {
                    self.pointer = Pointer::Pressed { target: None };
                }
            }
            (Pointer::Pressed { target }, None) => {
                self.pointer = Pointer::Released;
                if let Some(id) = target {
                    if !transitioning {
                        self.click(id);
                    }
                }
            }
            (Pointer::Pressed { target: None }, Some(_)) | (Pointer::Released, None) => {}
        }
    }

    fn click(&mut self, id: WidgetId) {
        let toggles = matches!(
            self.widget(id),
            Some(Widget {
                shape: Shape::Button(ButtonStyle {
                    checkable: true,
                    ..
                }),
                ..
            })
        );
        if toggles {
            let checked = !self.is_checked(id);
            let _ = self.set_checked(id, checked);
        }

        if self.events.is_full() {
            self.events.pop_front();
        }
        let _ = self.events.push_back(UiEvent::Clicked(id));
    }

    /// Step animations and hand out the clicks gathered since the last
    /// call.
    pub fn process_step(&mut self) -> Events {
        if let Some(t) = self.transition {
            if t.elapsed_ms >= t.duration_ms {
                self.transition = None;
                self.invalidate_all();
            }
        }

        let mut events = Events::new();
        while let Some(event) = self.events.pop_front() {
            let _ = events.push(event);
        }
        events
    }

    /// Repaint whatever is dirty.  No-op when nothing changed.
    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(area) = self.dirty else {
            return Ok(());
        };
        let center = self.center();

        match self.transition {
            Some(t) => {
                let (from_offset, to_offset) = self.slide_offsets(&t);
                let full = self.full_area();
                draw::draw_screen(
                    target,
                    self.screen(t.from),
                    center + from_offset,
                    self.size,
                    full,
                )?;
                draw::draw_screen(
                    target,
                    self.screen(self.active),
                    center + to_offset,
                    self.size,
                    full,
                )?;
            }
            None => {
                draw::draw_screen(target, self.screen(self.active), center, self.size, area)?;
            }
        }

        self.dirty = None;
        Ok(())
    }

    /// (outgoing, incoming) screen offsets for the current frame.
    fn slide_offsets(&self, t: &Transition) -> (Point, Point) {
        let h = self.size.height as i64;
        let travelled = (h * t.elapsed_ms as i64 / t.duration_ms.max(1) as i64) as i32;
        let h = h as i32;
        match t.anim {
            ScreenAnim::MoveBottom => (Point::new(0, -travelled), Point::new(0, h - travelled)),
            ScreenAnim::MoveTop => (Point::new(0, travelled), Point::new(0, travelled - h)),
        }
    }

    fn invalidate_all(&mut self) {
        self.dirty = Some(self.full_area());
    }

    fn invalidate(&mut self, area: Rectangle) {
        let area = area.intersection(&self.full_area());
        if area.is_zero_sized() {
            return;
        }
        self.dirty = Some(match self.dirty {
            Some(current) => envelope(current, area),
            None => area,
        });
    }
}

/// Smallest rectangle covering both.
fn envelope(a: Rectangle, b: Rectangle) -> Rectangle {
    let x0 = a.top_left.x.min(b.top_left.x);
    let y0 = a.top_left.y.min(b.top_left.y);
    let x1 = (a.top_left.x + a.size.width as i32).max(b.top_left.x + b.size.width as i32);
    let y1 = (a.top_left.y + a.size.height as i32).max(b.top_left.y + b.size.height as i32);
    Rectangle::new(
        Point::new(x0, y0),
        Size::new((x1 - x0) as u32, (y1 - y0) as u32),
    )
}
