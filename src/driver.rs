//! Main loop driver - one cooperative iteration per call.
//!
//! The firmware calls [`MainLoop::step`] forever with a short yield in
//! between.  Each step:
//!
//! 1. samples the touch controller (contact wakes the backlight),
//! 2. feeds the sample to the engine,
//! 3. advances the engine clock by the time since the previous step,
//! 4. runs the engine step and dispatches its clicks synchronously,
//! 5. pushes dirty pixels to the panel,
//! 6. runs the dimming check.
//!
//! Everything happens on this one thread, so handlers never race.

use crate::controller::ScreenController;
use crate::dimming::{ActivityMonitor, Backlight};
use crate::error::Error;
use crate::settings::SettingsStore;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// Touch controller sample source.
pub trait TouchInput {
    /// Current contact point, `None` when nothing touches the panel.
    fn read_touch(&mut self) -> Option<Point>;
}

/// Map a raw touch sample from the panel's native frame into the frame
/// of a panel rotated clockwise by `quarter_turns` × 90°.
pub fn rotate_touch(raw: Point, quarter_turns: u8, size: Size) -> Point {
    let (w, h) = (size.width as i32 - 1, size.height as i32 - 1);
    match quarter_turns % 4 {
        0 => raw,
        1 => Point::new(h - raw.y, raw.x),
        2 => Point::new(w - raw.x, h - raw.y),
        _ => Point::new(raw.y, w - raw.x),
    }
}

pub struct MainLoop {
    last_tick_ms: u64,
    monitor: ActivityMonitor,
}

impl MainLoop {
    pub fn new(now_ms: u64, monitor: ActivityMonitor) -> Self {
        Self {
            last_tick_ms: now_ms,
            monitor,
        }
    }

    pub fn monitor(&self) -> &ActivityMonitor {
        &self.monitor
    }

    /// Run one iteration at `now_ms`.
    ///
    /// Handler and display errors are returned after the iteration has
    /// finished; the dimming check always runs.
    pub fn step<S, T, B, D>(
        &mut self,
        now_ms: u64,
        controller: &mut ScreenController<S>,
        touch: &mut T,
        backlight: &mut B,
        display: &mut D,
    ) -> Result<(), Error>
    where
        S: SettingsStore,
        T: TouchInput,
        B: Backlight,
        D: DrawTarget<Color = Rgb565>,
    {
        let sample = touch.read_touch();
        if sample.is_some() {
            self.monitor.on_activity(now_ms, backlight);
        }

        let elapsed = now_ms.saturating_sub(self.last_tick_ms);
        self.last_tick_ms = now_ms;

        let engine = controller.engine_mut();
        engine.inject_pointer(sample);
        engine.advance_clock(u32::try_from(elapsed).unwrap_or(u32::MAX));
        let events = engine.process_step();

        let mut result = Ok(());
        for event in events {
            if let Err(e) = controller.handle(event) {
                #[cfg(feature = "defmt")]
                defmt::warn!("Handler for {} failed: {}", event, e);
                result = result.and(Err(e));
            }
        }

        let drawn = controller
            .engine_mut()
            .render(display)
            .map_err(|_| Error::Display);

        self.monitor.tick(now_ms, backlight);

        result.and(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use crate::settings::{MemoryStore, SettingKey};
    use crate::state::AppState;
    use crate::ui::ScreenId;

    struct ScriptedTouch {
        samples: Vec<Option<Point>>,
    }

    impl ScriptedTouch {
        fn new(samples: &[Option<Point>]) -> Self {
            let mut samples = samples.to_vec();
            samples.reverse();
            Self { samples }
        }
    }

    impl TouchInput for ScriptedTouch {
        fn read_touch(&mut self) -> Option<Point> {
            self.samples.pop().flatten()
        }
    }

    #[derive(Default)]
    struct FakeBacklight {
        levels: Vec<u8>,
    }

    impl Backlight for FakeBacklight {
        fn set_brightness(&mut self, level: u8) {
            self.levels.push(level);
        }
    }

    struct FrameBuffer {
        pixels: Vec<Rgb565>,
        flushes: usize,
    }

    impl FrameBuffer {
        fn new() -> Self {
            Self {
                pixels: vec![Rgb565::BLACK; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
                flushes: 0,
            }
        }
    }

    impl OriginDimensions for FrameBuffer {
        fn size(&self) -> Size {
            Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
        }
    }

    impl DrawTarget for FrameBuffer {
        type Color = Rgb565;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Rgb565>>,
        {
            self.flushes += 1;
            for Pixel(p, color) in pixels {
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < SCREEN_WIDTH && (p.y as u32) < SCREEN_HEIGHT
                {
                    self.pixels[p.y as usize * SCREEN_WIDTH as usize + p.x as usize] = color;
                }
            }
            Ok(())
        }
    }

    struct BrokenPanel;

    impl OriginDimensions for BrokenPanel {
        fn size(&self) -> Size {
            Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
        }
    }

    impl DrawTarget for BrokenPanel {
        type Color = Rgb565;
        type Error = ();

        fn draw_iter<I>(&mut self, _pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Rgb565>>,
        {
            Err(())
        }
    }

    fn setup(store: MemoryStore) -> (MainLoop, ScreenController<MemoryStore>) {
        let state = AppState::load_initial(store);
        let controller =
            ScreenController::new(state, Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)).unwrap();
        (MainLoop::new(0, ActivityMonitor::new(0, 100)), controller)
    }

    /// Left side of the power ring.
    const ARC_POINT: Point = Point::new(30, 120);

    #[test]
    fn tap_on_ring_opens_picker_and_dims_later() {
        let (mut main_loop, mut controller) = setup(MemoryStore::new());
        let mut touch = ScriptedTouch::new(&[Some(ARC_POINT), None]);
        let mut backlight = FakeBacklight::default();
        let mut panel = FrameBuffer::new();

        main_loop
            .step(5, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        main_loop
            .step(10, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        assert_eq!(controller.active_screen(), ScreenId::Picker);
        assert_eq!(main_loop.monitor().last_activity_ms(), 5);

        main_loop
            .step(10_005, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        assert!(!main_loop.monitor().is_dimmed());
        main_loop
            .step(10_006, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        assert!(main_loop.monitor().is_dimmed());
        assert_eq!(backlight.levels, [10]);
    }

    #[test]
    fn touch_contact_wakes_dimmed_screen() {
        let (mut main_loop, mut controller) = setup(MemoryStore::new());
        let mut touch = ScriptedTouch::new(&[None, Some(Point::new(2, 2)), None]);
        let mut backlight = FakeBacklight::default();
        let mut panel = FrameBuffer::new();

        main_loop
            .step(20_000, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        assert!(main_loop.monitor().is_dimmed());

        main_loop
            .step(20_010, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        assert!(!main_loop.monitor().is_dimmed());
        assert_eq!(backlight.levels, [10, 100]);

        // Release does not count as activity.
        main_loop
            .step(20_020, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        assert_eq!(main_loop.monitor().last_activity_ms(), 20_010);
    }

    #[test]
    fn idle_steps_do_not_repaint() {
        let (mut main_loop, mut controller) = setup(MemoryStore::new());
        let mut touch = ScriptedTouch::new(&[]);
        let mut backlight = FakeBacklight::default();
        let mut panel = FrameBuffer::new();

        main_loop
            .step(5, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        let after_first = panel.flushes;
        assert!(after_first > 0);

        main_loop
            .step(10, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        assert_eq!(panel.flushes, after_first);
    }

    #[test]
    fn panel_failure_is_reported_but_dimming_still_runs() {
        let (mut main_loop, mut controller) = setup(MemoryStore::new());
        let mut touch = ScriptedTouch::new(&[]);
        let mut backlight = FakeBacklight::default();

        let result = main_loop.step(
            10_001,
            &mut controller,
            &mut touch,
            &mut backlight,
            &mut BrokenPanel,
        );
        assert_eq!(result, Err(Error::Display));
        assert!(main_loop.monitor().is_dimmed());
    }

    #[test]
    fn touch_rotation_round_trips_after_four_turns() {
        let size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let raw = Point::new(30, 200);
        assert_eq!(rotate_touch(raw, 0, size), raw);
        assert_eq!(rotate_touch(raw, 1, size), Point::new(39, 30));
        assert_eq!(rotate_touch(raw, 2, size), Point::new(209, 39));
        assert_eq!(rotate_touch(raw, 3, size), Point::new(200, 209));

        let mut p = raw;
        for _ in 0..4 {
            p = rotate_touch(p, 1, size);
        }
        assert_eq!(p, raw);
    }

    #[test]
    fn storage_failure_surfaces_from_step() {
        let mut store = MemoryStore::new();
        store.put_int(SettingKey::PowerState, 1).unwrap();
        store.set_fail_writes(true);
        let (mut main_loop, mut controller) = setup(store);
        let mut touch = ScriptedTouch::new(&[Some(Point::new(120, 120)), None]);
        let mut backlight = FakeBacklight::default();
        let mut panel = FrameBuffer::new();

        main_loop
            .step(5, &mut controller, &mut touch, &mut backlight, &mut panel)
            .unwrap();
        let result = main_loop.step(10, &mut controller, &mut touch, &mut backlight, &mut panel);
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(controller.state().power_on());
    }
}
