//! glowring - smart-light controller firmware.
//!
//! nRF52840 driving a 240×240 GC9A01 round panel with a CST816S touch
//! controller.  Shows a power ring and a color picker; the chosen color
//! and power state are kept in internal flash across restarts.
//!
//! Boot sequence:
//!   1. Open the settings region and load every key
//!   2. Bring up the panel (rotation from settings) and the touch controller
//!   3. Start the backlight at the stored brightness
//!   4. Build both screens and show Home
//!   5. Run the main loop forever: step, then yield 5 ms

#![no_std]
#![no_main]

mod backlight;
mod storage;
mod touch;

use cst816s::CST816S;
use defmt::{info, unwrap, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::{bind_interrupts, peripherals, spim, twim};
use embassy_time::{Delay, Instant, Timer};
use embedded_graphics::prelude::*;
use embedded_hal_bus::spi::ExclusiveDevice;
use mipidsi::interface::SpiInterface;
use mipidsi::models::GC9A01;
use mipidsi::options::{ColorInversion, Orientation, Rotation};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use glowring::config::{
    LOOP_YIELD_MS, SCREEN_HEIGHT, SCREEN_OFFSET_X, SCREEN_OFFSET_Y, SCREEN_WIDTH,
};
use glowring::{ActivityMonitor, AppState, MainLoop, ScreenController};

use crate::backlight::PwmBacklight;
use crate::storage::FlashStore;
use crate::touch::Cst816s;

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// mipidsi batches pixels through this buffer before each SPI write.
static PANEL_BUF: StaticCell<[u8; 512]> = StaticCell::new();

fn rotation(quarter_turns: u8) -> Rotation {
    match quarter_turns % 4 {
        0 => Rotation::Deg0,
        1 => Rotation::Deg90,
        2 => Rotation::Deg180,
        _ => Rotation::Deg270,
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("glowring starting...");
    let p = embassy_nrf::init(Default::default());

    // ── Settings ─────────────────────────────────────────────────────────
    let store = FlashStore::open(BlockingAsync::new(Nvmc::new(p.NVMC)));
    let state = AppState::load_initial(store);
    let boot = *state.boot_settings();
    info!(
        "Settings: power={} rotate={} brightness={}",
        boot.power_on, boot.rotate, boot.brightness
    );

    // ── Panel (SPIM3) ────────────────────────────────────────────────────
    let mut spi_config = spim::Config::default();
    spi_config.frequency = spim::Frequency::M32;
    let spi = spim::Spim::new_txonly(p.SPI3, Irqs, p.P0_19, p.P0_20, spi_config);
    let dc = Output::new(p.P0_21, Level::Low, OutputDrive::Standard);
    let cs = Output::new(p.P0_22, Level::High, OutputDrive::Standard);
    let rst = Output::new(p.P0_23, Level::High, OutputDrive::Standard);

    let spi_device = unwrap!(ExclusiveDevice::new(spi, cs, Delay));
    let di = SpiInterface::new(spi_device, dc, PANEL_BUF.init([0; 512]));
    let mut display = match mipidsi::Builder::new(GC9A01, di)
        .display_size(SCREEN_WIDTH as u16, SCREEN_HEIGHT as u16)
        .display_offset(SCREEN_OFFSET_X, SCREEN_OFFSET_Y)
        .orientation(Orientation::new().rotate(rotation(boot.rotate)))
        .invert_colors(ColorInversion::Inverted)
        .reset_pin(rst)
        .init(&mut Delay)
    {
        Ok(display) => display,
        Err(_) => defmt::panic!("Panel init failed"),
    };
    info!("Panel ready: {}x{} GC9A01", SCREEN_WIDTH, SCREEN_HEIGHT);

    // ── Touch (TWIM0) ────────────────────────────────────────────────────
    let mut twim_config = twim::Config::default();
    twim_config.frequency = twim::Frequency::K400;
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim_config);
    let touch_int = Input::new(p.P0_25, Pull::Up);
    let touch_rst = Output::new(p.P0_28, Level::High, OutputDrive::Standard);
    let mut touch = Cst816s::new(CST816S::new(i2c, touch_int, touch_rst), boot.rotate);

    // ── Backlight (PWM0) ─────────────────────────────────────────────────
    let pwm = SimplePwm::new_1ch(p.PWM0, p.P0_24);
    let mut backlight = PwmBacklight::new(pwm, boot.brightness);
    info!("Backlight at {}%", backlight.level());

    // ── UI ───────────────────────────────────────────────────────────────
    let size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut controller = unwrap!(ScreenController::new(state, size));

    let now = Instant::now().as_millis();
    let monitor = ActivityMonitor::new(now, boot.brightness);
    let mut main_loop = MainLoop::new(now, monitor);
    info!("Setup finished");

    loop {
        if let Err(e) = main_loop.step(
            Instant::now().as_millis(),
            &mut controller,
            &mut touch,
            &mut backlight,
            &mut display,
        ) {
            warn!("Main loop step failed: {}", e);
        }
        Timer::after_millis(LOOP_YIELD_MS).await;
    }
}
