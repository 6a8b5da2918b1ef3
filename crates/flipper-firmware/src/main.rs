mod joystick;
mod panels;
mod runtime_diagnostics;
mod status_led;
mod storage;

use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use esp_idf_svc::hal::{
    delay::FreeRtos,
    gpio::{AnyIOPin, Gpio16, Gpio17, Gpio18, Gpio23, Gpio4, Gpio5, PinDriver},
    i2c::{I2cConfig, I2cDriver},
    peripherals::Peripherals,
    spi::{config::Config, SpiDeviceDriver, SpiDriver, SpiDriverConfig, SPI2},
    units::Hertz,
};

use flipper_ui::filesystem::shared;
use flipper_ui::mock_filesystem::MockFileSystem;
use flipper_ui::{
    ColorMode, Controls, DisplayMode, JoystickConfig, JoystickSource, Panel, RenderConfig,
    RenderQueue, SharedFileSystem, Shell, StatusIndicator,
};

use joystick::AdcJoystick;
use panels::{EpaperInterface, EpaperPanel, OledPanel};
use status_led::StatusLed;
use storage::FlashStorage;

const EPAPER_COLOR: ColorMode = ColorMode::BlackWhite;
/// Full waveform on every e-paper flush instead of partial refreshes.
const EPAPER_FULL_UPDATE: bool = false;
const EPAPER_SPI_HZ: u32 = 4_000_000;
const OLED_I2C_HZ: u32 = 400_000;
const LOOP_DELAY_MS: u32 = 10;

#[cfg(feature = "dual")]
const DISPLAY_MODE: DisplayMode = DisplayMode::Dual {
    color: EPAPER_COLOR,
    full_update: EPAPER_FULL_UPDATE,
};
#[cfg(all(feature = "oled", not(feature = "dual")))]
const DISPLAY_MODE: DisplayMode = DisplayMode::Oled;
#[cfg(not(any(feature = "oled", feature = "dual")))]
const DISPLAY_MODE: DisplayMode = DisplayMode::EPaper {
    color: EPAPER_COLOR,
    full_update: EPAPER_FULL_UPDATE,
};

/// Pins wired to the e-paper module.
struct EpaperPins {
    spi: SPI2,
    sck: Gpio18,
    mosi: Gpio23,
    cs: Gpio5,
    dc: Gpio17,
    rst: Gpio16,
    busy: Gpio4,
}

fn epaper_panel(pins: EpaperPins) -> Result<EpaperPanel, Box<dyn Error>> {
    let spi = SpiDriver::new(
        pins.spi,
        pins.sck,
        pins.mosi,
        Option::<AnyIOPin>::None,
        &SpiDriverConfig::default(),
    )?;
    let spi_config = Config::default()
        .baudrate(Hertz(EPAPER_SPI_HZ))
        .data_mode(embedded_hal::spi::MODE_0);
    let spi_device = SpiDeviceDriver::new(spi, Some(pins.cs), &spi_config)?;

    let dc = PinDriver::output(pins.dc)?;
    let rst = PinDriver::output(pins.rst)?;
    let busy = PinDriver::input(pins.busy)?;
    let interface: EpaperInterface = ssd1680::Interface::new(spi_device, dc, rst, busy);

    Ok(EpaperPanel::new(interface, EPAPER_FULL_UPDATE)?)
}

fn oled_panel(i2c: I2cDriver<'static>) -> Result<OledPanel, Box<dyn Error>> {
    OledPanel::new(i2c).map_err(|e| format!("OLED init failed: {:?}", e).into())
}

fn mount_storage() -> SharedFileSystem {
    match FlashStorage::mount() {
        Ok(storage) => shared(storage),
        Err(err) => {
            log::error!("{}; continuing without storage", err);
            shared(MockFileSystem::new())
        }
    }
}

fn run<P, J, S>(mut shell: Shell<P, J, S>) -> !
where
    P: Panel + 'static,
    J: JoystickSource,
    S: Panel,
{
    runtime_diagnostics::configure_background_threads();
    shell.boot();
    runtime_diagnostics::spawn_memory_monitor();
    runtime_diagnostics::restore_thread_defaults();
    runtime_diagnostics::log_heap("after boot");

    loop {
        shell.tick(Instant::now());
        FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!(
        "Starting Flipper UI ({:?}) with {} bytes stack",
        DISPLAY_MODE,
        esp_idf_svc::sys::CONFIG_ESP_MAIN_TASK_STACK_SIZE
    );
    runtime_diagnostics::log_heap("boot");

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let status = Arc::new(StatusLed::new(pins.gpio2)?);
    status.set_busy();

    let controls = Controls::new(AdcJoystick::new(pins.gpio32)?, JoystickConfig::default());
    let fs = mount_storage();
    let render_config = RenderConfig::for_mode(DISPLAY_MODE);

    let epaper_pins = EpaperPins {
        spi: peripherals.spi2,
        sck: pins.gpio18,
        mosi: pins.gpio23,
        cs: pins.gpio5,
        dc: pins.gpio17,
        rst: pins.gpio16,
        busy: pins.gpio4,
    };
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        pins.gpio21,
        pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(OLED_I2C_HZ)),
    );

    match DISPLAY_MODE {
        DisplayMode::Oled => {
            let oled = oled_panel(i2c?)?;
            let render = Arc::new(RenderQueue::with_status(oled, render_config, status));
            run(Shell::new(render, controls, fs))
        }
        DisplayMode::EPaper { .. } => {
            let epaper = epaper_panel(epaper_pins)?;
            let render = Arc::new(RenderQueue::with_status(epaper, render_config, status));
            run(Shell::new(render, controls, fs))
        }
        DisplayMode::Dual { .. } => {
            let oled = oled_panel(i2c?)?;
            let epaper = epaper_panel(epaper_pins)?;
            let render = Arc::new(RenderQueue::with_status(oled, render_config, status));
            run(Shell::new(render, controls, fs).with_secondary(epaper))
        }
    }
}
