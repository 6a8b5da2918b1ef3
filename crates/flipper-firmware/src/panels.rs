//! Device panels: SSD1306 OLED over I2C and SSD1680 e-paper over SPI.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{Gpio16, Gpio17, Gpio4, Input, Output, PinDriver};
use esp_idf_svc::hal::i2c::I2cDriver;
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver};
use flipper_ui::Panel;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use ssd1680::{Builder, BuilderError, Dimensions, GraphicDisplay, Interface, RefreshMode, Rotation};

type OledDriver = Ssd1306<
    I2CInterface<I2cDriver<'static>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

type OledError = <OledDriver as DrawTarget>::Error;

/// 128x64 SSD1306 in buffered graphics mode.
pub struct OledPanel {
    display: OledDriver,
}

impl OledPanel {
    /// Address 0x3C, no rotation.
    pub fn new(i2c: I2cDriver<'static>) -> Result<Self, OledError> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init()?;
        log::info!("OLED initialized");
        Ok(Self { display })
    }
}

impl DrawTarget for OledPanel {
    type Color = BinaryColor;
    type Error = OledError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.display.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        DrawTarget::clear(&mut self.display, color)
    }
}

impl OriginDimensions for OledPanel {
    fn size(&self) -> Size {
        self.display.size()
    }
}

impl Panel for OledPanel {
    type FlushError = OledError;

    fn flush(&mut self) -> Result<(), Self::FlushError> {
        self.display.flush()
    }
}

pub type EpaperInterface = Interface<
    SpiDeviceDriver<'static, SpiDriver<'static>>,
    PinDriver<'static, Gpio17, Output>,
    PinDriver<'static, Gpio16, Output>,
    PinDriver<'static, Gpio4, Input>,
>;

#[derive(Debug)]
pub enum EpaperInitError {
    Config(BuilderError),
    Driver(ssd1680::Error<EpaperInterface>),
}

impl core::fmt::Display for EpaperInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EpaperInitError::Config(e) => write!(f, "E-paper config error: {}", e),
            EpaperInitError::Driver(e) => write!(f, "E-paper reset failed: {}", e),
        }
    }
}

impl std::error::Error for EpaperInitError {}

/// 2.9" SSD1680 in landscape (296x128).
///
/// The UI draws light-on-dark: `BinaryColor::On` is white paper here, so
/// colours are inverted on the way into the ink buffer.
pub struct EpaperPanel {
    epd: GraphicDisplay<EpaperInterface, Vec<u8>>,
    mode: RefreshMode,
}

impl EpaperPanel {
    /// Reset the controller. `full_update` selects the full waveform for
    /// every flush instead of partial refreshes.
    pub fn new(interface: EpaperInterface, full_update: bool) -> Result<Self, EpaperInitError> {
        let dims = Dimensions::PANEL_2IN9;
        let config = Builder::new()
            .dimensions(dims)
            .rotation(Rotation::Rotate90)
            .build()
            .map_err(EpaperInitError::Config)?;

        let mut display = ssd1680::Display::new(interface, config);
        display
            .reset(&mut FreeRtos)
            .map_err(EpaperInitError::Driver)?;

        let mut epd = GraphicDisplay::new(display, vec![0xFF; dims.buffer_size()]);
        epd.clear(BinaryColor::On);
        log::info!(
            "E-paper initialized ({} refresh)",
            if full_update { "full" } else { "partial" }
        );
        Ok(Self {
            epd,
            mode: if full_update {
                RefreshMode::Full
            } else {
                RefreshMode::Partial
            },
        })
    }
}

impl DrawTarget for EpaperPanel {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.epd.draw_iter(
            pixels
                .into_iter()
                .map(|Pixel(point, color)| Pixel(point, color.invert())),
        )
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.epd.clear(color.invert());
        Ok(())
    }
}

impl OriginDimensions for EpaperPanel {
    fn size(&self) -> Size {
        self.epd.size()
    }
}

impl Panel for EpaperPanel {
    type FlushError = ssd1680::Error<EpaperInterface>;

    fn flush(&mut self) -> Result<(), Self::FlushError> {
        self.epd.update(self.mode, &mut FreeRtos)
    }
}
