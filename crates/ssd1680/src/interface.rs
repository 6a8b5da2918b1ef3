//! SPI + GPIO transport to the controller.
//!
//! The SSD1680 needs a 4-wire SPI bus plus three pins:
//! - **DC**: low for commands, high for data
//! - **RST**: active low reset
//! - **BUSY**: high while the controller is working

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

/// Default limit for a single BUSY wait. A full refresh takes about 3 s.
pub const BUSY_TIMEOUT_MS: u32 = 10_000;

/// Transport used by [`Display`](crate::display::Display).
///
/// [`Interface`] covers the usual wiring; implement this yourself for
/// anything else (e.g. a recording mock in tests).
pub trait DisplayInterface {
    type Error: Debug;

    /// DC low, then the command byte.
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// DC high, then `data`.
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Pulse RST low for 10 ms and give the controller 10 ms to come up.
    fn reset<D: DelayNs>(&mut self, delay: &mut D);

    /// Poll BUSY every millisecond until it drops.
    ///
    /// # Errors
    ///
    /// [`InterfaceError::Timeout`] when BUSY stays high past the limit.
    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    Spi(SpiErr),
    Pin(PinErr),
    Timeout,
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InterfaceError::Spi(e) => write!(f, "SPI error: {e:?}"),
            InterfaceError::Pin(e) => write!(f, "Pin error: {e:?}"),
            InterfaceError::Timeout => write!(f, "Timeout waiting for display"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// embedded-hal 1.0 wiring: an [`SpiDevice`] (which owns CS) and DC/RST/BUSY.
pub struct Interface<SPI, DC, RST, BUSY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    timeout_ms: u32,
}

impl<SPI, DC, RST, BUSY> Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            timeout_ms: BUSY_TIMEOUT_MS,
        }
    }

    /// Override the BUSY timeout.
    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl<SPI, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        let _ = self.rst.set_low();
        delay.delay_ms(10);
        let _ = self.rst.set_high();
        delay.delay_ms(10);
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        let mut waited_ms = 0u32;
        while self.busy.is_high().map_err(InterfaceError::Pin)? {
            if waited_ms >= self.timeout_ms {
                log::warn!("SSD1680 busy for more than {} ms", self.timeout_ms);
                return Err(InterfaceError::Timeout);
            }
            delay.delay_ms(1);
            waited_ms += 1;
        }
        Ok(())
    }
}
