//! Core display operations

use embedded_hal::delay::DelayNs;

use crate::command::*;
use crate::config::{Config, Dimensions, Rotation};
use crate::error::Error;
use crate::interface::DisplayInterface;

/// How the panel transitions to a new frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshMode {
    /// Full waveform with flashing; clears ghosting.
    #[default]
    Full,
    /// Differential update against the previous frame.
    Partial,
}

/// Low-level SSD1680 driver. For embedded-graphics use `GraphicDisplay`.
pub struct Display<I>
where
    I: DisplayInterface,
{
    interface: I,
    config: Config,
    /// RED RAM holds a frame the panel is showing.
    has_base_frame: bool,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            has_base_frame: false,
        }
    }

    /// Hardware reset, software reset and register setup.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.interface.reset(delay);
        self.busy_wait(delay)?;
        self.send_command(SOFT_RESET)?;
        self.busy_wait(delay)?;

        let rows = self.config.dimensions.rows - 1;
        self.send_command(DRIVER_OUTPUT_CONTROL)?;
        self.send_data(&[
            (rows & 0xFF) as u8,
            (rows >> 8) as u8,
            self.config.gate_scanning,
        ])?;

        self.send_command(DATA_ENTRY_MODE)?;
        self.send_data(&[self.config.data_entry_mode])?;

        self.send_command(BORDER_WAVEFORM)?;
        self.send_data(&[self.config.border_waveform])?;

        self.send_command(DISPLAY_UPDATE_CTRL1)?;
        self.send_data(&[CTRL1_NORMAL, CTRL1_SOURCE_S8])?;

        self.send_command(TEMP_SENSOR_CONTROL)?;
        self.send_data(&[self.config.temp_sensor_control])?;

        self.set_full_window()?;
        self.has_base_frame = false;
        self.busy_wait(delay)
    }

    /// Write `buffer` (1 bpp, MSB first, 1 = white) and refresh.
    ///
    /// A partial refresh needs a previous frame to diff against; the first
    /// update after [`Display::reset`] is always full.
    pub fn update<D: DelayNs>(
        &mut self,
        buffer: &[u8],
        mode: RefreshMode,
        delay: &mut D,
    ) -> Result<(), Error<I>> {
        let required = self.config.dimensions.buffer_size();
        if buffer.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                provided: buffer.len(),
            });
        }
        let frame = &buffer[..required];
        let mode = if self.has_base_frame {
            mode
        } else {
            RefreshMode::Full
        };

        self.write_ram(WRITE_RAM_BW, frame)?;
        if mode == RefreshMode::Full {
            self.write_ram(WRITE_RAM_RED, frame)?;
        }

        let ctrl2 = match mode {
            RefreshMode::Full => CTRL2_FULL,
            RefreshMode::Partial => CTRL2_PARTIAL,
        };
        self.send_command(DISPLAY_UPDATE_CTRL2)?;
        self.send_data(&[ctrl2])?;
        self.send_command(MASTER_ACTIVATION)?;
        self.busy_wait(delay)?;

        // The new frame becomes the base for the next differential update.
        if mode == RefreshMode::Partial {
            self.write_ram(WRITE_RAM_RED, frame)?;
        }
        self.has_base_frame = true;
        Ok(())
    }

    /// Power off the analog rails and enter deep sleep mode 1. Wake with
    /// [`Display::reset`].
    pub fn deep_sleep<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.send_command(DISPLAY_UPDATE_CTRL2)?;
        self.send_data(&[CTRL2_POWER_OFF])?;
        self.send_command(MASTER_ACTIVATION)?;
        self.busy_wait(delay)?;

        self.send_command(DEEP_SLEEP)?;
        self.send_data(&[0x01])?;
        self.has_base_frame = false;
        Ok(())
    }

    fn write_ram(&mut self, command: u8, frame: &[u8]) -> Result<(), Error<I>> {
        self.set_full_window()?;
        self.send_command(command)?;
        self.send_data(frame)
    }

    /// Address the whole RAM: X in bytes, Y in gate lines.
    fn set_full_window(&mut self) -> Result<(), Error<I>> {
        let x_end = (self.config.dimensions.row_bytes() - 1) as u8;
        let y_end = self.config.dimensions.rows - 1;

        self.send_command(SET_RAM_X_RANGE)?;
        self.send_data(&[0x00, x_end])?;

        self.send_command(SET_RAM_Y_RANGE)?;
        self.send_data(&[0x00, 0x00, (y_end & 0xFF) as u8, (y_end >> 8) as u8])?;

        self.send_command(SET_RAM_X_COUNTER)?;
        self.send_data(&[0x00])?;

        self.send_command(SET_RAM_Y_COUNTER)?;
        self.send_data(&[0x00, 0x00])
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I>> {
        self.interface.busy_wait(delay).map_err(Error::Interface)
    }

    fn send_command(&mut self, cmd: u8) -> Result<(), Error<I>> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Error<I>> {
        self.interface.send_data(data).map_err(Error::Interface)
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn interface(&self) -> &I {
        &self.interface
    }
}
