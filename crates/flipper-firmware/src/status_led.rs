//! Busy LED on GPIO2: high while the device is working, low when ready.

use esp_idf_svc::hal::gpio::{Gpio2, Output, PinDriver};
use esp_idf_svc::sys::EspError;
use flipper_ui::StatusIndicator;
use parking_lot::Mutex;

pub struct StatusLed {
    pin: Mutex<PinDriver<'static, Gpio2, Output>>,
}

impl StatusLed {
    pub fn new(gpio: Gpio2) -> Result<Self, EspError> {
        let mut pin = PinDriver::output(gpio)?;
        pin.set_low()?;
        Ok(Self {
            pin: Mutex::new(pin),
        })
    }
}

impl StatusIndicator for StatusLed {
    fn set_busy(&self) {
        if let Err(err) = self.pin.lock().set_high() {
            log::warn!("Status LED write failed: {}", err);
        }
    }

    fn set_ready(&self) {
        if let Err(err) = self.pin.lock().set_low() {
            log::warn!("Status LED write failed: {}", err);
        }
    }
}
