use esp_idf_svc::hal::gpio::{Gpio32, Input, PinDriver, Pull};
use esp_idf_svc::sys::{self, EspError};
use flipper_ui::{JoystickSample, JoystickSource};

// X on GPIO34, Y on GPIO35.
const JOYSTICK_X_CHANNEL: sys::adc_channel_t = sys::adc_channel_t_ADC_CHANNEL_6;
const JOYSTICK_Y_CHANNEL: sys::adc_channel_t = sys::adc_channel_t_ADC_CHANNEL_7;
const ADC_WIDTH_BIT_12: u32 = 3;
const ADC_ATTEN_DB_11: u32 = 3;

/// Analog joystick on ADC1 with its push button on GPIO32 (active low).
pub struct AdcJoystick {
    button: PinDriver<'static, Gpio32, Input>,
}

impl AdcJoystick {
    pub fn new(button: Gpio32) -> Result<Self, EspError> {
        unsafe {
            sys::adc1_config_width(ADC_WIDTH_BIT_12);
            sys::adc1_config_channel_atten(JOYSTICK_X_CHANNEL, ADC_ATTEN_DB_11);
            sys::adc1_config_channel_atten(JOYSTICK_Y_CHANNEL, ADC_ATTEN_DB_11);
        }
        let mut button = PinDriver::input(button)?;
        button.set_pull(Pull::Up)?;
        Ok(Self { button })
    }
}

fn read_adc(channel: sys::adc_channel_t) -> u16 {
    let raw = unsafe { sys::adc1_get_raw(channel) };
    raw.clamp(0, 4095) as u16
}

impl JoystickSource for AdcJoystick {
    fn sample(&mut self) -> JoystickSample {
        JoystickSample {
            x: read_adc(JOYSTICK_X_CHANNEL),
            y: read_adc(JOYSTICK_Y_CHANNEL),
            button_down: self.button.is_low(),
        }
    }
}
